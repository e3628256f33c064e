//! Typed views of the `medications` table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::{to_row, Row};
use crate::transform::slugify;

// ═══════════════════════════════════════════════════════════════════════════
// Stored record
// ═══════════════════════════════════════════════════════════════════════════

/// A medication row as the service returns it. Optional columns read as
/// `None` whether the service omits them or sends explicit nulls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medication {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub generic_name: Option<String>,
    #[serde(default)]
    pub drug_class: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// A missing or null flag reads as not prescription-only.
    #[serde(default, deserialize_with = "bool_or_false")]
    pub prescription_only: bool,
    #[serde(default)]
    pub side_effects: Option<Value>,
    #[serde(default)]
    pub dosage: Option<Value>,
    #[serde(default)]
    pub pregnancy: Option<String>,
    #[serde(default)]
    pub breastfeeding: Option<String>,
    #[serde(default)]
    pub interaction_classifications: Option<InteractionClassifications>,
    #[serde(default)]
    pub food_interactions: Option<Vec<String>>,
    #[serde(default)]
    pub condition_interactions: Option<Vec<String>>,
    #[serde(default)]
    pub therapeutic_duplications: Option<Vec<String>>,
    #[serde(default)]
    pub search_count: Option<i64>,
    #[serde(default)]
    pub searched_at: Option<DateTime<Utc>>,
}

impl Medication {
    pub fn from_row(row: Row) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(row))
    }
}

/// Drug interaction names grouped by severity, stored as one JSON column.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InteractionClassifications {
    #[serde(default)]
    pub major: Vec<String>,
    #[serde(default)]
    pub moderate: Vec<String>,
    #[serde(default)]
    pub minor: Vec<String>,
}

fn bool_or_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

// ═══════════════════════════════════════════════════════════════════════════
// Write shapes
// ═══════════════════════════════════════════════════════════════════════════

/// Fields for a new medication record. The slug is always derived from the
/// name at construction; callers never supply one.
#[derive(Debug, Clone, Serialize)]
pub struct NewMedication {
    pub name: String,
    pub slug: String,
    pub generic_name: Option<String>,
    pub drug_class: Option<String>,
    pub description: Option<String>,
    pub prescription_only: bool,
}

impl NewMedication {
    pub fn new(
        name: impl Into<String>,
        generic_name: Option<String>,
        drug_class: Option<String>,
        description: Option<String>,
        prescription_only: bool,
    ) -> Self {
        let name = name.into();
        let slug = slugify(&name);
        Self { name, slug, generic_name, drug_class, description, prescription_only }
    }

    pub fn into_row(self) -> Row {
        to_row(&self)
    }
}

/// A partial update. Absent fields and explicit nulls both mean "leave the
/// column alone"; there is no way to null a column through a patch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MedicationPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generic_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drug_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prescription_only: Option<bool>,
}

impl MedicationPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.generic_name.is_none()
            && self.drug_class.is_none()
            && self.description.is_none()
            && self.prescription_only.is_none()
    }

    /// Column changes to apply. A name change re-derives the slug so the
    /// two never drift apart.
    pub fn changes(&self) -> Row {
        let mut changes = to_row(self);
        if let Some(name) = &self.name {
            changes.insert("slug".to_string(), Value::String(slugify(name)));
        }
        changes
    }
}
