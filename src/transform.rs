//! Shape conversion between drug documents and flat table records.
//!
//! A drug document is the nested JSON interchange format: base fields plus
//! interactions grouped by severity, imprints, and international names.
//! The mappings here are pure; the importer and the export command do the
//! actual I/O.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::models::{InteractionClassifications, Medication};
use crate::store::{to_row, Row};

/// Canonical slug for a medication name: lowercased, spaces to hyphens.
pub fn slugify(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

// ═══════════════════════════════════════════════════════════════════════════
// Document types
// ═══════════════════════════════════════════════════════════════════════════

/// A drug interchange document. Only the name is required; every other
/// field defaults to absent or empty when the source file omits it.
///
/// `side_effects` and `dosage` stay opaque JSON: depending on the source
/// they are plain text or structured objects, and both round-trip as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrugDocument {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub consumer_info: Option<String>,
    #[serde(default)]
    pub side_effects: Option<Value>,
    #[serde(default)]
    pub dosage: Option<Value>,
    #[serde(default)]
    pub pregnancy: Option<String>,
    #[serde(default)]
    pub breastfeeding: Option<String>,
    #[serde(default)]
    pub classification: Option<String>,
    #[serde(default)]
    pub drug_class: Option<String>,
    #[serde(default)]
    pub generic: Option<String>,
    #[serde(default)]
    pub otc: Option<bool>,
    #[serde(default)]
    pub interactions: Interactions,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imprints: Vec<Imprint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub international_names: Vec<InternationalName>,
}

/// Interaction lists grouped by severity, plus the non-drug interaction
/// categories that ride along in the same document section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Interactions {
    #[serde(default)]
    pub major: Vec<String>,
    #[serde(default)]
    pub moderate: Vec<String>,
    #[serde(default)]
    pub minor: Vec<String>,
    #[serde(default)]
    pub unknown: Vec<String>,
    #[serde(default)]
    pub food_interactions: Vec<String>,
    #[serde(default)]
    pub condition_interactions: Vec<String>,
    #[serde(default)]
    pub therapeutic_duplications: Vec<String>,
}

impl Interactions {
    /// Severity levels in their fixed import order.
    pub fn by_level(&self) -> [(&'static str, &[String]); 4] {
        [
            ("major", &self.major),
            ("moderate", &self.moderate),
            ("minor", &self.minor),
            ("unknown", &self.unknown),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Imprint {
    #[serde(default)]
    pub imprint_code: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InternationalName {
    pub country: String,
    pub name: String,
}

// ═══════════════════════════════════════════════════════════════════════════
// Mappings
// ═══════════════════════════════════════════════════════════════════════════

/// Flatten a document's base fields into a `drugs` record. Absent fields
/// become explicit nulls; the slug is copied as the document provides it.
pub fn base_record(doc: &DrugDocument) -> Row {
    to_row(&json!({
        "name": doc.name,
        "slug": doc.slug,
        "consumer_info": doc.consumer_info,
        "side_effects": doc.side_effects,
        "dosage": doc.dosage,
        "pregnancy": doc.pregnancy,
        "breastfeeding": doc.breastfeeding,
        "classification": doc.classification,
        "drug_class": doc.drug_class,
        "generic": doc.generic,
        "otc": doc.otc,
    }))
}

/// Build an export document from a `medications` row.
///
/// The two table vocabularies differ, so columns are remapped:
/// `description` becomes `consumer_info`, `drug_class` fills both
/// `classification` and `drug_class`, `generic_name` becomes `generic`,
/// and `otc` is the negation of `prescription_only`. Severity lists come
/// from the row's `interaction_classifications`; `unknown` is always empty
/// because the flat table never stores that bucket.
pub fn export_document(medication: &Medication) -> DrugDocument {
    let InteractionClassifications { major, moderate, minor } =
        medication.interaction_classifications.clone().unwrap_or_default();

    DrugDocument {
        name: medication.name.clone(),
        slug: Some(slugify(&medication.name)),
        consumer_info: medication.description.clone(),
        side_effects: medication.side_effects.clone(),
        dosage: medication.dosage.clone(),
        pregnancy: medication.pregnancy.clone(),
        breastfeeding: medication.breastfeeding.clone(),
        classification: medication.drug_class.clone(),
        drug_class: medication.drug_class.clone(),
        generic: medication.generic_name.clone(),
        otc: Some(!medication.prescription_only),
        interactions: Interactions {
            major,
            moderate,
            minor,
            unknown: Vec::new(),
            food_interactions: medication.food_interactions.clone().unwrap_or_default(),
            condition_interactions: medication.condition_interactions.clone().unwrap_or_default(),
            therapeutic_duplications: medication
                .therapeutic_duplications
                .clone()
                .unwrap_or_default(),
        },
        imprints: Vec::new(),
        international_names: Vec::new(),
    }
}
