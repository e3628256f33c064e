//! Best-effort import of a drug document across its related tables.
//!
//! The base record insert is the only fatal step. Once the service has
//! assigned a drug id, each interaction, imprint, and international name
//! is inserted on its own; a failed child row is recorded in the report
//! and the run continues.

use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::store::{row_id, to_row, RecordStore, Row, StoreError};
use crate::transform::{self, DrugDocument};

#[derive(Debug, Error)]
pub enum ImportError {
    /// The base drug insert failed; nothing was imported.
    #[error("failed to insert drug record: {0}")]
    Store(#[from] StoreError),

    /// The service accepted the base insert but returned no row.
    #[error("drug record was not persisted")]
    NotPersisted,

    /// The returned base row carries no id to tag child rows with.
    #[error("inserted drug record has no id")]
    MissingId,
}

/// Outcome of an import run. `inserted` counts child rows only; the base
/// record is implied by the presence of a `drug_id`.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub drug_id: String,
    pub name: String,
    pub inserted: usize,
    pub failures: Vec<ImportFailure>,
}

/// One child row the service refused.
#[derive(Debug, Clone, Serialize)]
pub struct ImportFailure {
    pub table: &'static str,
    pub item: String,
    pub reason: String,
}

/// Insert a document's base record into `drugs`, then its child rows into
/// their tables, tolerating per-row failures.
pub async fn import_drug(
    store: &dyn RecordStore,
    doc: &DrugDocument,
) -> Result<ImportReport, ImportError> {
    let rows = store.insert("drugs", transform::base_record(doc)).await?;
    let row = rows.first().ok_or(ImportError::NotPersisted)?;
    let drug_id = row_id(row).ok_or(ImportError::MissingId)?;
    tracing::info!(%drug_id, name = %doc.name, "drug record inserted");

    let mut report = ImportReport {
        drug_id: drug_id.clone(),
        name: doc.name.clone(),
        inserted: 0,
        failures: Vec::new(),
    };

    for (level, interactions) in doc.interactions.by_level() {
        for interaction in interactions {
            let record = to_row(&json!({
                "drug_id": drug_id,
                "level": level,
                "interaction": interaction,
            }));
            insert_child(store, "drug_interactions", record, interaction, &mut report).await;
        }
    }

    for food in &doc.interactions.food_interactions {
        let record = to_row(&json!({"drug_id": drug_id, "description": food}));
        insert_child(store, "food_interactions", record, food, &mut report).await;
    }

    for condition in &doc.interactions.condition_interactions {
        let record = to_row(&json!({"drug_id": drug_id, "description": condition}));
        insert_child(store, "condition_interactions", record, condition, &mut report).await;
    }

    for duplication in &doc.interactions.therapeutic_duplications {
        let record = to_row(&json!({"drug_id": drug_id, "description": duplication}));
        insert_child(store, "therapeutic_duplications", record, duplication, &mut report).await;
    }

    for imprint in &doc.imprints {
        let record = to_row(&json!({
            "drug_id": drug_id,
            "imprint_code": imprint.imprint_code,
            "image_url": imprint.image_url,
            "description": imprint.description,
        }));
        let item = imprint.imprint_code.clone().unwrap_or_default();
        insert_child(store, "drug_imprints", record, &item, &mut report).await;
    }

    for international in &doc.international_names {
        let record = to_row(&json!({
            "drug_id": drug_id,
            "country": international.country,
            "name": international.name,
        }));
        insert_child(store, "international_names", record, &international.name, &mut report)
            .await;
    }

    Ok(report)
}

async fn insert_child(
    store: &dyn RecordStore,
    table: &'static str,
    record: Row,
    item: &str,
    report: &mut ImportReport,
) {
    match store.insert(table, record).await {
        Ok(_) => report.inserted += 1,
        Err(err) => {
            tracing::warn!(table, item, error = %err, "could not insert child row");
            report.failures.push(ImportFailure {
                table,
                item: item.to_string(),
                reason: err.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn full_document() -> DrugDocument {
        serde_json::from_value(json!({
            "name": "Acetaminophen",
            "slug": "acetaminophen",
            "consumer_info": "Pain reliever and fever reducer.",
            "classification": "Non-opioid analgesic",
            "drug_class": "Analgesic and antipyretic",
            "generic": "acetaminophen",
            "otc": true,
            "interactions": {
                "major": ["Alcohol (chronic use)", "Warfarin"],
                "moderate": ["Carbamazepine"],
                "minor": ["Caffeine"],
                "unknown": [],
                "food_interactions": ["Alcohol"],
                "condition_interactions": ["Liver disease", "Alcoholism"],
                "therapeutic_duplications": ["Other acetaminophen products"],
            },
            "imprints": [
                {"imprint_code": "TYLENOL", "image_url": null, "description": "White oval tablet"},
            ],
            "international_names": [
                {"country": "UK", "name": "Paracetamol"},
                {"country": "Spain", "name": "Paracetamol"},
            ],
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn imports_base_record_and_every_child_row() {
        let store = MemoryStore::new();
        let report = import_drug(&store, &full_document()).await.unwrap();

        assert!(!report.drug_id.is_empty());
        assert_eq!(report.name, "Acetaminophen");
        assert_eq!(report.inserted, 11);
        assert!(report.failures.is_empty());

        assert_eq!(store.rows("drugs").len(), 1);
        assert_eq!(store.rows("drug_interactions").len(), 4);
        assert_eq!(store.rows("food_interactions").len(), 1);
        assert_eq!(store.rows("condition_interactions").len(), 2);
        assert_eq!(store.rows("therapeutic_duplications").len(), 1);
        assert_eq!(store.rows("drug_imprints").len(), 1);
        assert_eq!(store.rows("international_names").len(), 2);
    }

    #[tokio::test]
    async fn child_rows_carry_the_drug_id_and_severity() {
        let store = MemoryStore::new();
        let report = import_drug(&store, &full_document()).await.unwrap();

        let interactions = store.rows("drug_interactions");
        let levels: Vec<&str> = interactions
            .iter()
            .filter_map(|row| row.get("level").and_then(|v| v.as_str()))
            .collect();
        assert_eq!(levels, vec!["major", "major", "moderate", "minor"]);
        for row in &interactions {
            assert_eq!(row.get("drug_id"), Some(&json!(report.drug_id)));
        }
    }

    #[tokio::test]
    async fn failed_child_rows_do_not_abort_the_import() {
        let store = MemoryStore::new()
            .with_rejected_insert("drug_interactions", "interaction", "Warfarin")
            .with_rejected_insert("food_interactions", "description", "Alcohol");
        let report = import_drug(&store, &full_document()).await.unwrap();

        assert_eq!(report.inserted, 9);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].table, "drug_interactions");
        assert_eq!(report.failures[0].item, "Warfarin");
        assert_eq!(report.failures[1].table, "food_interactions");

        // Everything else still landed.
        assert_eq!(store.rows("drug_interactions").len(), 3);
        assert_eq!(store.rows("international_names").len(), 2);
    }

    #[tokio::test]
    async fn base_insert_failure_aborts_before_any_child_rows() {
        let store = MemoryStore::new().with_failing_table("drugs");
        let err = import_drug(&store, &full_document()).await.unwrap_err();
        assert!(matches!(err, ImportError::Store(_)));
        assert!(store.rows("drug_interactions").is_empty());
        assert!(store.rows("international_names").is_empty());
    }

    #[tokio::test]
    async fn base_insert_without_a_returned_row_is_fatal() {
        let store = MemoryStore::new().with_hidden_writes("drugs");
        let err = import_drug(&store, &full_document()).await.unwrap_err();
        assert!(matches!(err, ImportError::NotPersisted));
        assert!(store.rows("drug_interactions").is_empty());
    }

    #[tokio::test]
    async fn minimal_document_imports_only_the_base_record() {
        let store = MemoryStore::new();
        let doc: DrugDocument = serde_json::from_value(json!({"name": "Aspirin"})).unwrap();
        let report = import_drug(&store, &doc).await.unwrap();
        assert_eq!(report.inserted, 0);
        assert!(report.failures.is_empty());
        assert_eq!(store.rows("drugs").len(), 1);
        assert_eq!(store.rows("drugs")[0].get("slug"), Some(&json!(null)));
    }
}
