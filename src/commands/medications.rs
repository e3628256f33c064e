//! Medication commands: add, search, get, export.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::json;

use crate::cli::AddDrugArgs;
use crate::models::{Medication, NewMedication};
use crate::store::{row_id, to_row, Filter, RecordStore};
use crate::transform;

use super::CommandError;

pub async fn add_drug(store: &dyn RecordStore, args: &AddDrugArgs) -> Result<String, CommandError> {
    let record = NewMedication::new(
        args.name.clone(),
        args.generic.clone(),
        args.drug_class.clone(),
        args.description.clone(),
        !args.otc,
    );
    let rows = store.insert("medications", record.into_row()).await?;
    rows.first()
        .and_then(row_id)
        .ok_or_else(|| CommandError::NotPersisted { name: args.name.clone() })
}

pub async fn search(
    store: &dyn RecordStore,
    query: &str,
    limit: u32,
) -> Result<Vec<Medication>, CommandError> {
    let rows = store
        .select("medications", &[Filter::contains("name", query)], Some(limit))
        .await?;
    rows.into_iter()
        .map(|row| Medication::from_row(row).map_err(CommandError::from))
        .collect()
}

/// Look up one medication by exact, case-insensitive name. A hit bumps the
/// record's search counter.
pub async fn get(store: &dyn RecordStore, name: &str) -> Result<Option<Medication>, CommandError> {
    let rows = store
        .select("medications", &[Filter::ilike("name", name)], Some(1))
        .await?;
    let Some(row) = rows.into_iter().next() else {
        return Ok(None);
    };
    let medication = Medication::from_row(row)?;
    record_lookup(store, &medication).await;
    Ok(Some(medication))
}

/// Best-effort search counter bump; a failed update never fails the lookup.
async fn record_lookup(store: &dyn RecordStore, medication: &Medication) {
    let changes = to_row(&json!({
        "search_count": medication.search_count.unwrap_or(0) + 1,
        "searched_at": Utc::now(),
    }));
    if let Err(err) = store
        .update("medications", changes, Filter::eq("id", &medication.id))
        .await
    {
        tracing::debug!(id = %medication.id, error = %err, "search count update failed");
    }
}

/// Export a medication as a drug document, returning the written path, or
/// `None` when no record matches.
pub async fn export(
    store: &dyn RecordStore,
    name: &str,
    output: Option<&Path>,
) -> Result<Option<PathBuf>, CommandError> {
    let rows = store
        .select("medications", &[Filter::ilike("name", name)], Some(1))
        .await?;
    let Some(row) = rows.into_iter().next() else {
        return Ok(None);
    };
    let medication = Medication::from_row(row)?;
    let document = transform::export_document(&medication);

    let path = output.map(Path::to_path_buf).unwrap_or_else(|| default_export_path(name));
    let text = serde_json::to_string_pretty(&document)?;
    std::fs::write(&path, text)
        .map_err(|source| CommandError::File { path: path.clone(), source })?;
    tracing::info!(name = %medication.name, path = %path.display(), "exported medication");
    Ok(Some(path))
}

fn default_export_path(name: &str) -> PathBuf {
    PathBuf::from(format!("{}.json", transform::slugify(name)))
}
