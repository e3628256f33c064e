//! CLI command handlers.
//!
//! Each submodule does the work and returns data; the dispatcher here owns
//! all terminal output, so the operations stay reusable from tests and the
//! HTTP layer. Failures bubble up as `CommandError` and the binary turns
//! them into an error exit; a lookup that finds nothing is an informational
//! message, not an error.

pub mod import;
pub mod medications;
pub mod serve;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::cli::Command;
use crate::importer::ImportError;
use crate::models::Medication;
use crate::store::{RecordStore, StoreError};

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Import(#[from] ImportError),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("{}: {source}", path.display())]
    File { path: PathBuf, source: io::Error },

    /// The service accepted the insert but returned no row.
    #[error("failed to add {name}")]
    NotPersisted { name: String },

    #[error("invalid host address: {0}")]
    Host(#[from] std::net::AddrParseError),

    #[error("failed to start API server: {0}")]
    Server(io::Error),
}

/// Run one CLI command against the given record store.
pub async fn run(command: Command, store: Arc<dyn RecordStore>) -> Result<(), CommandError> {
    match command {
        Command::Import { file } => {
            let report = import::run(store.as_ref(), &file).await?;
            for failure in &report.failures {
                eprintln!(
                    "Warning: could not insert '{}' into {}: {}",
                    failure.item, failure.table, failure.reason
                );
            }
            println!("Successfully imported {} with ID: {}", report.name, report.drug_id);
        }
        Command::AddDrug(args) => {
            let id = medications::add_drug(store.as_ref(), &args).await?;
            println!("Successfully added {} with ID: {}", args.name, id);
        }
        Command::Search { query, limit } => {
            let matches = medications::search(store.as_ref(), &query, limit).await?;
            if matches.is_empty() {
                println!("No medications found matching your query.");
            } else {
                println!("Found {} medications:", matches.len());
                for medication in &matches {
                    println!("- {}", medication.name);
                }
            }
        }
        Command::Get { name } => match medications::get(store.as_ref(), &name).await? {
            Some(medication) => print_details(&medication),
            None => println!("No medication found with the name '{name}'."),
        },
        Command::Export { name, output } => {
            match medications::export(store.as_ref(), &name, output.as_deref()).await? {
                Some(path) => println!("Exported medication data to {}", path.display()),
                None => println!("No medication found with the name '{name}'."),
            }
        }
        Command::Api(args) => serve::run(store, &args).await?,
    }
    Ok(())
}

fn print_details(medication: &Medication) {
    println!("\n{} Details:", medication.name);
    println!("Generic Name: {}", medication.generic_name.as_deref().unwrap_or("N/A"));
    println!("Drug Class: {}", medication.drug_class.as_deref().unwrap_or("N/A"));
    println!("Description: {}", medication.description.as_deref().unwrap_or("N/A"));
    println!(
        "Prescription Only: {}",
        if medication.prescription_only { "Yes" } else { "No" }
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    #[tokio::test]
    async fn get_on_a_missing_name_is_not_an_error() {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
        let result = run(Command::Get { name: "Nothing".to_string() }, store).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn search_against_a_failing_table_is_an_error() {
        let store: Arc<dyn RecordStore> =
            Arc::new(MemoryStore::new().with_failing_table("medications"));
        let result = run(
            Command::Search { query: "aspirin".to_string(), limit: 10 },
            store,
        )
        .await;
        assert!(matches!(result, Err(CommandError::Store(_))));
    }

    #[tokio::test]
    async fn add_drug_inserts_through_the_dispatcher() {
        let store = Arc::new(MemoryStore::new());
        let command = Command::AddDrug(crate::cli::AddDrugArgs {
            name: "Aspirin".to_string(),
            generic: None,
            drug_class: None,
            description: None,
            otc: false,
        });
        run(command, store.clone()).await.unwrap();
        let rows = store.rows("medications");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("name"), Some(&json!("Aspirin")));
    }

    #[tokio::test]
    async fn import_surfaces_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
        let result = run(Command::Import { file: path }, store).await;
        assert!(matches!(result, Err(CommandError::Json(_))));
    }
}
