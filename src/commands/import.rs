//! `import` command: read a drug document from disk and load it.

use std::path::Path;

use crate::importer::{self, ImportReport};
use crate::store::RecordStore;
use crate::transform::DrugDocument;

use super::CommandError;

pub async fn run(store: &dyn RecordStore, path: &Path) -> Result<ImportReport, CommandError> {
    let text = std::fs::read_to_string(path)
        .map_err(|source| CommandError::File { path: path.to_path_buf(), source })?;
    let doc: DrugDocument = serde_json::from_str(&text)?;
    tracing::info!(name = %doc.name, path = %path.display(), "importing drug document");
    Ok(importer::import_drug(store, &doc).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    #[tokio::test]
    async fn reads_a_document_and_imports_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aspirin.json");
        std::fs::write(
            &path,
            serde_json::to_string_pretty(&json!({
                "name": "Aspirin",
                "slug": "aspirin",
                "interactions": {"major": ["Warfarin"]},
            }))
            .unwrap(),
        )
        .unwrap();

        let store = MemoryStore::new();
        let report = run(&store, &path).await.unwrap();
        assert_eq!(report.name, "Aspirin");
        assert_eq!(report.inserted, 1);
        assert_eq!(store.rows("drugs").len(), 1);
        assert_eq!(store.rows("drug_interactions").len(), 1);
    }

    #[tokio::test]
    async fn a_missing_file_reports_its_path() {
        let store = MemoryStore::new();
        let err = run(&store, Path::new("/nonexistent/doc.json")).await.unwrap_err();
        match err {
            CommandError::File { path, .. } => {
                assert_eq!(path, Path::new("/nonexistent/doc.json"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn invalid_json_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "not a document").unwrap();
        let store = MemoryStore::new();
        let err = run(&store, &path).await.unwrap_err();
        assert!(matches!(err, CommandError::Json(_)));
    }
}
