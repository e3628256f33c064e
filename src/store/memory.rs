//! In-process record store used by tests in place of the hosted service.
//!
//! Behaves like the real service at the `RecordStore` contract: inserts are
//! echoed back with an assigned id, updates and deletes return the affected
//! rows. Builder-style knobs inject the failure modes the degraded paths
//! care about, per table.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use super::{Filter, RecordStore, Row, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, Vec<Row>>>,
    failing_tables: Vec<String>,
    failing_writes: Vec<String>,
    hidden_writes: Vec<String>,
    rejected_inserts: Vec<Rejection>,
}

struct Rejection {
    table: String,
    column: String,
    value: String,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a table with rows.
    pub fn with_rows(self, table: &str, rows: Vec<Row>) -> Self {
        self.guard().entry(table.to_string()).or_default().extend(rows);
        self
    }

    /// Every operation on `table` fails.
    pub fn with_failing_table(mut self, table: &str) -> Self {
        self.failing_tables.push(table.to_string());
        self
    }

    /// Writes to `table` fail; reads still succeed.
    pub fn with_failing_writes(mut self, table: &str) -> Self {
        self.failing_writes.push(table.to_string());
        self
    }

    /// Writes to `table` persist but the service returns no rows, like an
    /// insert answered without `return=representation`.
    pub fn with_hidden_writes(mut self, table: &str) -> Self {
        self.hidden_writes.push(table.to_string());
        self
    }

    /// Inserts into `table` where `column` equals `value` are rejected,
    /// standing in for a constraint violation on one specific record.
    pub fn with_rejected_insert(mut self, table: &str, column: &str, value: &str) -> Self {
        self.rejected_inserts.push(Rejection {
            table: table.to_string(),
            column: column.to_string(),
            value: value.to_string(),
        });
        self
    }

    /// Snapshot of a table's rows, in insertion order.
    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.guard().get(table).cloned().unwrap_or_default()
    }

    fn guard(&self) -> MutexGuard<'_, HashMap<String, Vec<Row>>> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_read(&self, table: &str) -> Result<(), StoreError> {
        if self.failing_tables.iter().any(|t| t == table) {
            return Err(StoreError::Service {
                status: 500,
                body: format!("table {table} unavailable"),
            });
        }
        Ok(())
    }

    fn check_write(&self, table: &str) -> Result<(), StoreError> {
        self.check_read(table)?;
        if self.failing_writes.iter().any(|t| t == table) {
            return Err(StoreError::Service {
                status: 500,
                body: format!("writes to {table} rejected"),
            });
        }
        Ok(())
    }

    fn hides_writes(&self, table: &str) -> bool {
        self.hidden_writes.iter().any(|t| t == table)
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn select(
        &self,
        table: &str,
        filters: &[Filter],
        limit: Option<u32>,
    ) -> Result<Vec<Row>, StoreError> {
        self.check_read(table)?;
        let guard = self.guard();
        let mut rows: Vec<Row> = guard
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| filters.iter().all(|f| f.matches(row)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        if let Some(limit) = limit {
            rows.truncate(limit as usize);
        }
        Ok(rows)
    }

    async fn insert(&self, table: &str, record: Row) -> Result<Vec<Row>, StoreError> {
        self.check_write(table)?;
        for rejection in &self.rejected_inserts {
            if rejection.table == table
                && record.get(&rejection.column).and_then(Value::as_str)
                    == Some(rejection.value.as_str())
            {
                return Err(StoreError::Service {
                    status: 409,
                    body: format!(
                        "duplicate key value violates unique constraint on {table}.{}",
                        rejection.column
                    ),
                });
            }
        }

        let mut row = record;
        row.entry("id")
            .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
        self.guard().entry(table.to_string()).or_default().push(row.clone());

        if self.hides_writes(table) {
            return Ok(Vec::new());
        }
        Ok(vec![row])
    }

    async fn update(
        &self,
        table: &str,
        changes: Row,
        filter: Filter,
    ) -> Result<Vec<Row>, StoreError> {
        self.check_write(table)?;
        let mut guard = self.guard();
        let mut updated = Vec::new();
        if let Some(rows) = guard.get_mut(table) {
            for row in rows.iter_mut().filter(|row| filter.matches(row)) {
                for (column, value) in &changes {
                    row.insert(column.clone(), value.clone());
                }
                updated.push(row.clone());
            }
        }
        if self.hides_writes(table) {
            return Ok(Vec::new());
        }
        Ok(updated)
    }

    async fn delete(&self, table: &str, filter: Filter) -> Result<Vec<Row>, StoreError> {
        self.check_write(table)?;
        let mut guard = self.guard();
        let removed = match guard.get_mut(table) {
            Some(rows) => {
                let (gone, kept): (Vec<Row>, Vec<Row>) =
                    rows.drain(..).partition(|row| filter.matches(row));
                *rows = kept;
                gone
            }
            None => Vec::new(),
        };
        if self.hides_writes(table) {
            return Ok(Vec::new());
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{row_id, to_row};
    use serde_json::json;

    fn named_row(name: &str) -> Row {
        to_row(&json!({"name": name}))
    }

    #[tokio::test]
    async fn insert_assigns_an_id_and_echoes_the_row() {
        let store = MemoryStore::new();
        let rows = store.insert("medications", named_row("Aspirin")).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!(row_id(&rows[0]).is_some());
        assert_eq!(store.rows("medications").len(), 1);
    }

    #[tokio::test]
    async fn insert_keeps_a_caller_supplied_id() {
        let store = MemoryStore::new();
        let rows = store
            .insert("medications", to_row(&json!({"id": "fixed", "name": "Aspirin"})))
            .await
            .unwrap();
        assert_eq!(row_id(&rows[0]), Some("fixed".to_string()));
    }

    #[tokio::test]
    async fn select_applies_filters_and_limit() {
        let store = MemoryStore::new().with_rows(
            "medications",
            vec![named_row("Aspirin"), named_row("Ibuprofen"), named_row("Aspirin")],
        );
        let rows = store
            .select("medications", &[Filter::eq("name", "Aspirin")], None)
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);

        let rows = store
            .select("medications", &[Filter::eq("name", "Aspirin")], Some(1))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn select_on_unknown_table_is_empty() {
        let store = MemoryStore::new();
        let rows = store.select("nothing", &[], None).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn update_merges_changes_into_matching_rows() {
        let store = MemoryStore::new()
            .with_rows("medications", vec![to_row(&json!({"id": "a", "name": "Aspirin"}))]);
        let updated = store
            .update(
                "medications",
                to_row(&json!({"description": "pain relief"})),
                Filter::eq("id", "a"),
            )
            .await
            .unwrap();
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].get("name"), Some(&json!("Aspirin")));
        assert_eq!(updated[0].get("description"), Some(&json!("pain relief")));
    }

    #[tokio::test]
    async fn update_without_match_returns_no_rows() {
        let store = MemoryStore::new();
        let updated = store
            .update("medications", to_row(&json!({"x": 1})), Filter::eq("id", "missing"))
            .await
            .unwrap();
        assert!(updated.is_empty());
    }

    #[tokio::test]
    async fn delete_returns_the_removed_rows() {
        let store = MemoryStore::new().with_rows(
            "medications",
            vec![
                to_row(&json!({"id": "a", "name": "Aspirin"})),
                to_row(&json!({"id": "b", "name": "Ibuprofen"})),
            ],
        );
        let removed = store.delete("medications", Filter::eq("id", "a")).await.unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(store.rows("medications").len(), 1);
        assert_eq!(store.rows("medications")[0].get("id"), Some(&json!("b")));
    }

    #[tokio::test]
    async fn failing_table_rejects_reads_and_writes() {
        let store = MemoryStore::new().with_failing_table("drugs");
        assert!(store.select("drugs", &[], None).await.is_err());
        assert!(store.insert("drugs", named_row("x")).await.is_err());
        assert!(store.rows("drugs").is_empty());
    }

    #[tokio::test]
    async fn failing_writes_leave_reads_working() {
        let store = MemoryStore::new()
            .with_rows("medications", vec![named_row("Aspirin")])
            .with_failing_writes("medications");
        assert!(store.insert("medications", named_row("x")).await.is_err());
        let rows = store.select("medications", &[], None).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn hidden_writes_persist_but_return_nothing() {
        let store = MemoryStore::new().with_hidden_writes("medications");
        let rows = store.insert("medications", named_row("Aspirin")).await.unwrap();
        assert!(rows.is_empty());
        assert_eq!(store.rows("medications").len(), 1);
    }

    #[tokio::test]
    async fn rejected_insert_targets_one_record_only() {
        let store = MemoryStore::new().with_rejected_insert("food_interactions", "description", "Alcohol");
        let err = store
            .insert("food_interactions", to_row(&json!({"description": "Alcohol"})))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Service { status: 409, .. }));

        let ok = store
            .insert("food_interactions", to_row(&json!({"description": "Grapefruit"})))
            .await;
        assert!(ok.is_ok());
        assert_eq!(store.rows("food_interactions").len(), 1);
    }
}
