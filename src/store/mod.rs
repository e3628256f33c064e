//! Table-oriented client for the hosted record service.
//!
//! Everything above this layer talks to a `RecordStore` trait object, so the
//! commands and the HTTP handlers never know whether rows come from the real
//! service (`RestStore`) or from an in-process substitute (`MemoryStore`).

mod memory;
mod rest;

pub use memory::MemoryStore;
pub use rest::RestStore;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// One stored row: column name to JSON value, as the service returns it.
pub type Row = serde_json::Map<String, Value>;

// ═══════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum StoreError {
    /// The service could not be reached at all.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("service returned {status}: {body}")]
    Service { status: u16, body: String },

    /// The response body was not a JSON array of rows.
    #[error("invalid response payload: {0}")]
    Decode(String),
}

// ═══════════════════════════════════════════════════════════════════════════
// Filters
// ═══════════════════════════════════════════════════════════════════════════

/// A single column predicate, combined with AND when several are given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOp {
    /// Exact equality.
    Eq(String),
    /// Case-insensitive match where `*` stands for any run of characters.
    /// Without a `*` this is an exact, case-insensitive comparison.
    Ilike(String),
}

impl Filter {
    pub fn eq(column: &str, value: impl Into<String>) -> Self {
        Self { column: column.to_string(), op: FilterOp::Eq(value.into()) }
    }

    pub fn ilike(column: &str, pattern: impl Into<String>) -> Self {
        Self { column: column.to_string(), op: FilterOp::Ilike(pattern.into()) }
    }

    /// Case-insensitive substring match.
    pub fn contains(column: &str, needle: &str) -> Self {
        Self::ilike(column, format!("*{needle}*"))
    }

    /// Evaluate this predicate against a row, the way the service would.
    pub fn matches(&self, row: &Row) -> bool {
        let value = row.get(&self.column);
        match &self.op {
            FilterOp::Eq(expected) => match value {
                Some(Value::String(s)) => s == expected,
                Some(other) => other.to_string() == *expected,
                None => false,
            },
            FilterOp::Ilike(pattern) => match value {
                Some(Value::String(s)) => ilike_match(pattern, s),
                _ => false,
            },
        }
    }
}

/// Wildcard match with `*`, case-insensitive, anchored at both ends.
fn ilike_match(pattern: &str, text: &str) -> bool {
    let pattern = pattern.to_lowercase();
    let text = text.to_lowercase();
    let segments: Vec<&str> = pattern.split('*').collect();
    if segments.len() == 1 {
        return text == pattern;
    }
    let mut pos = 0usize;
    for (i, segment) in segments.iter().enumerate() {
        if segment.is_empty() {
            continue;
        }
        if i == 0 {
            if !text.starts_with(segment) {
                return false;
            }
            pos = segment.len();
        } else if i == segments.len() - 1 {
            return text.len() >= pos + segment.len() && text[pos..].ends_with(segment);
        } else {
            match text[pos..].find(segment) {
                Some(found) => pos += found + segment.len(),
                None => return false,
            }
        }
    }
    true
}

// ═══════════════════════════════════════════════════════════════════════════
// Store contract
// ═══════════════════════════════════════════════════════════════════════════

/// Table-scoped CRUD against the record service.
///
/// Object safe so commands and handlers can share one `Arc<dyn RecordStore>`.
/// Write operations return the affected rows; an empty vector means the
/// service accepted the call but touched nothing.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch rows matching every filter, newest-first per service order,
    /// up to `limit` when given.
    async fn select(
        &self,
        table: &str,
        filters: &[Filter],
        limit: Option<u32>,
    ) -> Result<Vec<Row>, StoreError>;

    /// Insert one record, returning the stored representation.
    async fn insert(&self, table: &str, record: Row) -> Result<Vec<Row>, StoreError>;

    /// Apply `changes` to every row matching `filter`, returning the
    /// updated rows.
    async fn update(&self, table: &str, changes: Row, filter: Filter)
        -> Result<Vec<Row>, StoreError>;

    /// Delete rows matching `filter`, returning the removed rows.
    async fn delete(&self, table: &str, filter: Filter) -> Result<Vec<Row>, StoreError>;
}

// ═══════════════════════════════════════════════════════════════════════════
// Row helpers
// ═══════════════════════════════════════════════════════════════════════════

/// Build a row from any serialisable value. Values that do not serialise to
/// a JSON object yield an empty row.
pub fn to_row<T: Serialize>(value: &T) -> Row {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => map,
        _ => Row::new(),
    }
}

/// Service-assigned id of a row, if present. Ids are strings on the wire
/// but some tables use numeric keys.
pub fn row_id(row: &Row) -> Option<String> {
    match row.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
