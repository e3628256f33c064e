//! REST client for the hosted table service.
//!
//! Speaks the PostgREST dialect Supabase exposes: rows live under
//! `{base}/rest/v1/{table}`, predicates travel as `column=op.value` query
//! parameters, and writes ask for `Prefer: return=representation` so the
//! affected rows come back in the response body.

use async_trait::async_trait;

use crate::config::ServiceConfig;

use super::{Filter, FilterOp, RecordStore, Row, StoreError};

pub struct RestStore {
    base_url: String,
    key: String,
    client: reqwest::Client,
}

impl RestStore {
    pub fn new(config: &ServiceConfig) -> Self {
        Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            key: config.key.clone(),
            client: reqwest::Client::new(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Base request with the service credentials attached. The key doubles
    /// as the bearer token, as the hosted service expects.
    fn request(&self, method: reqwest::Method, table: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.table_url(table))
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
    }

    async fn rows_from(response: reqwest::Response) -> Result<Vec<Row>, StoreError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Service { status: status.as_u16(), body });
        }
        response
            .json::<Vec<Row>>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }
}

/// Render filters as PostgREST query parameters.
fn filter_params(filters: &[Filter]) -> Vec<(String, String)> {
    filters
        .iter()
        .map(|filter| match &filter.op {
            FilterOp::Eq(value) => (filter.column.clone(), format!("eq.{value}")),
            FilterOp::Ilike(pattern) => (filter.column.clone(), format!("ilike.{pattern}")),
        })
        .collect()
}

#[async_trait]
impl RecordStore for RestStore {
    async fn select(
        &self,
        table: &str,
        filters: &[Filter],
        limit: Option<u32>,
    ) -> Result<Vec<Row>, StoreError> {
        let mut params = vec![("select".to_string(), "*".to_string())];
        params.extend(filter_params(filters));
        if let Some(limit) = limit {
            params.push(("limit".to_string(), limit.to_string()));
        }

        tracing::debug!(table, filters = filters.len(), "selecting rows");
        let response = self
            .request(reqwest::Method::GET, table)
            .query(&params)
            .send()
            .await?;
        Self::rows_from(response).await
    }

    async fn insert(&self, table: &str, record: Row) -> Result<Vec<Row>, StoreError> {
        tracing::debug!(table, "inserting row");
        let response = self
            .request(reqwest::Method::POST, table)
            .header("Prefer", "return=representation")
            .json(&record)
            .send()
            .await?;
        Self::rows_from(response).await
    }

    async fn update(
        &self,
        table: &str,
        changes: Row,
        filter: Filter,
    ) -> Result<Vec<Row>, StoreError> {
        tracing::debug!(table, column = %filter.column, "updating rows");
        let response = self
            .request(reqwest::Method::PATCH, table)
            .query(&filter_params(std::slice::from_ref(&filter)))
            .header("Prefer", "return=representation")
            .json(&changes)
            .send()
            .await?;
        Self::rows_from(response).await
    }

    async fn delete(&self, table: &str, filter: Filter) -> Result<Vec<Row>, StoreError> {
        tracing::debug!(table, column = %filter.column, "deleting rows");
        let response = self
            .request(reqwest::Method::DELETE, table)
            .query(&filter_params(std::slice::from_ref(&filter)))
            .header("Prefer", "return=representation")
            .send()
            .await?;
        Self::rows_from(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(url: &str) -> RestStore {
        RestStore::new(&ServiceConfig { url: url.to_string(), key: "test-key".to_string() })
    }

    #[test]
    fn new_trims_trailing_slash() {
        let s = store("http://localhost:54321/");
        assert_eq!(s.base_url, "http://localhost:54321");
    }

    #[test]
    fn table_url_targets_the_rest_namespace() {
        let s = store("http://localhost:54321");
        assert_eq!(s.table_url("medications"), "http://localhost:54321/rest/v1/medications");
    }

    #[test]
    fn filters_render_as_postgrest_operators() {
        let params = filter_params(&[
            Filter::eq("id", "abc"),
            Filter::contains("name", "aspirin"),
        ]);
        assert_eq!(
            params,
            vec![
                ("id".to_string(), "eq.abc".to_string()),
                ("name".to_string(), "ilike.*aspirin*".to_string()),
            ]
        );
    }
}
