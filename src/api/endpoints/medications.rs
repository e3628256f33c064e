//! Medication resource endpoints.
//!
//! Row bodies pass through as the service returns them; only the write
//! shapes are typed. Lookup misses are 404s with the messages the CLI's
//! siblings have always used.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::config;
use crate::models::{MedicationPatch, NewMedication};
use crate::store::{row_id, Filter, Row};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub query: String,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMedication {
    pub name: String,
    #[serde(default)]
    pub generic_name: Option<String>,
    #[serde(default)]
    pub drug_class: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub prescription_only: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct UpdatedResponse {
    pub message: String,
    pub medication: Row,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub message: String,
}

/// `GET /medications` — name search, or a plain listing when the query is
/// empty. Both capped at `limit`.
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<Row>>, ApiError> {
    let limit = params.limit.unwrap_or(config::DEFAULT_SEARCH_LIMIT);
    let filters = if params.query.is_empty() {
        Vec::new()
    } else {
        vec![Filter::contains("name", &params.query)]
    };
    let rows = ctx.store.select("medications", &filters, Some(limit)).await?;
    Ok(Json(rows))
}

/// `POST /medications` — create a record. The slug is derived from the
/// name; records default to prescription-only.
pub async fn create(
    State(ctx): State<ApiContext>,
    payload: Result<Json<CreateMedication>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let Json(body) = payload?;
    let record = NewMedication::new(
        body.name.clone(),
        body.generic_name,
        body.drug_class,
        body.description,
        body.prescription_only.unwrap_or(true),
    );
    let rows = ctx.store.insert("medications", record.into_row()).await?;
    let id = rows
        .first()
        .and_then(row_id)
        .ok_or_else(|| ApiError::BadRequest(format!("Failed to add {}", body.name)))?;

    tracing::info!(%id, name = %body.name, "medication created");
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse { id, message: format!("Successfully added {}", body.name) }),
    ))
}

/// `GET /medications/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<Row>, ApiError> {
    let rows = ctx
        .store
        .select("medications", &[Filter::eq("id", &id)], Some(1))
        .await?;
    let row = rows
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::NotFound("Medication not found".to_string()))?;
    Ok(Json(row))
}

/// `PUT /medications/:id` — partial update. An empty patch is rejected
/// before the store is touched.
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    payload: Result<Json<MedicationPatch>, JsonRejection>,
) -> Result<Json<UpdatedResponse>, ApiError> {
    let Json(patch) = payload?;
    if patch.is_empty() {
        return Err(ApiError::BadRequest("No fields to update".to_string()));
    }
    let rows = ctx
        .store
        .update("medications", patch.changes(), Filter::eq("id", &id))
        .await?;
    let medication = rows
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::NotFound("Medication not found".to_string()))?;

    tracing::info!(%id, "medication updated");
    Ok(Json(UpdatedResponse {
        message: "Medication updated successfully".to_string(),
        medication,
    }))
}

/// `DELETE /medications/:id`
pub async fn remove(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let rows = ctx.store.delete("medications", Filter::eq("id", &id)).await?;
    if rows.is_empty() {
        return Err(ApiError::NotFound(
            "Failed to delete medication or medication not found".to_string(),
        ));
    }

    tracing::info!(%id, "medication deleted");
    Ok(Json(DeletedResponse { message: "Medication deleted successfully".to_string() }))
}
