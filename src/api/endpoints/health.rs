//! Health check endpoint.

use axum::Json;
use serde::Serialize;

use crate::config;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// `GET /health` — liveness check, no store access.
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok", version: config::APP_VERSION })
}
