//! API error type and its HTTP mapping.
//!
//! Every failure leaves the API as a flat `{"error": "<message>"}` body
//! with the matching status code, so clients never parse two shapes.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request was well-formed HTTP but semantically unusable.
    #[error("{0}")]
    BadRequest(String),

    /// No record matches the request.
    #[error("{0}")]
    NotFound(String),

    /// The record service failed underneath us.
    #[error("{0}")]
    Store(#[from] StoreError),
}

/// A malformed request body surfaces as a 400 with the rejection's own
/// description, not as a framework-shaped 422.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store(err) => {
                tracing::error!(error = %err, "store operation failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}
