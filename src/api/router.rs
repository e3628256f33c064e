//! Route table for the medication API.

use axum::routing::get;
use axum::Router;

use crate::api::endpoints::{health, medications};
use crate::api::types::ApiContext;

/// Build the API router with all routes attached.
pub fn api_router(ctx: ApiContext) -> Router {
    Router::new()
        .route("/health", get(health::check))
        .route("/medications", get(medications::list).post(medications::create))
        .route(
            "/medications/:id",
            get(medications::detail)
                .put(medications::update)
                .delete(medications::remove),
        )
        .with_state(ctx)
}
