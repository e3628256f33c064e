//! HTTP resource interface over the medication store.
//!
//! Exposes the same operations as the CLI commands behind a small REST
//! surface. `api_router()` returns a plain axum `Router` so tests can
//! drive it without a socket; `server` owns the listener lifecycle.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::ApiServer;
pub use types::ApiContext;
