//! Shared state for the API layer.

use std::sync::Arc;

use crate::store::RecordStore;

/// Context handed to every route handler. Carries the injected record
/// store; cloning is cheap.
#[derive(Clone)]
pub struct ApiContext {
    pub store: Arc<dyn RecordStore>,
}

impl ApiContext {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}
