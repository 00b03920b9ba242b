//! Shared application state for all routes. Read-only after startup.

use crate::config::Registry;
use crate::store::Store;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub registry: Arc<Registry>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, registry: Registry) -> Self {
        AppState {
            store,
            registry: Arc::new(registry),
        }
    }
}
