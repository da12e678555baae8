//! Application state for the HTTP server.

use std::sync::Arc;

use crate::store::FullStore;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The single authority over the occupancy state.
    pub store: Arc<dyn FullStore>,
}

impl AppState {
    /// Create a new application state around the given store.
    pub fn new(store: Arc<dyn FullStore>) -> Self {
        Self { store }
    }
}
