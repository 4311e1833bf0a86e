//! Application state for the web layer.

use std::sync::Arc;

use crate::catalog::RouteCatalog;
use crate::planner::SearchConfig;

/// Shared application state.
///
/// Cloned into every handler; both fields are read-only after startup.
#[derive(Clone)]
pub struct AppState {
    /// Route catalog the finder reads from
    pub catalog: Arc<dyn RouteCatalog>,

    /// Connection search configuration
    pub config: Arc<SearchConfig>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(catalog: impl RouteCatalog + 'static, config: SearchConfig) -> Self {
        Self {
            catalog: Arc::new(catalog),
            config: Arc::new(config),
        }
    }
}
