//! Application state for the HTTP server.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::earthengine::EarthEngine;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Compute-service handle, constructed once at startup
    pub engine: Arc<dyn EarthEngine>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(engine: Arc<dyn EarthEngine>, config: AppConfig) -> Self {
        Self {
            engine,
            config: Arc::new(config),
        }
    }
}
