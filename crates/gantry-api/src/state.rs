//! Application state shared across all route handlers.

use std::sync::Arc;
use std::time::Instant;

use gantry_action::Dispatcher;
use gantry_core::GantryConfig;

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GantryConfig>,
    /// Single execution path; also gives access to the registry and store.
    pub dispatcher: Arc<Dispatcher>,
    /// Token required by protected routes.
    pub api_token: String,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: GantryConfig, dispatcher: Arc<Dispatcher>) -> Self {
        let api_token = config.server.api_token.clone();
        Self {
            config: Arc::new(config),
            dispatcher,
            api_token,
            start_time: Instant::now(),
        }
    }
}
