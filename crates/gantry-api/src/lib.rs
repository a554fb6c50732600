//! Gantry API crate - axum HTTP server, route handlers, HTML dashboard.
//!
//! Exposes action execution, listing, statistics, and history over a
//! token-protected JSON API. Every execution goes through the shared
//! [`gantry_action::Dispatcher`].

pub mod auth;
pub mod dashboard;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;
