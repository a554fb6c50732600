//! Gantry core crate - configuration, errors, and shared telemetry types.

pub mod config;
pub mod error;
pub mod logfile;
pub mod types;

pub use config::GantryConfig;
pub use error::{GantryError, Result};
pub use types::*;
