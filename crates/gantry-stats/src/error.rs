//! Error types for the statistics store.

use std::path::PathBuf;

/// Errors from opening or persisting the statistics store.
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("Statistics I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Statistics file {path} is corrupt: {reason}")]
    CorruptState { path: PathBuf, reason: String },
    #[error("Failed to persist statistics: {0}")]
    Persistence(String),
}

impl From<StatsError> for gantry_core::GantryError {
    fn from(err: StatsError) -> Self {
        match err {
            StatsError::Io(e) => gantry_core::GantryError::Io(e),
            other => gantry_core::GantryError::Serialization(other.to_string()),
        }
    }
}
