use thiserror::Error;

/// Top-level error type for the Gantry host.
///
/// Subsystem crates define their own error enums; this one covers the
/// configuration and process-level plumbing shared by the binary and the API.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GantryError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("API error: {0}")]
    Api(String),
}

impl From<toml::de::Error> for GantryError {
    fn from(err: toml::de::Error) -> Self {
        GantryError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for GantryError {
    fn from(err: toml::ser::Error) -> Self {
        GantryError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for GantryError {
    fn from(err: serde_json::Error) -> Self {
        GantryError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Gantry operations.
pub type Result<T> = std::result::Result<T, GantryError>;
