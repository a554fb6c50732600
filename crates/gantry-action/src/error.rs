//! Error types for action resolution and execution.

use std::time::Duration;

/// Errors from resolving, invoking, or scaffolding an action.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    /// The provider does not know the name.
    #[error("Action not found: {0}")]
    NotFound(String),
    /// The provider knows the name but could not produce an invocable.
    #[error("Failed to resolve action {name}: {reason}")]
    ResolutionFailed { name: String, reason: String },
    /// The action itself reported an error. Displays the action's own text.
    #[error("{0}")]
    Invocation(String),
    #[error("Action execution timed out after {0:?}")]
    Timeout(Duration),
    #[error("Invalid action name: {0}")]
    InvalidName(String),
    #[error("Action already exists: {0}")]
    AlreadyExists(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ActionError {
    /// True for errors raised before the action started running.
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            ActionError::NotFound(_) | ActionError::ResolutionFailed { .. }
        )
    }
}
