//! Action provider seam.
//!
//! An [`ActionProvider`] turns a name into an [`Invocable`]. The registry and
//! dispatcher only ever see these two traits; how an action is actually run
//! (a child process, an in-process closure) is the provider's business.

pub mod in_process;
pub mod process;

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ActionError;

pub use in_process::{FnInvocable, StaticProvider};
pub use process::ProcessProvider;

/// The resolved, callable form of an action.
#[async_trait]
pub trait Invocable: Send + Sync {
    /// Run the action with positional string arguments.
    ///
    /// `Ok` carries the action's result text. Any `Err` is an execution
    /// failure whose display text is recorded as the result.
    async fn call(&self, args: &[String]) -> Result<String, ActionError>;
}

/// Source of invocable actions.
pub trait ActionProvider: Send + Sync {
    /// Produce an invocable for `name`.
    ///
    /// Fails with [`ActionError::NotFound`] for unknown names and
    /// [`ActionError::ResolutionFailed`] when the action exists but cannot
    /// be made runnable.
    fn lookup(&self, name: &str) -> Result<Arc<dyn Invocable>, ActionError>;

    /// Every action name the provider knows about.
    fn list(&self) -> Result<BTreeSet<String>, ActionError>;
}
