//! Action dispatch for Gantry.
//!
//! Resolves action names to invocable units through a pluggable provider,
//! caches successful resolutions, and runs every invocation through a single
//! dispatch path that times the call and records its outcome.

pub mod dispatcher;
pub mod error;
pub mod provider;
pub mod registry;
pub mod scaffold;
pub mod types;

pub use dispatcher::Dispatcher;
pub use error::ActionError;
pub use provider::{ActionProvider, FnInvocable, Invocable, ProcessProvider, StaticProvider};
pub use registry::ActionRegistry;
pub use scaffold::scaffold_action;
pub use types::validate_action_name;
