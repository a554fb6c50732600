//! Gantry statistics crate - durable execution telemetry.
//!
//! Aggregates per-action counters and an append-only execution history,
//! persisted as a single JSON document that is rewritten atomically on
//! every recorded execution.

pub mod error;
pub mod snapshot;
pub mod store;

pub use error::StatsError;
pub use snapshot::StatsSnapshot;
pub use store::StatsStore;
