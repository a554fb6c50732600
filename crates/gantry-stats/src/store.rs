//! Concurrency-safe, durable statistics store.
//!
//! All state lives in one `RwLock<StatsSnapshot>`. A recorded execution holds
//! the write lock across the in-memory update *and* the full-file rewrite, so
//! writers never interleave and readers never observe a half-applied update.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use gantry_core::types::{ActionStats, ExecutionRecord};

use crate::error::StatsError;
use crate::snapshot::StatsSnapshot;

/// Single source of truth for execution telemetry.
pub struct StatsStore {
    path: PathBuf,
    snapshot: RwLock<StatsSnapshot>,
}

impl StatsStore {
    /// Open the store backed by `path`.
    ///
    /// An existing non-empty file is loaded; otherwise an empty snapshot is
    /// written immediately so other processes can read the file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StatsError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let snapshot = match StatsSnapshot::load(&path)? {
            Some(snapshot) => {
                info!(
                    path = %path.display(),
                    actions = snapshot.stats.len(),
                    "Statistics loaded"
                );
                snapshot
            }
            None => {
                let snapshot = StatsSnapshot::default();
                snapshot.write_atomic(&path).map_err(|e| match e {
                    StatsError::Persistence(msg) => StatsError::Io(std::io::Error::other(msg)),
                    other => other,
                })?;
                info!(path = %path.display(), "Statistics file initialized");
                snapshot
            }
        };

        Ok(Self {
            path,
            snapshot: RwLock::new(snapshot),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record one execution and persist the whole snapshot.
    ///
    /// The in-memory update always succeeds. `Err(StatsError::Persistence)`
    /// means only the durability of this record is in doubt; it is a warning
    /// and the update is not rolled back.
    pub fn record_execution(
        &self,
        name: &str,
        duration: Duration,
        success: bool,
        result: &str,
    ) -> Result<(), StatsError> {
        let mut snapshot = self.write();
        snapshot.record(name, duration, success, result, Utc::now());
        debug!(action = %name, success, "Execution recorded");

        if let Err(e) = snapshot.write_atomic(&self.path) {
            warn!(error = %e, path = %self.path.display(), "Failed to save statistics");
            return Err(e);
        }
        Ok(())
    }

    /// Aggregates for one action, or `None` if it never ran.
    pub fn get_stats(&self, name: &str) -> Option<ActionStats> {
        self.read().stats.get(name).cloned()
    }

    /// Copy of every aggregate.
    pub fn get_all_stats(&self) -> BTreeMap<String, ActionStats> {
        self.read().stats.clone()
    }

    /// Execution history for one action in completion order; empty if none.
    pub fn get_history(&self, name: &str) -> Vec<ExecutionRecord> {
        self.read().history.get(name).cloned().unwrap_or_default()
    }

    /// Deep copy of every action's history.
    pub fn get_all_history(&self) -> BTreeMap<String, Vec<ExecutionRecord>> {
        self.read().history.clone()
    }

    /// The newest `limit` records for `name`, newest first.
    pub fn recent_history(&self, name: &str, limit: usize) -> Vec<ExecutionRecord> {
        self.read()
            .history
            .get(name)
            .map(|records| records.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default()
    }

    /// Names of every action with recorded statistics.
    pub fn action_names(&self) -> Vec<String> {
        self.read().stats.keys().cloned().collect()
    }

    /// Consistent copy of aggregates and history taken under one lock.
    pub fn snapshot(&self) -> StatsSnapshot {
        self.read().clone()
    }

    // A panic while holding the lock cannot leave the snapshot half-updated
    // (record is infallible once started), so poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, StatsSnapshot> {
        self.snapshot.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, StatsSnapshot> {
        self.snapshot.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for StatsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsStore")
            .field("path", &self.path)
            .finish()
    }
}
