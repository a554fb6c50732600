//! The persisted statistics document.
//!
//! One JSON object with two top-level maps keyed by action name:
//! `stats` (aggregates) and `history` (ordered execution records).

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gantry_core::types::{ActionStats, ExecutionRecord, ExecutionStatus};

use crate::error::StatsError;

/// Complete telemetry state at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    #[serde(default)]
    pub stats: BTreeMap<String, ActionStats>,
    #[serde(default)]
    pub history: BTreeMap<String, Vec<ExecutionRecord>>,
}

impl StatsSnapshot {
    /// Apply one execution: update the aggregate and append to history.
    pub fn record(
        &mut self,
        name: &str,
        duration: Duration,
        success: bool,
        result: &str,
        at: DateTime<Utc>,
    ) -> ExecutionRecord {
        self.stats
            .entry(name.to_string())
            .or_default()
            .record(duration, success, at);

        let record = ExecutionRecord {
            timestamp: at,
            duration,
            status: ExecutionStatus::from_success(success),
            result: result.to_string(),
        };
        self.history
            .entry(name.to_string())
            .or_default()
            .push(record.clone());
        record
    }

    /// Read a snapshot from `path`.
    ///
    /// Returns `Ok(None)` when the file is missing or empty.
    pub fn load(path: &Path) -> Result<Option<Self>, StatsError> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| StatsError::CorruptState {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<Vec<u8>, StatsError> {
        serde_json::to_vec_pretty(self).map_err(|e| StatsError::Persistence(e.to_string()))
    }

    /// Write the snapshot to `path` all-or-nothing.
    ///
    /// The document goes to a sibling temp file which is synced and then
    /// renamed over the target, so readers only ever see a complete file.
    pub fn write_atomic(&self, path: &Path) -> Result<(), StatsError> {
        let bytes = self.to_json()?;
        let tmp_path = temp_path(path);

        let write = || -> std::io::Result<()> {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(&bytes)?;
            file.write_all(b"\n")?;
            file.sync_all()?;
            fs::rename(&tmp_path, path)
        };

        write().map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            StatsError::Persistence(format!("{}: {}", path.display(), e))
        })
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_creates_entries_lazily() {
        let mut snapshot = StatsSnapshot::default();
        assert!(snapshot.stats.is_empty());

        let record = snapshot.record("echo", Duration::from_millis(5), true, "ok", Utc::now());
        assert_eq!(record.status, ExecutionStatus::Success);
        assert_eq!(snapshot.stats["echo"].total_calls, 1);
        assert_eq!(snapshot.history["echo"].len(), 1);
        assert_eq!(snapshot.history["echo"][0], record);
    }

    #[test]
    fn test_failure_record_carries_error_text() {
        let mut snapshot = StatsSnapshot::default();
        let record = snapshot.record("boom", Duration::ZERO, false, "boom failed", Utc::now());
        assert_eq!(record.status, ExecutionStatus::Failure);
        assert_eq!(record.result, "boom failed");
        assert_eq!(snapshot.stats["boom"].successful_calls, 0);
    }

    #[test]
    fn test_load_missing_and_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        assert!(StatsSnapshot::load(&path).unwrap().is_none());

        fs::write(&path, "  \n").unwrap();
        assert!(StatsSnapshot::load(&path).unwrap().is_none());
    }

    #[test]
    fn test_load_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        fs::write(&path, "{\"stats\": [").unwrap();

        let err = StatsSnapshot::load(&path).unwrap_err();
        assert!(matches!(err, StatsError::CorruptState { .. }));
    }

    #[test]
    fn test_load_accepts_missing_top_level_maps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        fs::write(&path, "{}").unwrap();

        let snapshot = StatsSnapshot::load(&path).unwrap().unwrap();
        assert_eq!(snapshot, StatsSnapshot::default());
    }

    #[test]
    fn test_write_atomic_roundtrip_and_no_leftover() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");

        let mut snapshot = StatsSnapshot::default();
        snapshot.record("a", Duration::new(1, 7), true, "x", Utc::now());
        snapshot.record("b", Duration::from_micros(3), false, "y", Utc::now());
        snapshot.write_atomic(&path).unwrap();

        assert!(!temp_path(&path).exists());
        let loaded = StatsSnapshot::load(&path).unwrap().unwrap();
        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn test_document_layout() {
        let mut snapshot = StatsSnapshot::default();
        snapshot.record("echo", Duration::from_nanos(42), true, "a,b", Utc::now());

        let value: serde_json::Value =
            serde_json::from_slice(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(value["stats"]["echo"]["total_calls"], 1);
        assert_eq!(value["stats"]["echo"]["total_duration"], 42);
        assert_eq!(value["history"]["echo"][0]["status"], "success");
        assert_eq!(value["history"]["echo"][0]["result"], "a,b");
        assert!(value["history"]["echo"][0]["timestamp"].is_string());
    }

    #[test]
    fn test_failed_write_keeps_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");

        let mut snapshot = StatsSnapshot::default();
        snapshot.record("echo", Duration::ZERO, true, "first", Utc::now());
        snapshot.write_atomic(&path).unwrap();

        // A directory squatting on the temp path makes the write fail.
        fs::create_dir(temp_path(&path)).unwrap();
        snapshot.record("echo", Duration::ZERO, true, "second", Utc::now());
        let err = snapshot.write_atomic(&path).unwrap_err();
        assert!(matches!(err, StatsError::Persistence(_)));

        let on_disk = StatsSnapshot::load(&path).unwrap().unwrap();
        assert_eq!(on_disk.history["echo"].len(), 1);
        assert_eq!(on_disk.history["echo"][0].result, "first");
    }
}
