use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Enums
// =============================================================================

/// Outcome of one action invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// The action returned a result.
    Success,
    /// The action returned an error (or timed out).
    Failure,
}

impl ExecutionStatus {
    pub fn from_success(success: bool) -> Self {
        if success {
            ExecutionStatus::Success
        } else {
            ExecutionStatus::Failure
        }
    }

    pub fn is_success(self) -> bool {
        self == ExecutionStatus::Success
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionStatus::Success => write!(f, "success"),
            ExecutionStatus::Failure => write!(f, "failure"),
        }
    }
}

impl std::str::FromStr for ExecutionStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(ExecutionStatus::Success),
            "failure" => Ok(ExecutionStatus::Failure),
            _ => Err(format!("Unknown execution status: {}", s)),
        }
    }
}

// =============================================================================
// Telemetry
// =============================================================================

/// Aggregated counters for one action.
///
/// `successful_calls <= total_calls` always holds; `total_duration` only grows.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionStats {
    pub total_calls: u64,
    pub successful_calls: u64,
    #[serde(with = "duration_nanos")]
    pub total_duration: Duration,
    pub last_executed: Option<DateTime<Utc>>,
}

impl ActionStats {
    /// Fold one execution into the aggregate.
    pub fn record(&mut self, duration: Duration, success: bool, at: DateTime<Utc>) {
        self.total_calls += 1;
        if success {
            self.successful_calls += 1;
        }
        self.total_duration = self.total_duration.saturating_add(duration);
        self.last_executed = Some(at);
    }

    pub fn failed_calls(&self) -> u64 {
        self.total_calls - self.successful_calls
    }

    /// Success percentage in `[0, 100]`, `None` before the first call.
    pub fn success_rate(&self) -> Option<f64> {
        if self.total_calls == 0 {
            return None;
        }
        Some(self.successful_calls as f64 / self.total_calls as f64 * 100.0)
    }

    pub fn average_duration(&self) -> Option<Duration> {
        if self.total_calls == 0 {
            return None;
        }
        let nanos = self.total_duration.as_nanos() / u128::from(self.total_calls);
        Some(Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX)))
    }
}

/// One entry in an action's execution history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub timestamp: DateTime<Utc>,
    #[serde(with = "duration_nanos")]
    pub duration: Duration,
    pub status: ExecutionStatus,
    /// The action's returned value, or its error text on failure.
    pub result: String,
}

/// Serde adapter storing a `Duration` as integer nanoseconds.
pub mod duration_nanos {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_nanos)
    }
}

/// Human-readable duration with a unit suited to its magnitude.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 1e-6 {
        format!("{:.2} ns", secs * 1e9)
    } else if secs < 1e-3 {
        format!("{:.2} µs", secs * 1e6)
    } else if secs < 1.0 {
        format!("{:.2} ms", secs * 1e3)
    } else {
        format!("{:.2} s", secs)
    }
}
