// src/types.rs

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// How a run request is fanned out to an array.
///
/// - `Instance`: list the array's current instances and POST one
///   `run_executable` per instance (default).
/// - `Array`: POST a single `multi_run_executable` to the array and let the
///   API fan out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchGranularity {
    #[default]
    Instance,
    Array,
}

impl FromStr for DispatchGranularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "instance" => Ok(DispatchGranularity::Instance),
            "array" => Ok(DispatchGranularity::Array),
            other => Err(format!(
                "invalid dispatch granularity: {other} (expected \"instance\" or \"array\")"
            )),
        }
    }
}

impl fmt::Display for DispatchGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchGranularity::Instance => f.write_str("instance"),
            DispatchGranularity::Array => f.write_str("array"),
        }
    }
}

/// Last known state of one dispatched execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Dispatched, not yet observed in a terminal state.
    Pending,
    Completed,
    Failed,
    /// The last status check failed or returned no summary.
    Unknown,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
            TaskStatus::Unknown => "unknown",
        };
        f.write_str(s)
    }
}
