// src/poll/report.rs

use std::collections::BTreeMap;
use std::fmt;

use crate::dispatch::{DispatchTarget, DispatchTask};

/// Why a task has no final summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnfinishedReason {
    /// The wait budget ran out before a terminal summary was seen.
    TimedOut,
    /// Polling was cancelled; the remote outcome is unknown.
    Canceled,
    /// The worker owning the task died; the remote outcome is unknown.
    WorkerFailed,
}

impl fmt::Display for UnfinishedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnfinishedReason::TimedOut => f.write_str("timed out"),
            UnfinishedReason::Canceled => f.write_str("canceled, outcome unknown"),
            UnfinishedReason::WorkerFailed => f.write_str("poll worker failed, outcome unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnfinishedTask {
    pub location: String,
    pub target: DispatchTarget,
    pub reason: UnfinishedReason,
    /// `None` if the task was never checked.
    pub last_summary: Option<String>,
}

impl UnfinishedTask {
    pub fn from_task(task: DispatchTask, reason: UnfinishedReason) -> Self {
        Self {
            location: task.location().to_string(),
            last_summary: task.last_summary().map(str::to_string),
            target: task.target().clone(),
            reason,
        }
    }
}

/// Result of one poll run.
///
/// `finished` only ever holds summaries starting with `completed` or
/// `failed`, keyed by task location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollReport {
    pub finished: BTreeMap<String, String>,
    pub unfinished: Vec<UnfinishedTask>,
}

impl PollReport {
    pub fn merge(&mut self, other: PollReport) {
        self.finished.extend(other.finished);
        self.unfinished.extend(other.unfinished);
    }

    pub fn sort_unfinished(&mut self) {
        self.unfinished.sort_by(|a, b| a.location.cmp(&b.location));
    }

    pub fn is_complete(&self) -> bool {
        self.unfinished.is_empty()
    }
}
