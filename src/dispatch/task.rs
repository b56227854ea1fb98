// src/dispatch/task.rs

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::errors::ApiError;
use crate::locate::{ArrayHandle, InstanceHandle};
use crate::types::TaskStatus;

/// Status words the API puts at the start of a terminal summary, e.g.
/// `"completed: Connect instance to ELB"`.
static TERMINAL_SUMMARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(completed|failed)").expect("terminal summary pattern is valid")
});

/// Map a free-text task summary to a [`TaskStatus`].
pub fn classify_summary(summary: &str) -> TaskStatus {
    match TERMINAL_SUMMARY.captures(summary).and_then(|c| c.get(1)) {
        Some(m) if m.as_str() == "completed" => TaskStatus::Completed,
        Some(_) => TaskStatus::Failed,
        None if summary == "unknown" => TaskStatus::Unknown,
        None => TaskStatus::Pending,
    }
}

/// Where a run request was sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchTarget {
    /// One member instance, posted to `<instance>/run_executable`.
    Instance {
        array: String,
        instance: InstanceHandle,
    },
    /// A whole array, posted to `<array>/multi_run_executable`.
    Array(ArrayHandle),
}

impl DispatchTarget {
    pub fn name(&self) -> &str {
        match self {
            DispatchTarget::Instance { instance, .. } => &instance.name,
            DispatchTarget::Array(array) => &array.name,
        }
    }

    pub fn run_url(&self) -> String {
        match self {
            DispatchTarget::Instance { instance, .. } => instance.run_url(),
            DispatchTarget::Array(array) => array.multi_run_url(),
        }
    }
}

impl fmt::Display for DispatchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchTarget::Instance { array, instance } => {
                write!(f, "instance {} (array {})", instance.name, array)
            }
            DispatchTarget::Array(array) => write!(f, "array {}", array.name),
        }
    }
}

/// One outstanding remote execution.
///
/// Created by the dispatcher, mutated only by the poller. The location is
/// fixed at construction and the status never leaves a terminal state once
/// it reached one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchTask {
    target: DispatchTarget,
    location: String,
    status: TaskStatus,
    last_summary: Option<String>,
}

impl DispatchTask {
    pub fn new(target: DispatchTarget, location: impl Into<String>) -> Self {
        Self {
            target,
            location: location.into(),
            status: TaskStatus::Pending,
            last_summary: None,
        }
    }

    pub fn target(&self) -> &DispatchTarget {
        &self.target
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn last_summary(&self) -> Option<&str> {
        self.last_summary.as_deref()
    }

    /// Record a freshly observed summary and return the resulting status.
    ///
    /// Observations after a terminal status are ignored.
    pub fn observe(&mut self, summary: &str) -> TaskStatus {
        if self.status.is_terminal() {
            return self.status;
        }
        self.status = classify_summary(summary);
        self.last_summary = Some(summary.to_string());
        self.status
    }

    /// The last status check failed; keep the previous summary.
    pub fn mark_unknown(&mut self) {
        if !self.status.is_terminal() {
            self.status = TaskStatus::Unknown;
        }
    }
}

/// A target that contributed no task because a remote call failed.
#[derive(Debug)]
pub struct DispatchFailure {
    pub target: DispatchTarget,
    pub error: ApiError,
}

/// Everything one dispatch call produced.
#[derive(Debug, Default)]
pub struct DispatchOutcome {
    pub tasks: Vec<DispatchTask>,
    pub failures: Vec<DispatchFailure>,
}
