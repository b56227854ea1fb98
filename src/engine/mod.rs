// src/engine/mod.rs

//! Orchestration facade.
//!
//! One call walks through
//! `Resolving → (NoOpReport | Dispatching) → Polling → Done`:
//! - resolution failures abort the call before anything is dispatched;
//! - dispatch and poll failures are isolated per target/task and only show
//!   up as missing entries in the outcome.
//!
//! [`Orchestrator`] drives the phases; [`report`] renders an outcome for
//! humans.

pub mod orchestrator;
pub mod report;

use std::fmt;
use std::time::Duration;

use crate::dispatch::DispatchOutcome;
use crate::locate::ExecutableRef;
use crate::poll::PollReport;

pub use orchestrator::Orchestrator;
pub use report::render_outcome;

/// Phases of one orchestration call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Resolving,
    NoOpReport,
    Dispatching,
    Polling,
    Done,
}

impl Phase {
    /// The phase entered once `self` has completed.
    pub fn after(self, noop: bool) -> Phase {
        match self {
            Phase::Resolving if noop => Phase::NoOpReport,
            Phase::Resolving => Phase::Dispatching,
            Phase::NoOpReport => Phase::Done,
            Phase::Dispatching => Phase::Polling,
            Phase::Polling | Phase::Done => Phase::Done,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Resolving => "resolving",
            Phase::NoOpReport => "noop-report",
            Phase::Dispatching => "dispatching",
            Phase::Polling => "polling",
            Phase::Done => "done",
        };
        f.write_str(s)
    }
}

/// Parameters of one orchestration call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    /// Array name, matched fuzzily.
    pub array: String,
    /// RightScript name, or a `cookbook::recipe` reference.
    pub executable: String,
    pub noop: bool,
    /// Poll budget; zero skips polling.
    pub wait: Duration,
}

/// What a no-op run would have done for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoOpRecord {
    pub executable: String,
    pub array: String,
    /// `None` for array-level records.
    pub instance: Option<String>,
}

impl fmt::Display for NoOpRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.instance {
            Some(ref instance) => write!(
                f,
                "NOOP: Would have run {} on {} (array {}).",
                self.executable, instance, self.array
            ),
            None => write!(f, "NOOP: Would have run {} on {}.", self.executable, self.array),
        }
    }
}

/// Result of one orchestration call.
#[derive(Debug)]
pub enum RunOutcome {
    /// Dry run: nothing was dispatched.
    NoOp(Vec<NoOpRecord>),
    Dispatched {
        executable: ExecutableRef,
        /// Task statuses reflect the last poll observation, if polling ran.
        dispatch: DispatchOutcome,
        /// `None` when the wait budget was zero.
        poll: Option<PollReport>,
    },
}

impl RunOutcome {
    /// Final summaries keyed by task location, if polling ran.
    pub fn poll_result(&self) -> Option<&std::collections::BTreeMap<String, String>> {
        match self {
            RunOutcome::Dispatched {
                poll: Some(report), ..
            } => Some(&report.finished),
            _ => None,
        }
    }
}
