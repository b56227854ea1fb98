// src/dispatch/mod.rs

//! Fan-out of one executable to every member of the resolved arrays.
//!
//! - [`task`] holds the per-target bookkeeping types ([`DispatchTask`],
//!   [`DispatchTarget`], [`DispatchFailure`]).
//! - [`dispatcher`] issues the run-executable requests on a bounded pool and
//!   isolates per-target transport failures.

pub mod dispatcher;
pub mod task;

pub use dispatcher::Dispatcher;
pub use task::{DispatchFailure, DispatchOutcome, DispatchTarget, DispatchTask, classify_summary};
