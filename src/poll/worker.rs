// src/poll/worker.rs

//! The per-worker poll loop.
//!
//! The worker owns a FIFO queue of its tasks. Each iteration pops one task,
//! checks its status, records it if terminal and requeues it otherwise, then
//! sleeps one pacing interval. Every wait is cut short by the shared
//! deadline and by cancellation, so the loop returns no later than the
//! deadline plus scheduling noise.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, sleep_until, timeout_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::RemoteApi;
use crate::dispatch::DispatchTask;
use crate::errors::ApiError;
use crate::types::TaskStatus;

use super::report::{PollReport, UnfinishedReason, UnfinishedTask};

/// Summary used when the status body carries none.
const MISSING_SUMMARY: &str = "unknown";

enum Check {
    Summary(Result<Option<String>, ApiError>),
    DeadlineReached,
    Canceled,
}

pub async fn run_worker<A: RemoteApi>(
    api: Arc<A>,
    tasks: Vec<DispatchTask>,
    interval: Duration,
    deadline: Instant,
    cancel: CancellationToken,
) -> PollReport {
    let mut queue: VecDeque<DispatchTask> = tasks.into();
    let mut report = PollReport::default();

    loop {
        if queue.is_empty() || cancel.is_cancelled() || Instant::now() >= deadline {
            break;
        }
        let Some(mut task) = queue.pop_front() else {
            break;
        };

        let check = tokio::select! {
            biased;
            _ = cancel.cancelled() => Check::Canceled,
            res = timeout_at(deadline, api.task_summary(task.location())) => match res {
                Ok(summary) => Check::Summary(summary),
                Err(_) => Check::DeadlineReached,
            },
        };

        match check {
            Check::Summary(Ok(summary)) => {
                let summary = summary.unwrap_or_else(|| MISSING_SUMMARY.to_string());
                match task.observe(&summary) {
                    TaskStatus::Completed => {
                        info!(node = %task.target(), summary = %summary, "execution completed");
                        report.finished.insert(task.location().to_string(), summary);
                    }
                    TaskStatus::Failed => {
                        warn!(node = %task.target(), summary = %summary, "execution failed");
                        report.finished.insert(task.location().to_string(), summary);
                    }
                    TaskStatus::Pending | TaskStatus::Unknown => {
                        info!(
                            node = %task.target(),
                            summary = %summary,
                            "waiting for execution to finish"
                        );
                        queue.push_back(task);
                    }
                }
            }
            Check::Summary(Err(error)) => {
                warn!(
                    location = task.location(),
                    error = %error,
                    "status check failed; will retry"
                );
                task.mark_unknown();
                queue.push_back(task);
            }
            Check::DeadlineReached | Check::Canceled => {
                queue.push_front(task);
                break;
            }
        }

        if queue.is_empty() {
            break;
        }

        // Pacing between dequeues.
        let wake = Instant::now()
            .checked_add(interval)
            .map_or(deadline, |next| next.min(deadline));
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {}
            _ = sleep_until(wake) => {}
        }
    }

    let reason = if cancel.is_cancelled() {
        UnfinishedReason::Canceled
    } else {
        UnfinishedReason::TimedOut
    };
    if !queue.is_empty() {
        debug!(remaining = queue.len(), %reason, "poll worker giving up on tasks");
    }
    report
        .unfinished
        .extend(queue.into_iter().map(|task| UnfinishedTask::from_task(task, reason)));

    report
}
