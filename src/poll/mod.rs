// src/poll/mod.rs

//! Completion tracking for dispatched executions.
//!
//! - [`report`] defines the [`PollReport`] returned to the caller.
//! - [`worker`] is the paced, deadline-bounded loop one worker runs over its
//!   own subset of tasks.
//!
//! [`Poller`] splits the tasks across workers, runs them concurrently and
//! merges their partial reports once every worker returned.

pub mod report;
pub mod worker;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::{Id, JoinSet};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::api::RemoteApi;
use crate::config::PollSettings;
use crate::dispatch::DispatchTask;

pub use report::{PollReport, UnfinishedReason, UnfinishedTask};
pub use worker::run_worker;

/// Polls task locations until they finish, the budget runs out, or the
/// caller cancels.
pub struct Poller<A: RemoteApi + 'static> {
    api: Arc<A>,
    interval: Duration,
    concurrency: usize,
}

impl<A: RemoteApi + 'static> Poller<A> {
    pub fn new(api: Arc<A>, settings: &PollSettings) -> Self {
        Self {
            api,
            interval: settings.interval,
            concurrency: settings.concurrency.max(1),
        }
    }

    /// Poll every task for at most `budget`.
    ///
    /// The returned report lists terminal summaries in
    /// [`PollReport::finished`] and everything else in
    /// [`PollReport::unfinished`] with the reason it was given up on.
    pub async fn poll(
        &self,
        tasks: Vec<DispatchTask>,
        budget: Duration,
        cancel: &CancellationToken,
    ) -> PollReport {
        let deadline = deadline_after(Instant::now(), budget);
        let total = tasks.len();
        info!(
            tasks = total,
            budget_secs = budget.as_secs(),
            workers = self.concurrency.min(total.max(1)),
            "waiting for executions to finish"
        );

        let mut workers = JoinSet::new();
        let mut assigned: HashMap<Id, Vec<DispatchTask>> = HashMap::new();
        for (index, subset) in partition_round_robin(tasks, self.concurrency)
            .into_iter()
            .enumerate()
        {
            if subset.is_empty() {
                continue;
            }
            debug!(worker = index, tasks = subset.len(), "starting poll worker");
            let handle = workers.spawn(run_worker(
                Arc::clone(&self.api),
                subset.clone(),
                self.interval,
                deadline,
                cancel.clone(),
            ));
            assigned.insert(handle.id(), subset);
        }

        let mut report = PollReport::default();
        while let Some(joined) = workers.join_next_with_id().await {
            match joined {
                Ok((_, partial)) => report.merge(partial),
                Err(e) => {
                    let lost = assigned.remove(&e.id()).unwrap_or_default();
                    error!(error = %e, tasks = lost.len(), "poll worker terminated abnormally");
                    report.unfinished.extend(
                        lost.into_iter()
                            .map(|task| UnfinishedTask::from_task(task, UnfinishedReason::WorkerFailed)),
                    );
                }
            }
        }
        report.sort_unfinished();

        info!(
            finished = report.finished.len(),
            unfinished = report.unfinished.len(),
            "polling done"
        );
        report
    }
}

/// Cap for deadlines that would overflow the clock.
const FAR_FUTURE: Duration = Duration::from_secs(30 * 365 * 24 * 60 * 60);

/// `now + budget`, saturating at [`FAR_FUTURE`] from now.
pub fn deadline_after(now: Instant, budget: Duration) -> Instant {
    now.checked_add(budget).unwrap_or_else(|| now + FAR_FUTURE)
}

/// Deal `items` across `workers` subsets in round-robin order.
pub fn partition_round_robin<T>(items: Vec<T>, workers: usize) -> Vec<Vec<T>> {
    let workers = workers.max(1);
    let mut subsets: Vec<Vec<T>> = (0..workers).map(|_| Vec::new()).collect();
    for (i, item) in items.into_iter().enumerate() {
        subsets[i % workers].push(item);
    }
    subsets
}
