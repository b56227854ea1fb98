// src/engine/orchestrator.rs

use std::collections::HashMap;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::RemoteApi;
use crate::config::Settings;
use crate::dispatch::{DispatchTask, Dispatcher};
use crate::errors::Result;
use crate::locate::{ArrayHandle, ExecutableRef, ResourceLocator};
use crate::poll::{PollReport, Poller};
use crate::types::DispatchGranularity;

use super::{NoOpRecord, Phase, RunOutcome, RunRequest};

/// Composes locator, dispatcher and poller into one call.
///
/// All three share the same API client; the orchestrator keeps no state
/// between calls.
pub struct Orchestrator<A: RemoteApi + 'static> {
    locator: ResourceLocator<A>,
    dispatcher: Dispatcher<A>,
    poller: Poller<A>,
}

impl<A: RemoteApi + 'static> Orchestrator<A> {
    pub fn new(api: Arc<A>, settings: &Settings) -> Self {
        Self {
            locator: ResourceLocator::new(Arc::clone(&api)),
            dispatcher: Dispatcher::new(Arc::clone(&api), settings.dispatch.clone()),
            poller: Poller::new(api, &settings.poll),
        }
    }

    pub fn locator(&self) -> &ResourceLocator<A> {
        &self.locator
    }

    /// Run `request` to completion.
    ///
    /// `cancel` stops polling early; tasks still outstanding are reported
    /// as canceled. Dispatch is never interrupted.
    pub async fn run(&self, request: &RunRequest, cancel: &CancellationToken) -> Result<RunOutcome> {
        let mut phase = Phase::Resolving;
        debug!(%phase, array = %request.array, executable = %request.executable, "starting run");

        let arrays = self
            .locator
            .find_arrays_by_name(&request.array, false)
            .await?;
        let executable = self.locator.resolve_executable(&request.executable).await?;
        info!(
            arrays = arrays.len(),
            executable = %executable,
            "resolved run targets"
        );

        phase = phase.after(request.noop);
        if phase == Phase::NoOpReport {
            debug!(%phase, "noop requested; nothing will be dispatched");
            let records = self.noop_records(&arrays, &executable).await;
            for record in &records {
                info!("{record}");
            }
            debug!(phase = %phase.after(request.noop), "run finished");
            return Ok(RunOutcome::NoOp(records));
        }

        debug!(%phase, "dispatching");
        let mut dispatch = self.dispatcher.dispatch(&arrays, &executable).await?;

        phase = phase.after(request.noop);
        let poll = if request.wait.is_zero() {
            debug!(%phase, "wait budget is zero; skipping poll");
            None
        } else {
            debug!(%phase, budget_secs = request.wait.as_secs(), "polling");
            let report = self
                .poller
                .poll(dispatch.tasks.clone(), request.wait, cancel)
                .await;
            apply_poll_report(&mut dispatch.tasks, &report);
            Some(report)
        };

        phase = phase.after(request.noop);
        debug!(%phase, "run finished");

        Ok(RunOutcome::Dispatched {
            executable,
            dispatch,
            poll,
        })
    }

    /// One record per array, or per current instance at instance
    /// granularity. Listing instances is read-only; if it fails the array
    /// itself is reported.
    async fn noop_records(
        &self,
        arrays: &[ArrayHandle],
        executable: &ExecutableRef,
    ) -> Vec<NoOpRecord> {
        let name = executable.display_name().to_string();
        let mut records = Vec::new();

        for array in arrays {
            let array_record = NoOpRecord {
                executable: name.clone(),
                array: array.name.clone(),
                instance: None,
            };

            if self.dispatcher.granularity() == DispatchGranularity::Array {
                records.push(array_record);
                continue;
            }

            match self.dispatcher.list_instances(array).await {
                Ok(instances) if !instances.is_empty() => {
                    records.extend(instances.into_iter().map(|instance| NoOpRecord {
                        executable: name.clone(),
                        array: array.name.clone(),
                        instance: Some(instance.name),
                    }));
                }
                Ok(_) => records.push(array_record),
                Err(error) => {
                    warn!(array = %array.name, error = %error, "could not list instances for noop report");
                    records.push(array_record);
                }
            }
        }

        records
    }
}

/// Bring dispatched tasks up to date with what the poller last observed.
fn apply_poll_report(tasks: &mut [DispatchTask], report: &PollReport) {
    let unfinished: HashMap<&str, &str> = report
        .unfinished
        .iter()
        .filter_map(|u| Some((u.location.as_str(), u.last_summary.as_deref()?)))
        .collect();

    for task in tasks {
        let observed = report
            .finished
            .get(task.location())
            .map(String::as_str)
            .or_else(|| unfinished.get(task.location()).copied());
        if let Some(summary) = observed {
            task.observe(summary);
        }
    }
}
