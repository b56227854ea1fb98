// src/dispatch/dispatcher.rs

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::api::RemoteApi;
use crate::config::DispatchSettings;
use crate::errors::{ApiError, Result};
use crate::locate::{ArrayHandle, ExecutableRef, InstanceHandle};
use crate::types::DispatchGranularity;

use super::task::{DispatchFailure, DispatchOutcome, DispatchTarget, DispatchTask};

/// Issues run-executable requests for every target of the resolved arrays.
///
/// At most `concurrency` remote calls are in flight at once; results are
/// collected in target order by the single caller-owned collector.
pub struct Dispatcher<A: RemoteApi> {
    api: Arc<A>,
    settings: DispatchSettings,
}

impl<A: RemoteApi> Dispatcher<A> {
    pub fn new(api: Arc<A>, settings: DispatchSettings) -> Self {
        Self { api, settings }
    }

    pub fn granularity(&self) -> DispatchGranularity {
        self.settings.granularity
    }

    /// Dispatch `executable` to `arrays`.
    ///
    /// Only an invalid executable reference fails the call. A failed
    /// instance listing or run request is logged, recorded in
    /// [`DispatchOutcome::failures`] and skipped.
    pub async fn dispatch(
        &self,
        arrays: &[ArrayHandle],
        executable: &ExecutableRef,
    ) -> Result<DispatchOutcome> {
        let param = executable.run_param()?;
        let mut outcome = DispatchOutcome::default();

        let targets = match self.settings.granularity {
            DispatchGranularity::Array => {
                arrays.iter().cloned().map(DispatchTarget::Array).collect()
            }
            DispatchGranularity::Instance => {
                self.instance_targets(arrays, &mut outcome.failures).await
            }
        };

        info!(
            executable = executable.display_name(),
            granularity = %self.settings.granularity,
            targets = targets.len(),
            "dispatching executable"
        );

        let api = self.api.as_ref();
        let param = &param;
        let results: Vec<_> = stream::iter(targets)
            .map(|target| async move {
                let url = target.run_url();
                debug!(node = %target, url = %url, "executing");
                let result = api.run_executable(&url, param).await;
                (target, result)
            })
            .buffered(self.concurrency())
            .collect()
            .await;

        for (target, result) in results {
            match result {
                Ok(location) => {
                    debug!(node = %target, location = %location, "dispatched");
                    outcome.tasks.push(DispatchTask::new(target, location));
                }
                Err(error) => {
                    warn!(node = %target, error = %error, "dispatch failed; skipping target");
                    outcome.failures.push(DispatchFailure { target, error });
                }
            }
        }

        info!(
            dispatched = outcome.tasks.len(),
            failed = outcome.failures.len(),
            "dispatch finished"
        );
        Ok(outcome)
    }

    /// Current member instances of one array, fetched fresh every call.
    pub async fn list_instances(
        &self,
        array: &ArrayHandle,
    ) -> std::result::Result<Vec<InstanceHandle>, ApiError> {
        let instances = self.api.list_instances(&array.href).await?;
        Ok(instances.into_iter().map(InstanceHandle::from).collect())
    }

    async fn instance_targets(
        &self,
        arrays: &[ArrayHandle],
        failures: &mut Vec<DispatchFailure>,
    ) -> Vec<DispatchTarget> {
        let listings: Vec<_> = stream::iter(arrays)
            .map(|array| async move { (array, self.list_instances(array).await) })
            .buffered(self.concurrency())
            .collect()
            .await;

        let mut targets = Vec::new();
        for (array, listing) in listings {
            match listing {
                Ok(instances) => {
                    if instances.is_empty() {
                        warn!(array = %array.name, "array has no current instances");
                    }
                    targets.extend(instances.into_iter().map(|instance| DispatchTarget::Instance {
                        array: array.name.clone(),
                        instance,
                    }));
                }
                Err(error) => {
                    warn!(
                        array = %array.name,
                        error = %error,
                        "listing instances failed; skipping array"
                    );
                    failures.push(DispatchFailure {
                        target: DispatchTarget::Array(array.clone()),
                        error,
                    });
                }
            }
        }
        targets
    }

    fn concurrency(&self) -> usize {
        self.settings.concurrency.max(1)
    }
}
