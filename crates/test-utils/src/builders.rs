#![allow(dead_code)]

use std::time::Duration;

use fleetrun::api::ResourceSummary;
use fleetrun::config::Settings;
use fleetrun::types::DispatchGranularity;

/// Array resource as the search endpoint would return it.
pub fn array(name: &str, id: u32) -> ResourceSummary {
    ResourceSummary::new(name, format!("/api/server_arrays/{id}"))
}

/// Instance resource as the `current_instances` endpoint would return it.
pub fn instance(name: &str, id: &str) -> ResourceSummary {
    ResourceSummary::new(name, format!("/api/clouds/1/instances/{id}"))
}

/// RightScript resource with a revision.
pub fn script(name: &str, revision: u64, id: u32) -> ResourceSummary {
    ResourceSummary::new(name, format!("/api/right_scripts/{id}")).with_revision(revision)
}

/// Builder for `Settings` to simplify test setup.
pub struct SettingsBuilder {
    settings: Settings,
}

impl SettingsBuilder {
    pub fn new() -> Self {
        Self {
            settings: Settings::default(),
        }
    }

    pub fn granularity(mut self, granularity: DispatchGranularity) -> Self {
        self.settings.dispatch.granularity = granularity;
        self
    }

    pub fn dispatch_concurrency(mut self, n: usize) -> Self {
        self.settings.dispatch.concurrency = n;
        self
    }

    pub fn poll_concurrency(mut self, n: usize) -> Self {
        self.settings.poll.concurrency = n;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.settings.poll.interval = interval;
        self
    }

    pub fn build(self) -> Settings {
        self.settings
    }
}

impl Default for SettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
