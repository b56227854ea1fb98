use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use fleetrun::api::{ApiFuture, RemoteApi, ResourceSummary, RunParam};
use fleetrun::errors::ApiError;

/// One call made against the fake, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    SearchArrays(String),
    SearchScripts(String),
    ListInstances(String),
    Run {
        url: String,
        key: &'static str,
        value: String,
    },
    Status(String),
}

#[derive(Debug, Clone)]
enum StatusStep {
    Summary(String),
    NoSummary,
    Error,
    Panic,
}

/// An in-memory `RemoteApi`.
///
/// - searches are fuzzy: every resource whose name contains the query;
/// - run requests answer with [`FakeApi::task_location`] of the target, or
///   HTTP 500 for targets registered with [`FakeApi::with_failing_run`];
/// - status checks replay a scripted sequence per location (the last step
///   sticks), or `default_summary` when nothing was scripted;
/// - every call is recorded.
pub struct FakeApi {
    arrays: Vec<ResourceSummary>,
    scripts: Vec<ResourceSummary>,
    instances: HashMap<String, Vec<ResourceSummary>>,
    failing_runs: HashSet<String>,
    failing_listings: HashSet<String>,
    statuses: Mutex<HashMap<String, VecDeque<StatusStep>>>,
    default_summary: String,
    status_delay: Option<Duration>,
    calls: Mutex<Vec<ApiCall>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            arrays: Vec::new(),
            scripts: Vec::new(),
            instances: HashMap::new(),
            failing_runs: HashSet::new(),
            failing_listings: HashSet::new(),
            statuses: Mutex::new(HashMap::new()),
            default_summary: "completed: done".to_string(),
            status_delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Task location the fake hands out for a target href.
    pub fn task_location(target_href: &str) -> String {
        format!("{target_href}/live/tasks/1")
    }

    pub fn with_array(mut self, array: ResourceSummary, instances: Vec<ResourceSummary>) -> Self {
        self.instances.insert(array.href.clone(), instances);
        self.arrays.push(array);
        self
    }

    pub fn with_script(mut self, script: ResourceSummary) -> Self {
        self.scripts.push(script);
        self
    }

    /// Run requests to this instance or array href answer HTTP 500.
    pub fn with_failing_run(mut self, target_href: &str) -> Self {
        self.failing_runs.insert(target_href.to_string());
        self
    }

    /// Listing the instances of this array answers HTTP 500.
    pub fn with_failing_listing(mut self, array_href: &str) -> Self {
        self.failing_listings.insert(array_href.to_string());
        self
    }

    /// Script the summaries returned for `location`, in order.
    pub fn with_statuses(self, location: &str, summaries: &[&str]) -> Self {
        self.push_steps(
            location,
            summaries.iter().map(|s| StatusStep::Summary(s.to_string())),
        );
        self
    }

    /// Next status check of `location` fails with HTTP 503.
    pub fn with_status_error(self, location: &str) -> Self {
        self.push_steps(location, [StatusStep::Error]);
        self
    }

    /// Next status check of `location` returns a body without `summary`.
    pub fn with_missing_summary(self, location: &str) -> Self {
        self.push_steps(location, [StatusStep::NoSummary]);
        self
    }

    /// Next status check of `location` panics inside the calling task.
    pub fn with_status_panic(self, location: &str) -> Self {
        self.push_steps(location, [StatusStep::Panic]);
        self
    }

    /// Summary for locations without a scripted sequence.
    pub fn with_default_summary(mut self, summary: &str) -> Self {
        self.default_summary = summary.to_string();
        self
    }

    /// Every status check takes this long.
    pub fn with_status_delay(mut self, delay: Duration) -> Self {
        self.status_delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn run_calls(&self) -> Vec<ApiCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, ApiCall::Run { .. }))
            .collect()
    }

    pub fn script_searches(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ApiCall::SearchScripts(_)))
            .count()
    }

    pub fn status_checks(&self, location: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ApiCall::Status(l) if l == location))
            .count()
    }

    fn push_steps(&self, location: &str, steps: impl IntoIterator<Item = StatusStep>) {
        let mut statuses = self.statuses.lock().unwrap();
        statuses
            .entry(location.to_string())
            .or_default()
            .extend(steps);
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn next_step(&self, location: &str) -> StatusStep {
        let mut statuses = self.statuses.lock().unwrap();
        match statuses.get_mut(location) {
            Some(steps) if steps.len() > 1 => steps.pop_front().unwrap(),
            Some(steps) if !steps.is_empty() => steps[0].clone(),
            _ => StatusStep::Summary(self.default_summary.clone()),
        }
    }

    fn fuzzy(resources: &[ResourceSummary], query: &str) -> Vec<ResourceSummary> {
        resources
            .iter()
            .filter(|r| r.name.contains(query))
            .cloned()
            .collect()
    }
}

impl Default for FakeApi {
    fn default() -> Self {
        Self::new()
    }
}

fn server_error(url: &str, status: u16) -> ApiError {
    ApiError::Status {
        status,
        url: url.to_string(),
        body: "injected failure".to_string(),
    }
}

impl RemoteApi for FakeApi {
    fn search_arrays<'a>(&'a self, name: &'a str) -> ApiFuture<'a, Vec<ResourceSummary>> {
        Box::pin(async move {
            self.record(ApiCall::SearchArrays(name.to_string()));
            Ok(Self::fuzzy(&self.arrays, name))
        })
    }

    fn search_scripts<'a>(&'a self, name: &'a str) -> ApiFuture<'a, Vec<ResourceSummary>> {
        Box::pin(async move {
            self.record(ApiCall::SearchScripts(name.to_string()));
            Ok(Self::fuzzy(&self.scripts, name))
        })
    }

    fn list_instances<'a>(
        &'a self,
        array_href: &'a str,
    ) -> ApiFuture<'a, Vec<ResourceSummary>> {
        Box::pin(async move {
            self.record(ApiCall::ListInstances(array_href.to_string()));
            if self.failing_listings.contains(array_href) {
                return Err(server_error(array_href, 500));
            }
            Ok(self.instances.get(array_href).cloned().unwrap_or_default())
        })
    }

    fn run_executable<'a>(&'a self, url: &'a str, param: &'a RunParam) -> ApiFuture<'a, String> {
        Box::pin(async move {
            self.record(ApiCall::Run {
                url: url.to_string(),
                key: param.key,
                value: param.value.clone(),
            });
            let target = url
                .trim_end_matches("/multi_run_executable")
                .trim_end_matches("/run_executable");
            if self.failing_runs.contains(target) {
                return Err(server_error(url, 500));
            }
            Ok(Self::task_location(target))
        })
    }

    fn task_summary<'a>(&'a self, location: &'a str) -> ApiFuture<'a, Option<String>> {
        Box::pin(async move {
            self.record(ApiCall::Status(location.to_string()));
            if let Some(delay) = self.status_delay {
                tokio::time::sleep(delay).await;
            }
            match self.next_step(location) {
                StatusStep::Summary(summary) => Ok(Some(summary)),
                StatusStep::NoSummary => Ok(None),
                StatusStep::Error => Err(server_error(location, 503)),
                StatusStep::Panic => panic!("injected panic while checking {location}"),
            }
        })
    }
}
