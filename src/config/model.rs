// src/config/model.rs

use serde::Deserialize;

use crate::types::DispatchGranularity;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [api]
/// url = "https://my.rightscale.com"
/// version = "1.5"
/// request_timeout = "30s"
///
/// [dispatch]
/// granularity = "instance"
/// concurrency = 4
///
/// [poll]
/// wait = 300
/// interval = "1s"
/// concurrency = 4
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub api: ApiSection,

    #[serde(default)]
    pub dispatch: DispatchSection,

    #[serde(default)]
    pub poll: PollSection,
}

/// `[api]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiSection {
    /// API endpoint, without the `/api` suffix.
    #[serde(default = "default_url")]
    pub url: String,

    /// Value of the `X-Api-Version` header.
    #[serde(default = "default_version")]
    pub version: String,

    /// Per-request timeout, independent of the poll budget.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: String,
}

/// `[dispatch]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DispatchSection {
    #[serde(default)]
    pub granularity: DispatchGranularity,

    /// Maximum number of run requests in flight at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

/// `[poll]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PollSection {
    /// Seconds to wait for dispatched executions. `0` disables polling.
    #[serde(default = "default_wait")]
    pub wait: u64,

    /// Pause after every status check.
    #[serde(default = "default_interval")]
    pub interval: String,

    /// Number of poll workers; each owns a disjoint subset of tasks.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

pub const DEFAULT_URL: &str = "https://my.rightscale.com";
pub const DEFAULT_WAIT_SECS: u64 = 300;

fn default_url() -> String {
    DEFAULT_URL.to_string()
}

fn default_version() -> String {
    "1.5".to_string()
}

fn default_request_timeout() -> String {
    "30s".to_string()
}

fn default_concurrency() -> usize {
    4
}

fn default_wait() -> u64 {
    DEFAULT_WAIT_SECS
}

fn default_interval() -> String {
    "1s".to_string()
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            url: default_url(),
            version: default_version(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl Default for DispatchSection {
    fn default() -> Self {
        Self {
            granularity: DispatchGranularity::default(),
            concurrency: default_concurrency(),
        }
    }
}

impl Default for PollSection {
    fn default() -> Self {
        Self {
            wait: default_wait(),
            interval: default_interval(),
            concurrency: default_concurrency(),
        }
    }
}
