// src/config/settings.rs

//! The validated configuration value object.
//!
//! `Settings` is built once at startup (file → validation → CLI overrides)
//! and passed by value into the orchestration facade. Nothing reads
//! process-wide state after that.

use std::time::Duration;

use crate::cli::CliArgs;
use crate::config::model::{DEFAULT_URL, DEFAULT_WAIT_SECS};
use crate::config::validate::validate_settings;
use crate::errors::Result;
use crate::types::DispatchGranularity;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api: ApiSettings,
    pub dispatch: DispatchSettings,
    pub poll: PollSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSettings {
    pub url: String,
    pub version: String,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSettings {
    pub granularity: DispatchGranularity,
    pub concurrency: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSettings {
    /// Total wait budget; zero skips polling.
    pub wait: Duration,
    pub interval: Duration,
    pub concurrency: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api: ApiSettings {
                url: DEFAULT_URL.to_string(),
                version: "1.5".to_string(),
                request_timeout: Duration::from_secs(30),
            },
            dispatch: DispatchSettings {
                granularity: DispatchGranularity::Instance,
                concurrency: 4,
            },
            poll: PollSettings {
                wait: Duration::from_secs(DEFAULT_WAIT_SECS),
                interval: Duration::from_secs(1),
                concurrency: 4,
            },
        }
    }
}

impl Settings {
    /// Apply command-line flags on top of file values and re-validate.
    ///
    /// `--concurrency` sets both the dispatch and the poll worker count.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) -> Result<()> {
        if let Some(ref url) = args.url {
            self.api.url = url.clone();
        }
        if let Some(wait) = args.wait {
            self.poll.wait = Duration::from_secs(wait);
        }
        if let Some(granularity) = args.granularity {
            self.dispatch.granularity = granularity;
        }
        if let Some(concurrency) = args.concurrency {
            self.dispatch.concurrency = concurrency;
            self.poll.concurrency = concurrency;
        }
        validate_settings(self)
    }
}
