// src/logging.rs

//! Subscriber setup for `fleetrun`.
//!
//! Filter directives come from, in order:
//! 1. `--log-level`, applied to this crate only; dependencies stay at `warn`;
//! 2. `FLEETRUN_LOG`, taken verbatim as `EnvFilter` directives
//!    (e.g. `fleetrun=debug,reqwest=info`);
//! 3. `warn`.
//!
//! Events go to stderr; stdout is reserved for the run report.

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

/// Environment variable read when `--log-level` is absent.
pub const LOG_ENV: &str = "FLEETRUN_LOG";

const DEFAULT_DIRECTIVES: &str = "warn";

/// Install the global subscriber. Call once, before the first event.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env_value = std::env::var(LOG_ENV).ok();
    let directives = filter_directives(cli_level, env_value.as_deref());
    let filter = EnvFilter::try_new(&directives)
        .with_context(|| format!("invalid {LOG_ENV} filter '{directives}'"))?;

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}

/// Resolve the filter directives for one invocation.
pub fn filter_directives(cli_level: Option<LogLevel>, env_value: Option<&str>) -> String {
    if let Some(level) = cli_level {
        return format!("{DEFAULT_DIRECTIVES},{}={}", env!("CARGO_CRATE_NAME"), level.as_str());
    }
    match env_value.map(str::trim) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => DEFAULT_DIRECTIVES.to_string(),
    }
}
