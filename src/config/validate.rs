// src/config/validate.rs

use std::time::Duration;

use crate::config::duration::parse_duration;
use crate::config::model::RawConfigFile;
use crate::config::settings::{ApiSettings, DispatchSettings, PollSettings, Settings};
use crate::errors::{FleetError, Result};

impl TryFrom<RawConfigFile> for Settings {
    type Error = FleetError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let request_timeout = parse_duration(&raw.api.request_timeout)
            .map_err(|e| FleetError::ConfigError(format!("[api].request_timeout: {e}")))?;
        let interval = parse_duration(&raw.poll.interval)
            .map_err(|e| FleetError::ConfigError(format!("[poll].interval: {e}")))?;

        let settings = Settings {
            api: ApiSettings {
                url: raw.api.url,
                version: raw.api.version,
                request_timeout,
            },
            dispatch: DispatchSettings {
                granularity: raw.dispatch.granularity,
                concurrency: raw.dispatch.concurrency,
            },
            poll: PollSettings {
                wait: Duration::from_secs(raw.poll.wait),
                interval,
                concurrency: raw.poll.concurrency,
            },
        };

        validate_settings(&settings)?;
        Ok(settings)
    }
}

/// Upper bound for every configured duration (one year).
pub const MAX_DURATION: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Check the invariants the engine relies on.
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_api(settings)?;
    validate_workers(settings)?;

    if settings.poll.interval.is_zero() {
        return Err(FleetError::ConfigError(
            "[poll].interval must be greater than zero".to_string(),
        ));
    }
    ensure_bounded("[api].request_timeout", settings.api.request_timeout)?;
    ensure_bounded("[poll].interval", settings.poll.interval)?;
    ensure_bounded("[poll].wait", settings.poll.wait)?;

    Ok(())
}

fn ensure_bounded(key: &str, value: Duration) -> Result<()> {
    if value > MAX_DURATION {
        return Err(FleetError::ConfigError(format!(
            "{key} must be at most {} seconds (got {})",
            MAX_DURATION.as_secs(),
            value.as_secs()
        )));
    }
    Ok(())
}

fn validate_api(settings: &Settings) -> Result<()> {
    let url = settings.api.url.trim();
    if url.is_empty() {
        return Err(FleetError::ConfigError("[api].url must not be empty".to_string()));
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(FleetError::ConfigError(format!(
            "[api].url must be an http(s) URL (got '{url}')"
        )));
    }
    if settings.api.request_timeout.is_zero() {
        return Err(FleetError::ConfigError(
            "[api].request_timeout must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

fn validate_workers(settings: &Settings) -> Result<()> {
    if settings.dispatch.concurrency == 0 {
        return Err(FleetError::ConfigError(
            "[dispatch].concurrency must be >= 1 (got 0)".to_string(),
        ));
    }
    if settings.poll.concurrency == 0 {
        return Err(FleetError::ConfigError(
            "[poll].concurrency must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}
