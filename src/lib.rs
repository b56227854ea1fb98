// src/lib.rs

pub mod api;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod errors;
pub mod locate;
pub mod logging;
pub mod poll;
pub mod types;

use std::sync::Arc;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::api::RightScaleClient;
use crate::cli::CliArgs;
use crate::config::{Settings, load_settings};
use crate::engine::{Orchestrator, RunRequest, render_outcome};
use crate::errors::FleetError;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading + CLI overrides
/// - API authentication
/// - the orchestration facade
/// - Ctrl-C handling (stops polling, reports outstanding tasks as canceled)
///
/// Resolution, configuration and authentication failures are returned as
/// errors; per-instance dispatch failures and poll timeouts are not.
pub async fn run(args: CliArgs) -> Result<()> {
    let mut settings = load_settings(args.config.as_deref())?;
    settings.apply_cli_overrides(&args)?;
    debug!(?settings, "effective settings");

    let token = refresh_token(&args)?;
    let client = RightScaleClient::connect(&settings.api, token)
        .await
        .map_err(FleetError::from)?;

    // Ctrl-C → stop polling.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            info!("interrupt received; stopping");
            cancel.cancel();
        });
    }

    let request = run_request(&args, &settings);
    let orchestrator = Orchestrator::new(Arc::new(client), &settings);
    let outcome = orchestrator.run(&request, &cancel).await?;

    for line in render_outcome(&outcome) {
        println!("{line}");
    }
    Ok(())
}

/// Build the facade request from CLI arguments and effective settings.
pub fn run_request(args: &CliArgs, settings: &Settings) -> RunRequest {
    RunRequest {
        array: args.array.clone(),
        executable: args.script.clone(),
        noop: args.noop,
        wait: settings.poll.wait,
    }
}

fn refresh_token(args: &CliArgs) -> std::result::Result<&str, FleetError> {
    args.refresh_token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            FleetError::ConfigError(
                "a refresh token is required (--refresh-token or FLEETRUN_REFRESH_TOKEN)"
                    .to_string(),
            )
        })
}
