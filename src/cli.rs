// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::types::DispatchGranularity;

/// Command-line arguments for `fleetrun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "fleetrun",
    version,
    about = "Run a RightScript or recipe on every instance of a server array and wait for it.",
    long_about = None
)]
pub struct CliArgs {
    /// RightScale API endpoint.
    ///
    /// Overrides `[api].url`; default `https://my.rightscale.com`.
    #[arg(short = 'u', long, value_name = "URL")]
    pub url: Option<String>,

    /// RightScale API refresh token.
    #[arg(
        short = 'r',
        long,
        value_name = "TOKEN",
        env = "FLEETRUN_REFRESH_TOKEN",
        hide_env_values = true
    )]
    pub refresh_token: Option<String>,

    /// Server array name (fuzzy match; every matching array is targeted).
    #[arg(short = 's', long, value_name = "NAME")]
    pub array: String,

    /// RightScript name, or a `cookbook::recipe` reference.
    #[arg(short = 'S', long, value_name = "NAME")]
    pub script: String,

    /// Report what would run without dispatching anything.
    #[arg(short = 'n', long)]
    pub noop: bool,

    /// Seconds to wait for executions to finish (0 = don't wait).
    ///
    /// Overrides `[poll].wait`; default 300.
    #[arg(short = 'w', long, value_name = "SECONDS")]
    pub wait: Option<u64>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `FLEETRUN_LOG` or `warn` is used.
    #[arg(short = 'l', long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Path to a config file (TOML). Default: `Fleetrun.toml` if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Dispatch per instance or once per array.
    #[arg(long, value_name = "instance|array")]
    pub granularity: Option<DispatchGranularity>,

    /// Number of concurrent dispatch and poll workers.
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Directive spelling understood by `tracing_subscriber::EnvFilter`.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
