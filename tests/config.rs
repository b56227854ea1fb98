// tests/config.rs

use std::error::Error;
use std::fs;
use std::time::Duration;

use clap::Parser;
use tempfile::tempdir;

use fleetrun::cli::{CliArgs, LogLevel};
use fleetrun::config::{
    load_and_validate, load_from_path, load_settings, parse_duration, Settings, MAX_DURATION,
};
use fleetrun::errors::FleetError;
use fleetrun::logging::filter_directives;
use fleetrun::run_request;
use fleetrun::types::DispatchGranularity;

type TestResult = Result<(), Box<dyn Error>>;

fn write_config(contents: &str) -> Result<(tempfile::TempDir, std::path::PathBuf), Box<dyn Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("Fleetrun.toml");
    fs::write(&path, contents)?;
    Ok((dir, path))
}

fn cli(extra: &[&str]) -> CliArgs {
    let mut argv = vec!["fleetrun", "-s", "web-prod", "-S", "deploy-app"];
    argv.extend_from_slice(extra);
    CliArgs::parse_from(argv)
}

#[test]
fn empty_file_yields_defaults() -> TestResult {
    let (_dir, path) = write_config("")?;

    let settings = load_and_validate(&path)?;

    assert_eq!(settings, Settings::default());
    assert_eq!(settings.poll.wait, Duration::from_secs(300));
    assert_eq!(settings.api.version, "1.5");
    Ok(())
}

#[test]
fn full_file_is_parsed() -> TestResult {
    let (_dir, path) = write_config(
        r#"
[api]
url = "https://us-4.rightscale.com"
request_timeout = "10s"

[dispatch]
granularity = "array"
concurrency = 8

[poll]
wait = 60
interval = "500ms"
concurrency = 2
"#,
    )?;

    let settings = load_settings(Some(&path))?;

    assert_eq!(settings.api.url, "https://us-4.rightscale.com");
    assert_eq!(settings.api.request_timeout, Duration::from_secs(10));
    assert_eq!(settings.dispatch.granularity, DispatchGranularity::Array);
    assert_eq!(settings.dispatch.concurrency, 8);
    assert_eq!(settings.poll.wait, Duration::from_secs(60));
    assert_eq!(settings.poll.interval, Duration::from_millis(500));
    assert_eq!(settings.poll.concurrency, 2);
    Ok(())
}

#[test]
fn unknown_keys_are_rejected() -> TestResult {
    let (_dir, path) = write_config("[poll]\ntimeout = 5\n")?;

    let result = load_from_path(&path);

    assert!(matches!(result, Err(FleetError::TomlError(_))));
    Ok(())
}

#[test]
fn zero_concurrency_is_a_config_error() -> TestResult {
    let (_dir, path) = write_config("[dispatch]\nconcurrency = 0\n")?;

    match load_and_validate(&path) {
        Err(FleetError::ConfigError(msg)) => assert!(msg.contains("[dispatch].concurrency")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
    Ok(())
}

#[test]
fn bad_interval_is_a_config_error() -> TestResult {
    let (_dir, path) = write_config("[poll]\ninterval = \"soon\"\n")?;

    match load_and_validate(&path) {
        Err(FleetError::ConfigError(msg)) => assert!(msg.starts_with("[poll].interval")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
    Ok(())
}

#[test]
fn non_http_url_is_a_config_error() -> TestResult {
    let (_dir, path) = write_config("[api]\nurl = \"my.rightscale.com\"\n")?;

    assert!(matches!(
        load_and_validate(&path),
        Err(FleetError::ConfigError(_))
    ));
    Ok(())
}

#[test]
fn missing_explicit_file_is_an_io_error() -> TestResult {
    let dir = tempdir()?;

    let result = load_settings(Some(&dir.path().join("absent.toml")));

    assert!(matches!(result, Err(FleetError::IoError(_))));
    Ok(())
}

#[test]
fn cli_flags_override_file_values() -> TestResult {
    let mut settings = Settings::default();
    let args = cli(&[
        "-u",
        "https://us-3.rightscale.com",
        "-w",
        "0",
        "--granularity",
        "array",
        "--concurrency",
        "16",
    ]);

    settings.apply_cli_overrides(&args)?;

    assert_eq!(settings.api.url, "https://us-3.rightscale.com");
    assert!(settings.poll.wait.is_zero());
    assert_eq!(settings.dispatch.granularity, DispatchGranularity::Array);
    assert_eq!(settings.dispatch.concurrency, 16);
    assert_eq!(settings.poll.concurrency, 16);
    Ok(())
}

#[test]
fn overrides_are_revalidated() {
    let mut settings = Settings::default();
    let args = cli(&["--concurrency", "0"]);

    assert!(matches!(
        settings.apply_cli_overrides(&args),
        Err(FleetError::ConfigError(_))
    ));
}

#[test]
fn run_request_takes_names_from_flags_and_wait_from_settings() -> TestResult {
    let mut settings = Settings::default();
    let args = cli(&["--noop", "--wait", "45"]);
    settings.apply_cli_overrides(&args)?;

    let request = run_request(&args, &settings);

    assert_eq!(request.array, "web-prod");
    assert_eq!(request.executable, "deploy-app");
    assert!(request.noop);
    assert_eq!(request.wait, Duration::from_secs(45));
    Ok(())
}

#[test]
fn array_and_script_flags_are_required() {
    assert!(CliArgs::try_parse_from(["fleetrun", "-s", "web-prod"]).is_err());
    assert!(CliArgs::try_parse_from(["fleetrun", "-S", "deploy-app"]).is_err());
}

#[test]
fn durations_parse_with_units() {
    assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
    assert_eq!(parse_duration(" 3s "), Ok(Duration::from_secs(3)));
    assert_eq!(parse_duration("2m"), Ok(Duration::from_secs(120)));
    assert_eq!(parse_duration("1h"), Ok(Duration::from_secs(3600)));
    assert!(parse_duration("10").is_err());
    assert!(parse_duration("5d").is_err());
    assert!(parse_duration("").is_err());
}

#[test]
fn granularity_parses_case_insensitively() {
    assert_eq!(DispatchGranularity::default(), DispatchGranularity::Instance);
    assert_eq!("Instance".parse::<DispatchGranularity>(), Ok(DispatchGranularity::Instance));
    assert_eq!("ARRAY".parse::<DispatchGranularity>(), Ok(DispatchGranularity::Array));
    assert!("cluster".parse::<DispatchGranularity>().is_err());
}

#[test]
fn log_flag_beats_env_and_only_raises_this_crate() {
    assert_eq!(
        filter_directives(Some(LogLevel::Debug), Some("trace")),
        "warn,fleetrun=debug"
    );
    assert_eq!(
        filter_directives(None, Some(" fleetrun=info,reqwest=debug ")),
        "fleetrun=info,reqwest=debug"
    );
    assert_eq!(filter_directives(None, Some("")), "warn");
    assert_eq!(filter_directives(None, None), "warn");
}

#[test]
fn oversized_durations_are_errors_not_panics() {
    assert!(parse_duration("18446744073709551615h").is_err());
    assert!(parse_duration("18446744073709551615m").is_err());
    assert_eq!(
        parse_duration("18446744073709551615ms"),
        Ok(Duration::from_millis(u64::MAX))
    );
}

#[test]
fn huge_interval_in_file_is_a_config_error() -> TestResult {
    let (_dir, path) = write_config("[poll]\ninterval = \"18446744073709551615s\"\n")?;

    match load_and_validate(&path) {
        Err(FleetError::ConfigError(msg)) => assert!(msg.starts_with("[poll].interval")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
    Ok(())
}

#[test]
fn unbounded_wait_flag_is_a_config_error() {
    let mut settings = Settings::default();
    let wait = u64::MAX.to_string();
    let args = cli(&["--wait", wait.as_str()]);

    match settings.apply_cli_overrides(&args) {
        Err(FleetError::ConfigError(msg)) => assert!(msg.starts_with("[poll].wait")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn wait_at_the_bound_is_accepted() -> TestResult {
    let mut settings = Settings::default();
    let wait = MAX_DURATION.as_secs().to_string();
    let args = cli(&["--wait", wait.as_str()]);

    settings.apply_cli_overrides(&args)?;

    assert_eq!(settings.poll.wait, MAX_DURATION);
    Ok(())
}
