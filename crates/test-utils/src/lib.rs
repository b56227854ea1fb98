//! Shared fixtures for fleetrun integration tests.
//!
//! - [`fake_api`]: an in-memory `RemoteApi` with scripted answers.
//! - [`builders`]: resource summaries and `Settings` in one line each.

pub mod builders;
pub mod fake_api;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use fleetrun::cli::LogLevel;
use fleetrun::logging::{LOG_ENV, filter_directives};
use tracing_subscriber::{EnvFilter, fmt};

pub use fake_api::{ApiCall, FakeApi};

/// Upper bound for tests that run on the real clock.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

static INIT: Once = Once::new();

/// Install a capturing subscriber once per test binary.
///
/// Filters the same way as the binary: `FLEETRUN_LOG` directives when set,
/// otherwise `info` for fleetrun. Output only shows for failing tests
/// unless run with `--nocapture`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let env_value = std::env::var(LOG_ENV).ok();
        let cli_level = env_value.is_none().then_some(LogLevel::Info);
        let directives = filter_directives(cli_level, env_value.as_deref());
        let filter = EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new("info"));

        let _ = fmt().with_env_filter(filter).with_test_writer().try_init();
    });
}

/// Fail the test if `fut` does not finish within [`TEST_TIMEOUT`].
pub async fn with_timeout<F: Future>(fut: F) -> F::Output {
    match tokio::time::timeout(TEST_TIMEOUT, fut).await {
        Ok(output) => output,
        Err(_) => panic!("test did not finish within {TEST_TIMEOUT:?}"),
    }
}
