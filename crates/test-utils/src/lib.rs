//! Shared helpers for goalwatch's integration tests.

pub mod builders;
pub mod fake_session;
pub mod recording_backend;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use goalwatch::logging::LOG_ENV_VAR;
use tracing_subscriber::{fmt, EnvFilter};

/// How long [`with_timeout`] waits before failing a test.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

static INIT: Once = Once::new();

/// Install a per-test tracing subscriber once per test binary.
///
/// Output is captured and only shown for failing tests (or with
/// `--nocapture`). `GOALWATCH_LOG=debug cargo test` raises the level.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info"));

        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

/// Await `f`, panicking if it takes longer than [`TEST_TIMEOUT`].
///
/// Under a paused Tokio clock the timeout is virtual, so it only fires if
/// the runtime has nothing else left to do.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    tokio::time::timeout(TEST_TIMEOUT, f)
        .await
        .unwrap_or_else(|_| panic!("test timed out after {TEST_TIMEOUT:?}"))
}
