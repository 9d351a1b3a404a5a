//! Shared helpers for `wavedag` integration tests.

pub mod builders;
pub mod fake_work;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

/// Upper bound for any single awaited scheduler call in tests.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Install a subscriber that writes through the test harness, once per test
/// binary. Output only shows for failing tests (or with `--nocapture`).
///
/// `RUST_LOG` overrides the default `wavedag=debug`.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("wavedag=debug"));
        let _ = fmt().with_env_filter(filter).with_test_writer().try_init();
    });
}

/// Await `fut`, panicking once [`TEST_TIMEOUT`] has passed.
pub async fn with_timeout<F: Future>(fut: F) -> F::Output {
    match tokio::time::timeout(TEST_TIMEOUT, fut).await {
        Ok(out) => out,
        Err(_) => panic!("test future did not finish within {TEST_TIMEOUT:?}"),
    }
}
