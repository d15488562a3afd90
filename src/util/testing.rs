//! Logging setup shared by unit and integration tests.

use std::sync::Once;

use tracing::info;
use tracing_subscriber::{fmt, fmt::format::FmtSpan, prelude::*, EnvFilter};

static TEST_SETUP: Once = Once::new();

/// Install a global subscriber once per test binary.
///
/// `RUST_LOG` is honored when set; otherwise everything from this crate is
/// logged at trace level. Output goes through the test writer, so it only
/// shows for failing tests or with `--nocapture`.
pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rstree=trace"));

        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .with_test_writer()
                .with_target(true)
                .with_span_events(FmtSpan::CLOSE)
                .with_filter(env_filter),
        );

        // Another harness may already own the global dispatcher
        if subscriber.try_init().is_ok() {
            info!("Test setup complete");
        }
    });
}
