//! Tracing subscriber setup.
//!
//! Terraform runs for minutes; `RUST_LOG=k3s_infra_harness=debug` shows every
//! command line and retry as it happens.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a stderr subscriber for the CLI.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_writer(std::io::stderr)
        .init();
}

/// Install a subscriber that writes through the test harness's capture.
///
/// Safe to call from every test; only the first call installs it.
pub fn init_for_tests() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_test_writer()
        .try_init();
}
