//! Logging initialization

use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber for binaries.
///
/// `RUST_LOG` takes precedence; without it the configured directive
/// applies (e.g. `"info,live_score=debug"`).
pub fn init_tracing(directive: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .init();
}
