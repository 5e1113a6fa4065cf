//! Telemetry helpers for structured logging and tracing.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "hvac_parking_lot=info";

/// Install an env-filtered fmt subscriber unless one is already set.
///
/// `RUST_LOG` wins when present; otherwise the crate logs at `info`.
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .try_init();
}
