//! Tracing subscriber setup for binaries and demos embedding Waypoint.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,waypoint_core=debug,waypoint_runtime=debug";

/// Initialize a simple stdout tracing subscriber for development.
///
/// `RUST_LOG` overrides the default filter. Calling this twice is harmless:
/// the second installation attempt is ignored.
pub fn init_stdout_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
