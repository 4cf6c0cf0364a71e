//! Process-wide `tracing` setup

use tracing_subscriber::{fmt, EnvFilter};

/// Default filter when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "info";

/// Install a formatted `tracing` subscriber honouring `RUST_LOG`.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init() {
    init_with_filter(DEFAULT_FILTER);
}

/// Install a formatted subscriber, falling back to `default_filter` when
/// `RUST_LOG` is unset or unparsable.
pub fn init_with_filter(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = fmt().with_env_filter(filter).with_target(true).try_init();
}
