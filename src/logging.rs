//! Logging setup for the HTTP service.
//!
//! The service logs through `tracing` to stdout. Command-line feedback uses
//! the crate's colored macros instead.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "spotify_showcase=info,warn";

/// Initialize the logging system.
///
/// The level can be controlled via the `RUST_LOG` environment variable and
/// defaults to `info` for this crate and `warn` for everything else. Calling
/// it twice is harmless; the second call is ignored.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = fmt::layer().with_target(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
