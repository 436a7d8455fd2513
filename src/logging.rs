//! Tracing subscriber setup.
//!
//! Logs go to stderr so they never interleave with query results on stdout.
//! `RUST_LOG` takes precedence over the configured level.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{AppResult, config_error};

/// Build the filter from `RUST_LOG`, falling back to `level`.
pub fn build_filter(level: &str) -> AppResult<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| config_error(format!("Invalid log level '{}': {}", level, e)))
    }
}

/// Install the global subscriber.
///
/// Calling this twice is an error; the first subscriber stays active.
pub fn init_logging(level: &str, colored: bool) -> AppResult<()> {
    let filter = build_filter(level)?;
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(colored)
        )
        .try_init()
        .map_err(|e| config_error(format!("Logging already initialized: {}", e)))
}
