//! Tracing Setup
//!
//! Installs a `tracing` subscriber from [`LoggingConfig`]. `RUST_LOG`
//! overrides the configured level.
//!
//! # Usage
//!
//! ```rust,ignore
//! use futures_engine::{config::load_config, telemetry::init_tracing};
//!
//! let config = load_config(None)?;
//! init_tracing(&config.observability.logging);
//! ```

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Initialize the global subscriber.
///
/// Returns `false` if a subscriber was already installed, which is
/// expected when several tests initialize logging.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let result = if config.format == "pretty" {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .pretty()
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .json()
            .with_current_span(true)
            .try_init()
    };

    result.is_ok()
}
