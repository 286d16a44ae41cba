//! # Structured Logging
//!
//! Installs the global `tracing` subscriber. JSON output is the default for
//! deployed instances; the pretty format is meant for a terminal. A `RUST_LOG`
//! value in the environment overrides the configured filter.

use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::core::config::{LogFormat, LoggingConfig};
use crate::core::error::{ContentError, ContentResult};

/// Build the filter: `RUST_LOG` first, then the configured directive
pub fn env_filter(config: &LoggingConfig) -> ContentResult<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.level).map_err(|e| ContentError::Configuration {
        message: format!("invalid logging.level '{}': {}", config.level, e),
    })
}

/// Install the global subscriber
///
/// Calling this twice is harmless; the second subscriber is dropped.
pub fn init_logging(config: &LoggingConfig) -> ContentResult<()> {
    let filter = env_filter(config)?;

    let installed = match config.format {
        LogFormat::Json => Registry::default()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .try_init(),
        LogFormat::Pretty => Registry::default()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .try_init(),
    };

    if installed.is_ok() {
        info!(format = ?config.format, "📊 Logging initialized");
    }
    Ok(())
}
