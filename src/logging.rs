//! Tracing subscriber setup.
//!
//! The SDK only emits `tracing` events. Hosts that already install a
//! subscriber can skip this module entirely.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub const LOG_ENV_VAR: &str = "OPENWEB_LOG";
pub const DEFAULT_FILTER: &str = "info";

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Invalid log filter '{filter}': {message}")]
    InvalidFilter { filter: String, message: String },

    #[error("Failed to initialize logging: {0}")]
    InitializationError(String),
}

/// Filter directive from `OPENWEB_LOG`, or `info`.
pub fn filter_from_env() -> String {
    std::env::var(LOG_ENV_VAR).unwrap_or_else(|_| DEFAULT_FILTER.to_string())
}

/// Build an `EnvFilter`, reporting bad directives instead of ignoring them.
pub fn parse_filter(directives: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_new(directives).map_err(|e| LoggingError::InvalidFilter {
        filter: directives.to_string(),
        message: e.to_string(),
    })
}

/// Install a console subscriber filtered by `OPENWEB_LOG`.
pub fn init_logging() -> Result<(), LoggingError> {
    let env_filter = parse_filter(&filter_from_env())?;

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(console_layer)
        .try_init()
        .map_err(|e| LoggingError::InitializationError(e.to_string()))
}
