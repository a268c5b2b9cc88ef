//! Error types for the monitor driver.

use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown time zone '{0}'")]
    InvalidTimezone(String),
}

/// Errors that abort a monitor run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("source error: {0}")]
    Source(#[from] outage_source::SourceError),

    #[error("state error: {0}")]
    State(#[from] outage_core::StateError),
}
