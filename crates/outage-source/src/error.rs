//! Error types for outage-source.

use thiserror::Error;

/// Errors that can occur while fetching outage reports.
#[derive(Debug, Error)]
pub enum SourceError {
    /// HTTP request failed after all retries.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not valid JSON.
    #[error("failed to parse JSON from {url}: {source}")]
    Json {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// Response was JSON but not a list of records.
    #[error("unexpected JSON structure from {url}; expected list, got {found}")]
    UnexpectedShape { url: String, found: &'static str },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SourceError {
    /// Whether the endpoint answered but the body was unusable.
    ///
    /// Such partitions count as empty for the run; any other error means the
    /// endpoint could not be reached and the run is abandoned.
    pub fn is_bad_payload(&self) -> bool {
        matches!(self, Self::Json { .. } | Self::UnexpectedShape { .. })
    }
}
