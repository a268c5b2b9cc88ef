//! Configuration types for outage-source.

use std::env;
use std::time::Duration;

use crate::SourceError;

/// DEDDIE outage endpoint; `{ne_id}` is replaced with the partition id.
pub const DEFAULT_ENDPOINT: &str = "https://apps.deddie.gr/gr.deddie.pfr-2.1/rest/powercutreport/\
                                    getPowerOutagesperNE?nomarxiaki_enothta_id={ne_id}";

const DEFAULT_USER_AGENT: &str = "deddie-powercuts-monitor/2.1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Configuration for the outage report client.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// URL template containing `{ne_id}`.
    pub endpoint: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// User-Agent header value.
    pub user_agent: String,
    /// Retry policy for transient failures.
    pub retry: RetryConfig,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            retry: RetryConfig::default(),
        }
    }
}

impl SourceConfig {
    /// Create configuration from environment variables.
    ///
    /// Optional (with defaults):
    /// - `SOURCE_ENDPOINT` - URL template containing `{ne_id}`
    /// - `SOURCE_TIMEOUT_SECS` - Default: 20
    pub fn from_env() -> Result<Self, SourceError> {
        let mut config = Self::default();

        if let Ok(endpoint) = env::var("SOURCE_ENDPOINT") {
            config = config.with_endpoint(endpoint);
        }

        if let Ok(raw) = env::var("SOURCE_TIMEOUT_SECS") {
            let secs = raw
                .trim()
                .parse::<u64>()
                .map_err(|e| SourceError::Config(format!("Invalid SOURCE_TIMEOUT_SECS: {}", e)))?;
            config.timeout = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    /// Builder method to set the endpoint template.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Builder method to set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder method to set the retry policy.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Check that the endpoint template can address a partition.
    pub fn validate(&self) -> Result<(), SourceError> {
        if !self.endpoint.contains("{ne_id}") {
            return Err(SourceError::Config(format!(
                "endpoint '{}' has no {{ne_id}} placeholder",
                self.endpoint
            )));
        }
        Ok(())
    }

    /// Get the URL for one partition.
    pub fn partition_url(&self, ne_id: &str) -> String {
        self.endpoint.replace("{ne_id}", &urlencoding::encode(ne_id))
    }
}

/// Retry policy with exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Backoff multiplier for each retry.
    pub backoff_multiplier: f64,
    /// Response statuses that are retried.
    pub retry_statuses: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_delay: Duration::from_millis(600),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            retry_statuses: vec![429, 500, 502, 503, 504],
        }
    }
}

impl RetryConfig {
    /// No retries at all.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Calculate delay for a given retry number (0-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay_ms =
            self.initial_delay.as_millis() as f64 * self.backoff_multiplier.powi(attempt as i32);
        let delay = Duration::from_millis(delay_ms as u64);
        delay.min(self.max_delay)
    }

    /// Check if we should retry after the given number of retries.
    pub fn should_retry(&self, retries: u32) -> bool {
        retries < self.max_retries
    }

    /// Whether a response status is worth retrying.
    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retry_statuses.contains(&status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_url() {
        let config = SourceConfig::default();
        assert_eq!(
            config.partition_url("0205"),
            "https://apps.deddie.gr/gr.deddie.pfr-2.1/rest/powercutreport/\
             getPowerOutagesperNE?nomarxiaki_enothta_id=0205"
        );
        assert!(config.partition_url("a b").ends_with("=a%20b"));
    }

    #[test]
    fn test_validate_requires_placeholder() {
        let config = SourceConfig::default().with_endpoint("http://localhost/outages");
        assert!(matches!(config.validate(), Err(SourceError::Config(_))));
        assert!(SourceConfig::default().validate().is_ok());
    }

    #[test]
    fn test_backoff_delays() {
        let retry = RetryConfig::default();
        assert_eq!(retry.delay_for_attempt(0), Duration::from_millis(600));
        assert_eq!(retry.delay_for_attempt(1), Duration::from_millis(1200));
        assert_eq!(retry.delay_for_attempt(2), Duration::from_millis(2400));
        assert_eq!(retry.delay_for_attempt(10), Duration::from_secs(30));
    }

    #[test]
    fn test_should_retry() {
        let retry = RetryConfig::default();
        assert!(retry.should_retry(0));
        assert!(retry.should_retry(4));
        assert!(!retry.should_retry(5));
        assert!(!RetryConfig::none().should_retry(0));
    }

    #[test]
    fn test_retryable_statuses() {
        let retry = RetryConfig::default();
        assert!(retry.is_retryable_status(503));
        assert!(retry.is_retryable_status(429));
        assert!(!retry.is_retryable_status(404));
    }
}
