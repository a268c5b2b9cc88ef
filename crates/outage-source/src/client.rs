//! HTTP client for the outage report API.

use async_trait::async_trait;
use outage_core::normalize::json_kind;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::config::SourceConfig;
use crate::error::SourceError;
use crate::source::OutageSource;

/// Client for the DEDDIE outage report endpoint.
#[derive(Clone)]
pub struct OutageClient {
    http: Client,
    config: SourceConfig,
}

impl OutageClient {
    /// Create a new client with the given configuration.
    pub fn new(config: SourceConfig) -> Result<Self, SourceError> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()?;

        Ok(Self { http, config })
    }

    /// GET a URL, retrying transport errors and retryable statuses.
    ///
    /// Once retries are exhausted the last response is returned as-is so
    /// the caller can still try to read its body.
    async fn get_with_retry(&self, url: &str) -> Result<(StatusCode, String), SourceError> {
        let retry = &self.config.retry;
        let mut retries = 0u32;

        loop {
            match self.http.get(url).send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if retry.is_retryable_status(status.as_u16()) && retry.should_retry(retries) {
                        let delay = retry.delay_for_attempt(retries);
                        warn!(%status, retry = retries + 1, ?delay, "Retryable response status");
                        tokio::time::sleep(delay).await;
                        retries += 1;
                        continue;
                    }
                    let body = resp.text().await?;
                    return Ok((status, body));
                }
                Err(e) if retry.should_retry(retries) => {
                    let delay = retry.delay_for_attempt(retries);
                    warn!(error = %e, retry = retries + 1, ?delay, "Request failed; retrying");
                    tokio::time::sleep(delay).await;
                    retries += 1;
                }
                Err(e) => return Err(SourceError::Http(e)),
            }
        }
    }
}

#[async_trait]
impl OutageSource for OutageClient {
    #[instrument(skip(self))]
    async fn fetch(&self, ne_id: &str) -> Result<Vec<Value>, SourceError> {
        let url = self.config.partition_url(ne_id);
        info!(url = %url, "Fetching");

        let (status, body) = self.get_with_retry(&url).await?;
        if status != StatusCode::OK {
            warn!(%status, "Non-200 response");
        }

        let data: Value = serde_json::from_str(&body).map_err(|source| SourceError::Json {
            url: url.clone(),
            source,
        })?;

        match data {
            Value::Array(records) => {
                debug!(count = records.len(), "Fetched records");
                Ok(records)
            }
            other => Err(SourceError::UnexpectedShape {
                url,
                found: json_kind(&other),
            }),
        }
    }
}
