//! Chat webhook delivery.

use async_trait::async_trait;
use outage_core::RenderedMessage;
use serde::Serialize;
use tracing::{debug, info};

use crate::{Notifier, NotifyError, WebhookConfig};

/// Posts notifications to an incoming chat webhook.
pub struct WebhookNotifier {
    config: WebhookConfig,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    title: &'a str,
    text: &'a str,
}

impl WebhookNotifier {
    pub fn new(config: WebhookConfig) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn send(&self, message: &RenderedMessage) -> Result<(), NotifyError> {
        let payload = WebhookPayload {
            title: &message.subject,
            text: &message.text,
        };
        debug!(subject = %message.subject, "Posting webhook notification");

        let resp = self
            .client
            .post(&self.config.url)
            .json(&payload)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        info!(subject = %message.subject, "Webhook notification sent");
        Ok(())
    }
}
