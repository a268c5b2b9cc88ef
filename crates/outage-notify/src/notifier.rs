//! The delivery trait and trivial implementations.

use async_trait::async_trait;
use outage_core::RenderedMessage;
use tracing::info;

use crate::NotifyError;

/// A delivery transport for rendered notifications.
///
/// Abstracted to support email, chat webhooks and tests.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Get the name of this transport.
    fn name(&self) -> &'static str;

    /// Deliver a rendered message.
    async fn send(&self, message: &RenderedMessage) -> Result<(), NotifyError>;
}

/// A notifier that discards all messages.
#[derive(Debug, Clone, Default)]
pub struct NoOpNotifier;

#[async_trait]
impl Notifier for NoOpNotifier {
    fn name(&self) -> &'static str {
        "noop"
    }

    async fn send(&self, _message: &RenderedMessage) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// A notifier that writes messages to the log instead of delivering them.
#[derive(Debug, Clone, Default)]
pub struct LoggingNotifier;

#[async_trait]
impl Notifier for LoggingNotifier {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn send(&self, message: &RenderedMessage) -> Result<(), NotifyError> {
        info!(subject = %message.subject, "Notification (not delivered):\n{}", message.text);
        Ok(())
    }
}
