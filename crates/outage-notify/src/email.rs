use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use outage_core::RenderedMessage;
use tracing::{info, instrument};

use crate::{EmailConfig, Notifier, NotifyError};

/// Sends notifications over SMTP with STARTTLS.
pub struct EmailNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    config: EmailConfig,
}

impl EmailNotifier {
    /// Create a new notifier with the given configuration.
    ///
    /// No connection is opened until the first send.
    pub fn new(config: EmailConfig) -> Result<Self, NotifyError> {
        let creds = Credentials::new(config.username.clone(), config.password().to_string());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| NotifyError::Transport(e.to_string()))?
            .port(config.smtp_port)
            .timeout(Some(config.timeout))
            .credentials(creds)
            .build();

        info!(
            host = %config.smtp_host,
            port = config.smtp_port,
            username = %config.username,
            "Created SMTP notifier"
        );

        Ok(Self { transport, config })
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn name(&self) -> &'static str {
        "email"
    }

    #[instrument(skip(self, message), fields(to = %self.config.recipient, subject = %message.subject))]
    async fn send(&self, message: &RenderedMessage) -> Result<(), NotifyError> {
        let email = build_message(&self.config, message)?;

        info!("Sending email notification");
        self.transport
            .send(email)
            .await
            .map_err(|e| NotifyError::Send(e.to_string()))?;

        info!("Email sent successfully");
        Ok(())
    }
}

/// Build a lettre Message: text only, or text + HTML alternative.
pub(crate) fn build_message(
    config: &EmailConfig,
    message: &RenderedMessage,
) -> Result<Message, NotifyError> {
    let sender: Mailbox = config
        .sender()
        .parse()
        .map_err(|e| NotifyError::InvalidAddress(format!("From: {}", e)))?;
    let recipient: Mailbox = config
        .recipient
        .parse()
        .map_err(|e| NotifyError::InvalidAddress(format!("To '{}': {}", config.recipient, e)))?;

    let builder = Message::builder()
        .from(sender.clone())
        .reply_to(sender)
        .to(recipient)
        .subject(&message.subject);

    match &message.html {
        Some(html) => builder
            .multipart(
                MultiPart::alternative()
                    .singlepart(SinglePart::plain(message.text.clone()))
                    .singlepart(SinglePart::html(html.clone())),
            )
            .map_err(|e| NotifyError::BuildEmail(e.to_string())),
        None => builder
            .header(ContentType::TEXT_PLAIN)
            .body(message.text.clone())
            .map_err(|e| NotifyError::BuildEmail(e.to_string())),
    }
}
