//! # outage-notify
//!
//! Delivery transports for rendered outage notifications.
//!
//! ## Sending Email
//!
//! ```no_run
//! use outage_core::RenderedMessage;
//! use outage_notify::{EmailConfig, EmailNotifier, Notifier};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), outage_notify::NotifyError> {
//!     let notifier = EmailNotifier::new(EmailConfig::from_env()?)?;
//!
//!     let message = RenderedMessage {
//!         subject: "DEDDIE Power Outage Updates".to_string(),
//!         text: "ΓΝΩΣΤΕΣ ΔΙΑΚΟΠΕΣ ΔΕΔΔΗΕ\nΚαμία ενεργή διακοπή.".to_string(),
//!         html: None,
//!     };
//!     notifier.send(&message).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Posting to a Chat Webhook
//!
//! ```no_run
//! use outage_notify::{Notifier, WebhookConfig, WebhookNotifier};
//!
//! # async fn example(message: outage_core::RenderedMessage) -> Result<(), outage_notify::NotifyError> {
//! let notifier = WebhookNotifier::new(WebhookConfig::from_env()?)?;
//! notifier.send(&message).await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod email;
mod error;
mod notifier;
mod webhook;

pub use config::{EmailConfig, WebhookConfig};
pub use email::EmailNotifier;
pub use error::NotifyError;
pub use notifier::{LoggingNotifier, NoOpNotifier, Notifier};
pub use webhook::WebhookNotifier;
