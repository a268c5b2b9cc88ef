use std::env;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::NotifyError;

const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Configuration for SMTP email delivery.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// SMTP host (default: smtp.gmail.com)
    pub smtp_host: String,
    /// SMTP port (default: 587, STARTTLS)
    pub smtp_port: u16,
    /// Login address, also the sender when no alias is set
    pub username: String,
    /// Recipient address
    pub recipient: String,
    /// Optional From/Reply-To alias
    pub from_alias: Option<String>,
    /// SMTP command timeout
    pub timeout: Duration,
    /// App password
    password: SecretString,
}

impl EmailConfig {
    /// Create a new configuration with explicit values.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        recipient: impl Into<String>,
    ) -> Self {
        Self {
            smtp_host: DEFAULT_SMTP_HOST.to_string(),
            smtp_port: DEFAULT_SMTP_PORT,
            username: username.into(),
            recipient: recipient.into(),
            from_alias: None,
            timeout: DEFAULT_TIMEOUT,
            password: SecretString::from(password.into()),
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Required:
    /// - `GMAIL_ADDRESS` - SMTP login address
    /// - `GMAIL_APP_PASSWORD` - App password
    /// - `TEAMS_CHANNEL_EMAIL` - Recipient (e.g. a Teams channel address)
    ///
    /// Optional:
    /// - `FROM_ALIAS_EMAIL` - From/Reply-To alias
    /// - `SMTP_HOST` - Default: smtp.gmail.com
    /// - `SMTP_PORT` - Default: 587
    pub fn from_env() -> Result<Self, NotifyError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Create configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, NotifyError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required =
            |name: &str| get(name).ok_or_else(|| NotifyError::MissingEnvVar(name.to_string()));

        let username = required("GMAIL_ADDRESS")?;
        let password = required("GMAIL_APP_PASSWORD")?;
        let recipient = required("TEAMS_CHANNEL_EMAIL")?;

        let mut config = Self::new(username, password, recipient);
        config.from_alias = get("FROM_ALIAS_EMAIL");

        if let Some(host) = get("SMTP_HOST") {
            config.smtp_host = host;
        }
        if let Some(port) = get("SMTP_PORT") {
            config.smtp_port = port
                .parse::<u16>()
                .map_err(|e| NotifyError::Config(format!("Invalid SMTP_PORT: {}", e)))?;
        }

        Ok(config)
    }

    /// Get the password (exposes the secret).
    pub(crate) fn password(&self) -> &str {
        self.password.expose_secret()
    }

    /// Address used for From and Reply-To.
    pub fn sender(&self) -> &str {
        self.from_alias.as_deref().unwrap_or(&self.username)
    }

    /// Builder method to set the From/Reply-To alias.
    pub fn with_from_alias(mut self, alias: impl Into<String>) -> Self {
        self.from_alias = Some(alias.into());
        self
    }
}

/// Configuration for chat webhook delivery.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Incoming webhook URL
    pub url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl WebhookConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Create configuration from `WEBHOOK_URL`.
    pub fn from_env() -> Result<Self, NotifyError> {
        let url = env::var("WEBHOOK_URL")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| NotifyError::MissingEnvVar("WEBHOOK_URL".to_string()))?;
        Ok(Self::new(url))
    }

    /// Builder method to set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = EmailConfig::from_lookup(lookup(&[
            ("GMAIL_ADDRESS", "monitor@example.com"),
            ("GMAIL_APP_PASSWORD", "secret"),
            ("TEAMS_CHANNEL_EMAIL", " channel@example.com "),
        ]))
        .unwrap();

        assert_eq!(config.smtp_host, "smtp.gmail.com");
        assert_eq!(config.smtp_port, 587);
        assert_eq!(config.recipient, "channel@example.com");
        assert_eq!(config.sender(), "monitor@example.com");
        assert_eq!(config.password(), "secret");
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = EmailConfig::from_lookup(lookup(&[
            ("GMAIL_ADDRESS", "monitor@example.com"),
            ("GMAIL_APP_PASSWORD", "secret"),
            ("TEAMS_CHANNEL_EMAIL", "channel@example.com"),
            ("FROM_ALIAS_EMAIL", "alerts@example.com"),
            ("SMTP_HOST", "mail.example.com"),
            ("SMTP_PORT", "2525"),
        ]))
        .unwrap();

        assert_eq!(config.sender(), "alerts@example.com");
        assert_eq!(config.smtp_host, "mail.example.com");
        assert_eq!(config.smtp_port, 2525);
    }

    #[test]
    fn test_blank_required_var_is_missing() {
        let err = EmailConfig::from_lookup(lookup(&[
            ("GMAIL_ADDRESS", "monitor@example.com"),
            ("GMAIL_APP_PASSWORD", "   "),
            ("TEAMS_CHANNEL_EMAIL", "channel@example.com"),
        ]))
        .unwrap_err();

        assert!(matches!(err, NotifyError::MissingEnvVar(name) if name == "GMAIL_APP_PASSWORD"));
    }

    #[test]
    fn test_invalid_port() {
        let err = EmailConfig::from_lookup(lookup(&[
            ("GMAIL_ADDRESS", "monitor@example.com"),
            ("GMAIL_APP_PASSWORD", "secret"),
            ("TEAMS_CHANNEL_EMAIL", "channel@example.com"),
            ("SMTP_PORT", "smtp"),
        ]))
        .unwrap_err();

        assert!(matches!(err, NotifyError::Config(_)));
    }

    #[test]
    fn test_debug_does_not_leak_password() {
        let config = EmailConfig::new("monitor@example.com", "hunter2", "channel@example.com");
        assert!(!format!("{:?}", config).contains("hunter2"));
    }
}
