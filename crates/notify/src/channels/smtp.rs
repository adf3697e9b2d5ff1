//! Delivery via a direct SMTP relay.
//!
//! Wraps the `lettre` async SMTP transport. The send runs under a hard
//! 5-second deadline: a slow or unreachable relay must not stall workflow
//! side effects, so an overrun is reported as a channel failure and the
//! dispatcher falls through to the audit log.

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::channel::{with_deadline, ChannelError, DeliveryChannel};
use crate::message::NotificationMessage;

/// Hard deadline for one SMTP send.
const SMTP_TIMEOUT: Duration = Duration::from_secs(5);

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "noreply@carelink.local";

// ---------------------------------------------------------------------------
// SmtpConfig
// ---------------------------------------------------------------------------

/// Configuration for the SMTP delivery channel.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port (defaults to 587).
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    /// Optional SMTP username.
    pub smtp_user: Option<String>,
    /// Optional SMTP password.
    pub smtp_password: Option<String>,
}

impl SmtpConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set, signalling that SMTP
    /// delivery is not configured and should be skipped.
    ///
    /// | Variable        | Required | Default                   |
    /// |-----------------|----------|---------------------------|
    /// | `SMTP_HOST`     | yes      | —                         |
    /// | `SMTP_PORT`     | no       | `587`                     |
    /// | `SMTP_FROM`     | no       | `noreply@carelink.local`  |
    /// | `SMTP_USER`     | no       | —                         |
    /// | `SMTP_PASSWORD` | no       | —                         |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// SmtpChannel
// ---------------------------------------------------------------------------

/// Sends notification emails through a direct SMTP relay.
pub struct SmtpChannel {
    config: SmtpConfig,
    deadline: Duration,
}

impl SmtpChannel {
    /// Create a channel with the default 5-second send deadline.
    pub fn new(config: SmtpConfig) -> Self {
        Self {
            config,
            deadline: SMTP_TIMEOUT,
        }
    }

    /// Override the send deadline (tests use a short one).
    pub fn with_deadline(config: SmtpConfig, deadline: Duration) -> Self {
        Self { config, deadline }
    }

    /// Build the channel from the `SMTP_*` environment variables.
    pub fn from_env() -> Option<Self> {
        SmtpConfig::from_env().map(Self::new)
    }

    fn build_message(&self, message: &NotificationMessage) -> Result<Message, ChannelError> {
        let mut builder = Message::builder()
            .from(
                self.config
                    .from_address
                    .parse()
                    .map_err(|e: lettre::address::AddressError| ChannelError::Build(e.to_string()))?,
            )
            .subject(&message.subject)
            .header(ContentType::TEXT_HTML);

        for recipient in &message.recipients {
            builder = builder.to(recipient
                .parse()
                .map_err(|e: lettre::address::AddressError| ChannelError::Build(e.to_string()))?);
        }

        builder
            .body(message.html_body())
            .map_err(|e| ChannelError::Build(e.to_string()))
    }

    fn build_transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, ChannelError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(
            &self.config.smtp_host,
        )
        .map_err(|e| ChannelError::Transport(e.to_string()))?
        .port(self.config.smtp_port);

        if let (Some(user), Some(pass)) = (&self.config.smtp_user, &self.config.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(builder.build())
    }
}

#[async_trait]
impl DeliveryChannel for SmtpChannel {
    fn name(&self) -> &'static str {
        "smtp"
    }

    async fn attempt(&self, message: &NotificationMessage) -> Result<(), ChannelError> {
        let email = self.build_message(message)?;
        let mailer = self.build_transport()?;

        with_deadline(self.deadline, async {
            mailer
                .send(email)
                .await
                .map(|_| ())
                .map_err(|e| ChannelError::Transport(e.to_string()))
        })
        .await?;

        tracing::info!(
            recipients = message.recipients.len(),
            subject = %message.subject,
            "Email sent via SMTP"
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn config() -> SmtpConfig {
        SmtpConfig {
            smtp_host: "smtp.example.test".to_string(),
            smtp_port: 587,
            from_address: "noreply@carelink.local".to_string(),
            smtp_user: None,
            smtp_password: None,
        }
    }

    fn message(recipients: &[&str]) -> NotificationMessage {
        NotificationMessage {
            execution_id: None,
            recipients: recipients.iter().map(|r| r.to_string()).collect(),
            subject: "Test".to_string(),
            patient_name: "Jane Doe".to_string(),
            patient_id: 1,
            priority: "normal".to_string(),
            body_text: "test".to_string(),
            sent_at: Utc::now(),
        }
    }

    #[test]
    fn from_env_returns_none_without_smtp_host() {
        std::env::remove_var("SMTP_HOST");
        assert!(SmtpChannel::from_env().is_none());
    }

    #[test]
    fn build_message_accepts_multiple_recipients() {
        let channel = SmtpChannel::new(config());
        let email = channel.build_message(&message(&["a@hospital.test", "b@hospital.test"]));
        assert!(email.is_ok());
    }

    #[test]
    fn build_message_rejects_invalid_recipient() {
        let channel = SmtpChannel::new(config());
        let result = channel.build_message(&message(&["not-an-email"]));
        assert!(matches!(result, Err(ChannelError::Build(_))));
    }
}
