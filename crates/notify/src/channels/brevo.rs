//! Delivery via the Brevo transactional email API.

use std::time::Duration;

use async_trait::async_trait;

use crate::channel::{ChannelError, DeliveryChannel};
use crate::message::NotificationMessage;

/// Brevo transactional email endpoint.
const API_URL: &str = "https://api.brevo.com/v3/smtp/email";

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Default sender address when `BREVO_FROM` is not set.
const DEFAULT_SENDER_EMAIL: &str = "noreply@carelink.local";

/// Default sender display name.
const DEFAULT_SENDER_NAME: &str = "Carelink Hospital";

/// Sends notification emails through the Brevo HTTP API.
pub struct BrevoChannel {
    client: reqwest::Client,
    api_key: String,
    sender_email: String,
    sender_name: String,
}

impl BrevoChannel {
    /// Create a channel with an explicit API key and sender identity.
    pub fn new(api_key: String, sender_email: String, sender_name: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            client,
            api_key,
            sender_email,
            sender_name,
        }
    }

    /// Build the channel from `BREVO_API_KEY` / `BREVO_FROM`.
    ///
    /// Returns `None` when the API key is absent.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("BREVO_API_KEY").ok()?;
        let sender_email =
            std::env::var("BREVO_FROM").unwrap_or_else(|_| DEFAULT_SENDER_EMAIL.to_string());
        Some(Self::new(
            api_key,
            sender_email,
            DEFAULT_SENDER_NAME.to_string(),
        ))
    }
}

#[async_trait]
impl DeliveryChannel for BrevoChannel {
    fn name(&self) -> &'static str {
        "brevo"
    }

    async fn attempt(&self, message: &NotificationMessage) -> Result<(), ChannelError> {
        let to: Vec<_> = message
            .recipients
            .iter()
            .map(|email| serde_json::json!({ "email": email }))
            .collect();

        let body = serde_json::json!({
            "to": to,
            "sender": { "email": self.sender_email, "name": self.sender_name },
            "subject": message.subject,
            "htmlContent": message.html_body(),
        });

        let response = self
            .client
            .post(API_URL)
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ChannelError::Api {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(
            recipients = message.recipients.len(),
            subject = %message.subject,
            "Email sent via Brevo"
        );
        Ok(())
    }
}
