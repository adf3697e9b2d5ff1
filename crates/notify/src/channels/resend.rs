//! Delivery via the Resend transactional email API.

use std::time::Duration;

use async_trait::async_trait;

use crate::channel::{ChannelError, DeliveryChannel};
use crate::message::NotificationMessage;

/// Resend API endpoint.
const API_URL: &str = "https://api.resend.com/emails";

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Default sender when `RESEND_FROM` is not set.
const DEFAULT_FROM: &str = "Carelink <noreply@carelink.local>";

/// Sends notification emails through the Resend HTTP API.
pub struct ResendChannel {
    client: reqwest::Client,
    api_key: String,
    from: String,
}

impl ResendChannel {
    /// Create a channel with an explicit API key and sender.
    pub fn new(api_key: String, from: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            client,
            api_key,
            from,
        }
    }

    /// Build the channel from `RESEND_API_KEY` / `RESEND_FROM`.
    ///
    /// Returns `None` when the API key is absent, meaning the channel is
    /// not configured and must be left out of the dispatcher chain.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("RESEND_API_KEY").ok()?;
        let from = std::env::var("RESEND_FROM").unwrap_or_else(|_| DEFAULT_FROM.to_string());
        Some(Self::new(api_key, from))
    }
}

#[async_trait]
impl DeliveryChannel for ResendChannel {
    fn name(&self) -> &'static str {
        "resend"
    }

    async fn attempt(&self, message: &NotificationMessage) -> Result<(), ChannelError> {
        let body = serde_json::json!({
            "from": self.from,
            "to": message.recipients,
            "subject": message.subject,
            "html": message.html_body(),
        });

        let response = self
            .client
            .post(API_URL)
            .bearer_auth(&self.api_key)
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
            "Email sent via Resend"
        );
        Ok(())
    }
}
