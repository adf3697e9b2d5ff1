//! The delivery-channel abstraction.

use std::time::Duration;

use async_trait::async_trait;

use crate::message::NotificationMessage;

/// Error type shared by all delivery channels.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// The underlying HTTP request failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Provider returned HTTP {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(String),

    /// The send did not finish inside the channel's hard deadline.
    #[error("Delivery timed out after {0:?}")]
    Timeout(Duration),

    /// The message could not be assembled for this channel.
    #[error("Message build error: {0}")]
    Build(String),
}

/// One way of delivering a notification.
///
/// Channels are tried in priority order by the dispatcher; the first
/// `Ok(())` wins. An `Err` means "fall through to the next channel", never
/// "abort".
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    /// Provider tag recorded in the audit log (e.g. `resend`, `smtp`).
    fn name(&self) -> &'static str;

    /// Try to deliver the message to all recipients.
    async fn attempt(&self, message: &NotificationMessage) -> Result<(), ChannelError>;
}

/// Run `fut` under a hard deadline, mapping overrun to
/// [`ChannelError::Timeout`].
pub(crate) async fn with_deadline<F>(deadline: Duration, fut: F) -> Result<(), ChannelError>
where
    F: std::future::Future<Output = Result<(), ChannelError>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(ChannelError::Timeout(deadline)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn deadline_cuts_off_a_hung_send() {
        let started = Instant::now();
        let result = with_deadline(Duration::from_millis(50), std::future::pending()).await;

        assert!(matches!(result, Err(ChannelError::Timeout(_))));
        // The wall time is governed by the deadline, not the hung future.
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn deadline_passes_through_a_fast_result() {
        let result = with_deadline(Duration::from_secs(1), async { Ok(()) }).await;
        assert!(result.is_ok());
    }
}
