//! Notification block: builds the alert message and hands it to the
//! dispatcher as a detached task.
//!
//! The node's own result never waits for delivery: sent counters are
//! reported as zero placeholders and only the email audit log reflects
//! what the dispatcher eventually did.

use async_trait::async_trait;
use carelink_notify::NotificationMessage;
use chrono::Utc;

use crate::blocks::{BlockError, BlockHandler};
use crate::context::BlockContext;
use crate::result::BlockResult;

/// Channels announced when the node does not configure any.
const DEFAULT_CHANNELS: [&str; 2] = ["email", "sms"];

pub struct NotifyBlock;

#[async_trait]
impl BlockHandler for NotifyBlock {
    async fn execute(&self, ctx: &BlockContext<'_>) -> Result<BlockResult, BlockError> {
        let channels = ctx.str_list_or("channels", &DEFAULT_CHANNELS);
        let email_recipients = ctx.comma_list("email_recipients");
        let sms_recipients = ctx.comma_list("sms_recipients");
        let priority = ctx.str_or("priority", "normal").to_string();

        let subject = format!("Workflow Executed for Patient {}", ctx.emr.patient_name);
        let body_text = format!(
            "Alert: Workflow executed for patient {} (ID: {})",
            ctx.emr.patient_name, ctx.emr.id
        );
        let sent_at = Utc::now();

        if channels.iter().any(|c| c == "email") && !email_recipients.is_empty() {
            let message = NotificationMessage {
                execution_id: ctx.execution_id,
                recipients: email_recipients.clone(),
                subject: subject.clone(),
                patient_name: ctx.emr.patient_name.clone(),
                patient_id: ctx.emr.id,
                priority: priority.clone(),
                body_text: body_text.clone(),
                sent_at,
            };
            // Detached: the handle is dropped on purpose. Delivery outcome
            // lands in the email audit log, not in this node's result.
            let _detached = ctx.services.dispatch_notification(message);
        }

        Ok(BlockResult::completed(serde_json::json!({
            "email_recipients": email_recipients,
            "sms_recipients": sms_recipients,
            "channels_notified": channels,
            "priority": priority,
            "subject": subject,
            "message": body_text,
            "sent_at": sent_at,
            "email_sent": 0,
            "sms_sent": 0,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::BlockStatus;
    use crate::test_support::{ctx, emr, StubServices};

    #[tokio::test]
    async fn dispatches_email_and_reports_placeholder_counts() {
        let services = StubServices::default();
        let patient = emr(42, "Jane Doe", Some(42));
        let mut config = serde_json::Map::new();
        config.insert(
            "email_recipients".to_string(),
            serde_json::json!("ward@hospital.test, oncall@hospital.test"),
        );

        let result = NotifyBlock
            .execute(&ctx(&patient, &[], &config, &services))
            .await
            .unwrap();

        // The node completes immediately with zero counters.
        assert_eq!(result.status, BlockStatus::Completed);
        assert_eq!(result.data["email_sent"], 0);
        assert_eq!(result.data["sms_sent"], 0);

        // One message handed to the dispatcher, carrying both recipients.
        let dispatched = services.dispatched.lock().unwrap();
        assert_eq!(dispatched.len(), 1);
        assert_eq!(dispatched[0].recipients.len(), 2);
        assert_eq!(
            dispatched[0].subject,
            "Workflow Executed for Patient Jane Doe"
        );
        assert_eq!(dispatched[0].execution_id, Some(1));
    }

    #[tokio::test]
    async fn no_recipients_means_no_dispatch() {
        let services = StubServices::default();
        let patient = emr(1, "Jane Doe", Some(42));
        let config = serde_json::Map::new();

        let result = NotifyBlock
            .execute(&ctx(&patient, &[], &config, &services))
            .await
            .unwrap();

        assert_eq!(result.status, BlockStatus::Completed);
        assert!(services.dispatched.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn email_channel_disabled_means_no_dispatch() {
        let services = StubServices::default();
        let patient = emr(1, "Jane Doe", Some(42));
        let mut config = serde_json::Map::new();
        config.insert("channels".to_string(), serde_json::json!(["sms"]));
        config.insert(
            "email_recipients".to_string(),
            serde_json::json!("ward@hospital.test"),
        );

        NotifyBlock
            .execute(&ctx(&patient, &[], &config, &services))
            .await
            .unwrap();

        assert!(services.dispatched.lock().unwrap().is_empty());
    }
}
