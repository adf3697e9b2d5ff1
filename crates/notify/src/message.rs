//! Notification message payload shared by all delivery channels.

use carelink_core::types::{DbId, Timestamp};

/// One notification to be delivered to a set of email recipients.
///
/// Channels render the same HTML body so the patient context reads
/// identically no matter which provider ends up delivering.
#[derive(Debug, Clone)]
pub struct NotificationMessage {
    /// Execution that triggered the notification (audit log foreign key).
    pub execution_id: Option<DbId>,
    pub recipients: Vec<String>,
    pub subject: String,
    pub patient_name: String,
    pub patient_id: DbId,
    /// `normal` or `critical`; affects body styling only.
    pub priority: String,
    pub body_text: String,
    pub sent_at: Timestamp,
}

impl NotificationMessage {
    /// Render the HTML body used by every email channel.
    pub fn html_body(&self) -> String {
        let priority_color = if self.priority == "critical" {
            "red"
        } else {
            "orange"
        };
        format!(
            "<h2>{subject}</h2>\n\
             <p><strong>Patient:</strong> {name} (ID: {id})</p>\n\
             <p><strong>Priority:</strong> <span style=\"color: {color}\">{priority}</span></p>\n\
             <p><strong>Message:</strong> {body}</p>\n\
             <p><strong>Timestamp:</strong> {sent_at}</p>\n\
             <hr>\n\
             <p><em>This is an automated message from the Carelink hospital platform</em></p>",
            subject = self.subject,
            name = self.patient_name,
            id = self.patient_id,
            color = priority_color,
            priority = self.priority.to_uppercase(),
            body = self.body_text,
            sent_at = self.sent_at,
        )
    }
}
