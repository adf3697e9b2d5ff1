//! Email audit log entity model.

use carelink_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `email_logs` table.
///
/// One row per recipient per delivery attempt, written once and never
/// updated. `provider` records which channel handled the attempt
/// (`resend`, `brevo`, `smtp`, or `logged` for the audit-only fallback).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EmailLog {
    pub id: DbId,
    pub execution_id: Option<DbId>,
    pub recipient: String,
    pub subject: Option<String>,
    pub status: String,
    pub provider: Option<String>,
    pub error_message: Option<String>,
    pub sent_at: Timestamp,
}
