//! Email audit trail seam.
//!
//! The dispatcher records every delivery attempt through [`EmailAudit`]
//! rather than writing rows directly, so unit tests can observe audit
//! behaviour without a database.

use async_trait::async_trait;
use carelink_core::types::DbId;
use carelink_db::repositories::EmailLogRepo;
use carelink_db::DbPool;

/// One audit row to be recorded: recipient-level delivery outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub execution_id: Option<DbId>,
    pub recipient: String,
    pub subject: String,
    /// `sent` or `failed`.
    pub status: String,
    /// Provider tag: channel name, or `logged` for the audit-only fallback.
    pub provider: String,
    pub error_message: Option<String>,
}

/// Records delivery attempts, one row per recipient.
#[async_trait]
pub trait EmailAudit: Send + Sync {
    async fn record(&self, entry: &AuditEntry) -> Result<(), sqlx::Error>;
}

/// Database-backed audit log writing to `email_logs`.
pub struct PgEmailAudit {
    pool: DbPool,
}

impl PgEmailAudit {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmailAudit for PgEmailAudit {
    async fn record(&self, entry: &AuditEntry) -> Result<(), sqlx::Error> {
        EmailLogRepo::record(
            &self.pool,
            entry.execution_id,
            &entry.recipient,
            &entry.subject,
            &entry.status,
            &entry.provider,
            entry.error_message.as_deref(),
        )
        .await?;
        Ok(())
    }
}
