//! Repository for the `email_logs` table.
//!
//! Rows are append-only: one per recipient per delivery attempt. There is
//! no update method.

use carelink_core::types::DbId;
use sqlx::PgPool;

use crate::models::email_log::EmailLog;

/// Column list for `email_logs` queries.
const COLUMNS: &str =
    "id, execution_id, recipient, subject, status, provider, error_message, sent_at";

/// Provides append/read operations for the email audit trail.
pub struct EmailLogRepo;

impl EmailLogRepo {
    /// Record one delivery attempt for one recipient.
    pub async fn record(
        pool: &PgPool,
        execution_id: Option<DbId>,
        recipient: &str,
        subject: &str,
        status: &str,
        provider: &str,
        error_message: Option<&str>,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO email_logs \
                 (execution_id, recipient, subject, status, provider, error_message) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id",
        )
        .bind(execution_id)
        .bind(recipient)
        .bind(subject)
        .bind(status)
        .bind(provider)
        .bind(error_message)
        .fetch_one(pool)
        .await
    }

    /// List all attempts recorded for an execution, oldest first.
    pub async fn list_for_execution(
        pool: &PgPool,
        execution_id: DbId,
    ) -> Result<Vec<EmailLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM email_logs \
             WHERE execution_id = $1 \
             ORDER BY sent_at ASC, id ASC"
        );
        sqlx::query_as::<_, EmailLog>(&query)
            .bind(execution_id)
            .fetch_all(pool)
            .await
    }
}
