//! Repository for the `executions` table.
//!
//! Executions move `queued → running → {completed | failed}`; the methods
//! here are the only writers. Terminal rows are never updated again and
//! never deleted automatically.

use carelink_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::execution::{Execution, ExecutionStatus};

/// Column list for `executions` queries.
const COLUMNS: &str = "id, workflow_id, emr_id, status, logs, result, created_at";

/// Provides lifecycle operations for workflow executions.
pub struct ExecutionRepo;

impl ExecutionRepo {
    /// Create a new execution in `queued` status.
    pub async fn create(
        pool: &PgPool,
        workflow_id: DbId,
        emr_id: Option<DbId>,
    ) -> Result<Execution, sqlx::Error> {
        let query = format!(
            "INSERT INTO executions (workflow_id, emr_id, status) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Execution>(&query)
            .bind(workflow_id)
            .bind(emr_id)
            .bind(ExecutionStatus::Queued.as_str())
            .fetch_one(pool)
            .await
    }

    /// Find an execution by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Execution>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM executions WHERE id = $1");
        sqlx::query_as::<_, Execution>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Atomically claim the oldest queued execution and mark it running.
    ///
    /// Uses `SELECT FOR UPDATE SKIP LOCKED` so multiple worker processes
    /// never claim the same row. Returns `None` when the queue is empty.
    pub async fn claim_next(pool: &PgPool) -> Result<Option<Execution>, sqlx::Error> {
        let query = format!(
            "UPDATE executions \
             SET status = $1 \
             WHERE id = ( \
                 SELECT id FROM executions \
                 WHERE status = $2 \
                 ORDER BY created_at ASC \
                 LIMIT 1 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Execution>(&query)
            .bind(ExecutionStatus::Running.as_str())
            .bind(ExecutionStatus::Queued.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Transition a specific queued execution to `running`.
    ///
    /// Returns `false` if the row was not in `queued` status (e.g. a worker
    /// already claimed it), in which case the caller must not run it.
    pub async fn mark_running(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE executions SET status = $1 WHERE id = $2 AND status = $3")
            .bind(ExecutionStatus::Running.as_str())
            .bind(id)
            .bind(ExecutionStatus::Queued.as_str())
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Attach logs and result, and move the execution to a terminal status.
    pub async fn finish(
        pool: &PgPool,
        id: DbId,
        status: ExecutionStatus,
        logs: &serde_json::Value,
        result: &serde_json::Value,
    ) -> Result<(), sqlx::Error> {
        debug_assert!(status.is_terminal());
        sqlx::query("UPDATE executions SET status = $1, logs = $2, result = $3 WHERE id = $4")
            .bind(status.as_str())
            .bind(logs)
            .bind(result)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Take a transaction-scoped advisory lock for one patient.
    ///
    /// Serializes executions against the same patient record: the lock is
    /// held until the returned transaction is committed or dropped, so scan
    /// and inference reads inside one run cannot interleave with another
    /// run for the same patient. Runs for different patients are unaffected.
    pub async fn lock_patient(
        pool: &PgPool,
        emr_id: DbId,
    ) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(emr_id)
            .execute(&mut *tx)
            .await?;
        Ok(tx)
    }
}
