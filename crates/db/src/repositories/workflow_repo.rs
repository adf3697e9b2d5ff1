//! Repository for the `workflows` table.
//!
//! Workflow documents are immutable after creation: there is no update
//! method on purpose. The payload is stored as JSONB exactly as received,
//! so a save/reload round-trip loses nothing.

use carelink_core::types::DbId;
use sqlx::PgPool;

use crate::models::workflow::{CreateWorkflow, Workflow, WorkflowSummary};

/// Column list for `workflows` queries.
const COLUMNS: &str = "id, name, payload, created_at";

/// Provides persistence for saved workflow graphs.
pub struct WorkflowRepo;

impl WorkflowRepo {
    /// Save a workflow document, returning the full row.
    pub async fn create(pool: &PgPool, input: &CreateWorkflow) -> Result<Workflow, sqlx::Error> {
        let query = format!(
            "INSERT INTO workflows (name, payload) \
             VALUES ($1, $2) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Workflow>(&query)
            .bind(&input.name)
            .bind(&input.payload)
            .fetch_one(pool)
            .await
    }

    /// Find a workflow (including its payload) by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Workflow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM workflows WHERE id = $1");
        sqlx::query_as::<_, Workflow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List workflow summaries (no payloads), newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<WorkflowSummary>, sqlx::Error> {
        sqlx::query_as::<_, WorkflowSummary>(
            "SELECT id, name, created_at FROM workflows ORDER BY created_at DESC",
        )
        .fetch_all(pool)
        .await
    }

    /// Delete a workflow. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM workflows WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
