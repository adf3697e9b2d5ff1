//! Workflow definition entity model and DTOs.

use carelink_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `workflows` table.
///
/// `payload` is the saved node-graph document exactly as the editor
/// produced it: `{ nodes: [...], edges: [...] }`. Workflows are read-only
/// after creation; the only mutation is deletion.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Workflow {
    pub id: DbId,
    pub name: Option<String>,
    pub payload: serde_json::Value,
    pub created_at: Timestamp,
}

/// Summary row for `GET /workflows` (payload omitted).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkflowSummary {
    pub id: DbId,
    pub name: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for saving a workflow via `POST /workflow`.
#[derive(Debug, Deserialize)]
pub struct CreateWorkflow {
    pub name: Option<String>,
    pub payload: serde_json::Value,
}
