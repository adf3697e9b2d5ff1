//! Drives one execution record through its lifecycle.
//!
//! The runner owns everything the engine does not: status transitions on
//! the execution row, the per-patient advisory lock, the once-per-run
//! insight generation, and persisting the terminal logs/result. Both
//! deployment variants share it: the in-process queue calls
//! [`run_queued`](ExecutionRunner::run_queued), the worker binary claims
//! atomically and calls [`run_claimed`](ExecutionRunner::run_claimed).

use std::sync::Arc;

use carelink_ai::insight::{InsightOutcome, InsightStatus};
use carelink_core::types::DbId;
use carelink_db::models::execution::{Execution, ExecutionStatus};
use carelink_db::repositories::{ExecutionRepo, WorkflowRepo};
use carelink_db::DbPool;
use chrono::Utc;

use crate::engine::WorkflowEngine;
use crate::payload::WorkflowPayload;
use crate::result::{EngineOutcome, LogEntry};
use crate::services::EngineServices;

/// Executes queued workflow runs one at a time.
pub struct ExecutionRunner {
    pool: DbPool,
    services: Arc<dyn EngineServices>,
    engine: WorkflowEngine,
}

impl ExecutionRunner {
    pub fn new(pool: DbPool, services: Arc<dyn EngineServices>) -> Self {
        let engine = WorkflowEngine::new(Arc::clone(&services));
        Self {
            pool,
            services,
            engine,
        }
    }

    /// Run a queued execution by id.
    ///
    /// A row that is no longer `queued` (an external worker claimed it
    /// first) is left alone.
    pub async fn run_queued(&self, execution_id: DbId) -> Result<(), sqlx::Error> {
        let Some(execution) = ExecutionRepo::find_by_id(&self.pool, execution_id).await? else {
            tracing::warn!(execution_id, "Execution to run no longer exists");
            return Ok(());
        };

        if !ExecutionRepo::mark_running(&self.pool, execution_id).await? {
            tracing::debug!(execution_id, "Execution already claimed elsewhere, skipping");
            return Ok(());
        }

        self.run_claimed(&execution).await
    }

    /// Run an execution that is already in `running` status.
    pub async fn run_claimed(&self, execution: &Execution) -> Result<(), sqlx::Error> {
        tracing::info!(
            execution_id = execution.id,
            workflow_id = execution.workflow_id,
            "Execution started"
        );

        let Some(emr_id) = execution.emr_id else {
            return self
                .finish_failed(execution.id, "EMR not found")
                .await;
        };

        let Some(workflow) = WorkflowRepo::find_by_id(&self.pool, execution.workflow_id).await?
        else {
            return self
                .finish_failed(execution.id, "Workflow not found")
                .await;
        };

        let payload = match WorkflowPayload::from_value(&workflow.payload) {
            Ok(payload) => payload,
            Err(e) => {
                return self
                    .finish_failed(execution.id, &format!("Invalid workflow payload: {e}"))
                    .await;
            }
        };

        // Serialize runs against the same patient: the advisory lock is
        // held until `guard` commits (or is dropped on an error path).
        let guard = ExecutionRepo::lock_patient(&self.pool, emr_id).await?;

        let outcome = self
            .engine
            .execute(execution.workflow_id, emr_id, &payload, Some(execution.id))
            .await;

        // One insight pass per execution over the full scan list,
        // independent of how many `ai` nodes the graph contains.
        let scans = match self.services.load_scans(emr_id).await {
            Ok(scans) => scans,
            Err(e) => {
                tracing::warn!(execution_id = execution.id, error = %e, "Scan reload for insights failed");
                Vec::new()
            }
        };
        let insight = self.services.generate_insights(emr_id, &scans).await;

        let status = if outcome.success {
            ExecutionStatus::Completed
        } else {
            ExecutionStatus::Failed
        };
        let logs = serde_json::to_value(&outcome.logs).unwrap_or_else(|_| serde_json::json!([]));
        let result = build_result_payload(&outcome, &insight);

        ExecutionRepo::finish(&self.pool, execution.id, status, &logs, &result).await?;
        guard.commit().await?;

        tracing::info!(
            execution_id = execution.id,
            status = status.as_str(),
            executed_blocks = outcome.executed_blocks,
            "Execution finished"
        );
        Ok(())
    }

    /// Terminal failure before the engine could run at all.
    async fn finish_failed(&self, execution_id: DbId, error: &str) -> Result<(), sqlx::Error> {
        let logs = serde_json::to_value(vec![LogEntry::error(format!("Workflow failed: {error}"))])
            .unwrap_or_else(|_| serde_json::json!([]));
        let result = serde_json::json!({
            "status": ExecutionStatus::Failed,
            "error": error,
            "finished_at": Utc::now(),
        });
        ExecutionRepo::finish(&self.pool, execution_id, ExecutionStatus::Failed, &logs, &result)
            .await?;
        tracing::warn!(execution_id, error, "Execution failed before engine start");
        Ok(())
    }
}

/// Assemble the persisted result payload from the engine outcome and the
/// per-execution insight pass.
fn build_result_payload(outcome: &EngineOutcome, insight: &InsightOutcome) -> serde_json::Value {
    let mut result = serde_json::json!({
        "status": if outcome.success { ExecutionStatus::Completed } else { ExecutionStatus::Failed },
        "results": outcome.results,
        "executed_blocks": outcome.executed_blocks,
        "finished_at": Utc::now(),
    });

    if insight.status == InsightStatus::Completed {
        if let Some(text) = &insight.insights {
            result["insights"] = serde_json::json!(text);
        }
    }
    if let Some(error) = &outcome.error {
        result["error"] = serde_json::json!(error);
    }

    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
