//! Worker poll loop.
//!
//! The external-queue deployment variant: each worker process polls the
//! `executions` table for queued rows and claims them atomically with
//! `FOR UPDATE SKIP LOCKED`, so any number of workers can run side by side
//! without double-claiming. One worker runs one execution at a time.

use std::sync::Arc;
use std::time::Duration;

use carelink_db::models::execution::ExecutionStatus;
use carelink_db::repositories::ExecutionRepo;
use carelink_db::DbPool;
use carelink_engine::ExecutionRunner;
use tokio_util::sync::CancellationToken;

/// Default polling interval for the claim loop.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Claims queued executions and runs them to completion.
pub struct WorkerLoop {
    pool: DbPool,
    runner: Arc<ExecutionRunner>,
    poll_interval: Duration,
}

impl WorkerLoop {
    /// Create a loop with the default 1-second poll interval.
    pub fn new(pool: DbPool, runner: Arc<ExecutionRunner>) -> Self {
        Self {
            pool,
            runner,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Run until the cancellation token is triggered.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        tracing::info!(
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            "Worker loop started",
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Worker loop shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.drain_queue().await {
                        tracing::error!(error = %e, "Claim cycle failed");
                    }
                }
            }
        }
    }

    /// Claim and run queued executions until none remain.
    async fn drain_queue(&self) -> Result<(), sqlx::Error> {
        while let Some(execution) = ExecutionRepo::claim_next(&self.pool).await? {
            tracing::info!(
                execution_id = execution.id,
                workflow_id = execution.workflow_id,
                "Execution claimed",
            );

            if let Err(e) = self.runner.run_claimed(&execution).await {
                // The row would otherwise stay `running` forever; mark it
                // failed so the caller polling for status sees a terminal
                // state.
                tracing::error!(
                    execution_id = execution.id,
                    error = %e,
                    "Execution run failed",
                );
                let logs = serde_json::json!([
                    { "level": "error", "message": format!("Workflow failed: {e}") }
                ]);
                let result = serde_json::json!({ "status": "failed", "error": e.to_string() });
                if let Err(e) = ExecutionRepo::finish(
                    &self.pool,
                    execution.id,
                    ExecutionStatus::Failed,
                    &logs,
                    &result,
                )
                .await
                {
                    tracing::error!(
                        execution_id = execution.id,
                        error = %e,
                        "Failed to mark execution failed",
                    );
                }
            }
        }
        Ok(())
    }
}
