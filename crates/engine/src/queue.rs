//! In-process execution queue.
//!
//! The no-worker deployment variant: a FIFO channel drained by a single
//! background task, one execution at a time, owned by whichever process
//! constructed it (no process-wide globals). When an external worker fleet
//! is deployed instead, this queue simply is not started; the rows stay
//! `queued` in the database and the workers claim them.

use std::sync::Arc;

use carelink_core::types::DbId;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::runner::ExecutionRunner;

/// Handle to the in-process FIFO of pending execution ids.
pub struct ExecutionQueue {
    tx: mpsc::UnboundedSender<DbId>,
}

impl ExecutionQueue {
    /// Start the drain loop and return the queue handle plus the task
    /// handle the owner awaits during shutdown.
    pub fn start(
        runner: Arc<ExecutionRunner>,
        cancel: CancellationToken,
    ) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<DbId>();

        let handle = tokio::spawn(async move {
            tracing::info!("In-process execution queue started");
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    received = rx.recv() => match received {
                        Some(execution_id) => {
                            if let Err(e) = runner.run_queued(execution_id).await {
                                tracing::error!(
                                    execution_id,
                                    error = %e,
                                    "Execution run failed"
                                );
                            }
                        }
                        None => break,
                    },
                }
            }
            tracing::info!("In-process execution queue stopped");
        });

        (Self { tx }, handle)
    }

    /// Hand an execution to the drain loop.
    ///
    /// Returns `false` when the loop is no longer accepting (shutdown in
    /// progress). The execution row stays `queued` in that case, so an
    /// external worker (or the next process start) can still pick it up.
    pub fn enqueue(&self, execution_id: DbId) -> bool {
        self.tx.send(execution_id).is_ok()
    }
}
