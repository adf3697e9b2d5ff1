//! The workflow interpreter.

use std::collections::BTreeMap;
use std::sync::Arc;

use carelink_core::types::DbId;

use crate::blocks::BlockRegistry;
use crate::context::BlockContext;
use crate::payload::WorkflowPayload;
use crate::result::{BlockResult, EngineOutcome, LogEntry};
use crate::services::EngineServices;

/// Longest result JSON echoed into a success log line.
const LOG_RESULT_PREVIEW_CHARS: usize = 100;

/// Executes workflow payloads node by node.
///
/// Nodes run strictly in payload array order; the graph's edges are
/// visual. A node whose handler faults is degraded to a failure log entry
/// and the remaining nodes still run; only a failed prerequisite load
/// (patient record, scans) fails the run as a whole.
pub struct WorkflowEngine {
    services: Arc<dyn EngineServices>,
    registry: BlockRegistry,
}

impl WorkflowEngine {
    /// Engine with the built-in block registry.
    pub fn new(services: Arc<dyn EngineServices>) -> Self {
        Self {
            services,
            registry: BlockRegistry::new(),
        }
    }

    /// Engine with a caller-assembled registry (extra block types).
    pub fn with_registry(services: Arc<dyn EngineServices>, registry: BlockRegistry) -> Self {
        Self { services, registry }
    }

    /// Run one workflow payload against one patient record.
    pub async fn execute(
        &self,
        workflow_id: DbId,
        emr_id: DbId,
        payload: &WorkflowPayload,
        execution_id: Option<DbId>,
    ) -> EngineOutcome {
        let mut logs: Vec<LogEntry> = Vec::new();

        let emr = match self.services.load_emr(emr_id).await {
            Ok(Some(emr)) => emr,
            Ok(None) => {
                logs.push(LogEntry::error("Workflow failed: EMR not found"));
                return EngineOutcome::failure(logs, "EMR not found");
            }
            Err(e) => {
                logs.push(LogEntry::error(format!("Workflow failed: {e}")));
                return EngineOutcome::failure(logs, e.to_string());
            }
        };

        let scans = match self.services.load_scans(emr_id).await {
            Ok(scans) => scans,
            Err(e) => {
                logs.push(LogEntry::error(format!("Workflow failed: {e}")));
                return EngineOutcome::failure(logs, e.to_string());
            }
        };

        logs.push(LogEntry::info(format!(
            "Started workflow execution for EMR {emr_id} ({})",
            emr.patient_name
        )));
        tracing::info!(workflow_id, emr_id, nodes = payload.nodes.len(), "Executing workflow");

        let mut results: BTreeMap<String, BlockResult> = BTreeMap::new();

        for node in &payload.nodes {
            let ctx = BlockContext {
                emr: &emr,
                scans: &scans,
                config: &node.data.config,
                emr_id,
                execution_id,
                services: self.services.as_ref(),
            };

            match self.execute_block(&node.data.block_type, &ctx).await {
                Ok(result) => {
                    let preview = result_preview(&result);
                    logs.push(LogEntry::info(format!(
                        "Executed {}: {preview}",
                        node.display_label()
                    )));
                    results.insert(node.id.clone(), result);
                }
                Err(e) => {
                    tracing::warn!(
                        workflow_id,
                        node_id = %node.id,
                        error = %e,
                        "Block execution failed"
                    );
                    logs.push(LogEntry::error(format!(
                        "Failed {}: {e}",
                        node.display_label()
                    )));
                }
            }
        }

        EngineOutcome {
            success: true,
            logs,
            results,
            executed_blocks: payload.nodes.len(),
            error: None,
        }
    }

    async fn execute_block(
        &self,
        block_type: &str,
        ctx: &BlockContext<'_>,
    ) -> Result<BlockResult, crate::blocks::BlockError> {
        match self.registry.get(block_type) {
            Some(handler) => handler.execute(ctx).await,
            None => Ok(BlockResult::skipped("Unknown block type")),
        }
    }
}

/// Result JSON truncated for the execution log.
fn result_preview(result: &BlockResult) -> String {
    let json = serde_json::to_string(result).unwrap_or_default();
    json.chars().take(LOG_RESULT_PREVIEW_CHARS).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
