//! Engine output types: per-block results, log entries, and the aggregate
//! outcome of one run.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

/// Terminal status of one block execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockStatus {
    Completed,
    Skipped,
    Failed,
}

/// Result of one block execution.
///
/// `data` is block-specific and serializes inline next to `status`, so the
/// persisted shape is a flat object per node.
#[derive(Debug, Clone, Serialize)]
pub struct BlockResult {
    pub status: BlockStatus,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl BlockResult {
    /// A `completed` result with block-specific fields.
    ///
    /// Panics if `data` is not a JSON object; handlers always build one
    /// with `serde_json::json!({ ... })`.
    pub fn completed(data: Value) -> Self {
        Self {
            status: BlockStatus::Completed,
            data: into_map(data),
        }
    }

    /// A `skipped` result carrying the reason.
    pub fn skipped(reason: &str) -> Self {
        let mut data = Map::new();
        data.insert("reason".to_string(), Value::String(reason.to_string()));
        Self {
            status: BlockStatus::Skipped,
            data,
        }
    }

    /// A `failed` result with block-specific fields (typically an `error`).
    pub fn failed(data: Value) -> Self {
        Self {
            status: BlockStatus::Failed,
            data: into_map(data),
        }
    }
}

fn into_map(data: Value) -> Map<String, Value> {
    match data {
        Value::Object(map) => map,
        other => panic!("block result data must be a JSON object, got {other}"),
    }
}

/// Severity of one execution log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Error,
}

/// One structured entry in an execution's log.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

impl LogEntry {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: LogLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: LogLevel::Error,
            message: message.into(),
        }
    }
}

/// Aggregate outcome of one engine run.
///
/// `success` is `false` only when a prerequisite load failed (patient
/// record or scans); individual block failures leave it `true`.
/// `executed_blocks` counts nodes attempted, which is the full node array
/// whenever prerequisites loaded.
#[derive(Debug, Serialize)]
pub struct EngineOutcome {
    pub success: bool,
    pub logs: Vec<LogEntry>,
    pub results: BTreeMap<String, BlockResult>,
    pub executed_blocks: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EngineOutcome {
    /// The whole-run failure shape: no node results, an error message.
    pub fn failure(logs: Vec<LogEntry>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            logs,
            results: BTreeMap::new(),
            executed_blocks: 0,
            error: Some(error.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_result_serializes_flat() {
        let result = BlockResult::completed(serde_json::json!({ "total": 550.0 }));
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["status"], "completed");
        assert_eq!(value["total"], 550.0);
    }

    #[test]
    fn skipped_carries_reason() {
        let result = BlockResult::skipped("Unknown block type");
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["status"], "skipped");
        assert_eq!(value["reason"], "Unknown block type");
    }

    #[test]
    fn log_levels_serialize_lowercase() {
        let entry = LogEntry::error("boom");
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["level"], "error");
        assert_eq!(value["message"], "boom");
    }
}
