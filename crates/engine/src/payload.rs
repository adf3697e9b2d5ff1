//! Workflow payload document types.
//!
//! The editor saves `{ nodes: [...], edges: [...] }`. Nodes carry a stable
//! id plus a `data` object with the block type, a display label, and an
//! arbitrary configuration map. Edges exist for visual layout only;
//! execution order is the node array order, and nothing here consults
//! edge topology.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A saved workflow graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowPayload {
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub edges: Vec<EdgeSpec>,
}

/// One node of the graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Stable node id, unique within one payload.
    pub id: String,
    pub data: NodeData,
}

/// The editable part of a node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeData {
    /// Block type tag (`emr`, `ai`, `billing`, ...).
    #[serde(rename = "type")]
    pub block_type: String,
    /// Display label shown in the editor and used in execution logs.
    #[serde(default)]
    pub label: Option<String>,
    /// Per-node configuration mapping.
    #[serde(default)]
    pub config: serde_json::Map<String, Value>,
}

/// A directed visual connection between two node ids. Layout only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeSpec {
    #[serde(default)]
    pub id: Option<String>,
    pub source: String,
    pub target: String,
}

impl NodeSpec {
    /// Human-readable name for log lines: the label when present,
    /// otherwise the block type.
    pub fn display_label(&self) -> &str {
        self.data
            .label
            .as_deref()
            .unwrap_or(&self.data.block_type)
    }
}

impl WorkflowPayload {
    /// Parse a stored payload document.
    ///
    /// Unknown top-level and node-level keys (editor positions, styling)
    /// are ignored here; the database keeps the document verbatim, so
    /// nothing is lost by parsing a projection of it.
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value.clone())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
