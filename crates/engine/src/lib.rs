//! Workflow execution engine.
//!
//! A saved workflow is a node-graph document; this crate interprets it
//! against one patient record. The moving parts:
//!
//! - [`payload`]: the node/edge document types as the editor saves them
//! - [`blocks`]: one handler per block type, dispatched via a registry
//! - [`services`]: the seam to the database, notification dispatcher, and
//!   insight generator (swapped for stubs in tests)
//! - [`engine`]: the interpreter loop: nodes run strictly in array order,
//!   a failing node degrades to a log entry instead of aborting the run
//! - [`runner`]: drives one execution record through its status
//!   lifecycle and persists the terminal result
//! - [`queue`]: the in-process FIFO used when no external worker is
//!   deployed

pub mod blocks;
pub mod context;
pub mod engine;
pub mod payload;
pub mod queue;
pub mod result;
pub mod runner;
pub mod services;

#[cfg(test)]
pub(crate) mod test_support;

pub use engine::WorkflowEngine;
pub use queue::ExecutionQueue;
pub use runner::ExecutionRunner;
pub use services::{EngineServices, PgEngineServices};
