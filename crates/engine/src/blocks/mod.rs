//! Block handlers and their dispatch registry.
//!
//! Each block type implements [`BlockHandler`]; the engine resolves the
//! node's type tag through [`BlockRegistry`] and never hard-codes block
//! behaviour itself, so new block types register without touching the
//! engine loop.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::context::BlockContext;
use crate::result::BlockResult;

pub mod ai;
pub mod api;
pub mod billing;
pub mod emr;
pub mod graph;
pub mod inventory;
pub mod notify;
pub mod storage;
pub mod upload;

/// Fault raised by a block handler.
///
/// Handlers capture their *expected* failures (unreachable endpoint,
/// missing configuration) as a `failed`/`skipped` [`BlockResult`]; an
/// `Err` here means a provider-level fault; the engine records it as a
/// node failure and moves on to the next node.
#[derive(Debug, thiserror::Error)]
pub enum BlockError {
    /// A required database read failed.
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Trait for block execution. Each block type implements this.
#[async_trait]
pub trait BlockHandler: Send + Sync {
    /// Execute the block against one patient context.
    async fn execute(&self, ctx: &BlockContext<'_>) -> Result<BlockResult, BlockError>;
}

/// Registry of block handlers keyed by type tag.
pub struct BlockRegistry {
    handlers: HashMap<String, Box<dyn BlockHandler>>,
}

impl BlockRegistry {
    /// Registry with every built-in block type.
    pub fn new() -> Self {
        let mut registry = Self {
            handlers: HashMap::new(),
        };
        registry.register("emr", Box::new(emr::EmrBlock));
        registry.register("inventory", Box::new(inventory::InventoryBlock));
        registry.register("storage", Box::new(storage::StorageBlock));
        registry.register("upload", Box::new(upload::UploadBlock));
        registry.register("ai", Box::new(ai::AiBlock));
        registry.register("billing", Box::new(billing::BillingBlock));
        registry.register("notify", Box::new(notify::NotifyBlock));
        // The editor has saved both tags for the same block over time.
        registry.register("notification", Box::new(notify::NotifyBlock));
        registry.register("graph", Box::new(graph::GraphBlock));
        registry.register("api", Box::new(api::ApiBlock::new()));
        registry
    }

    /// Register (or replace) a handler for a type tag.
    pub fn register(&mut self, block_type: &str, handler: Box<dyn BlockHandler>) {
        self.handlers.insert(block_type.to_string(), handler);
    }

    /// Look up the handler for a type tag.
    pub fn get(&self, block_type: &str) -> Option<&dyn BlockHandler> {
        self.handlers.get(block_type).map(|h| h.as_ref())
    }
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::new()
    }
}
