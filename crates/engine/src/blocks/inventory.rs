//! Inventory block: static tracked-items summary.

use async_trait::async_trait;

use crate::blocks::{BlockError, BlockHandler};
use crate::context::BlockContext;
use crate::result::BlockResult;

/// Items tracked when the node does not name any.
const DEFAULT_ITEMS: [&str; 3] = ["beds", "medical_supplies", "equipment"];

/// Alert threshold (percent) when unconfigured.
const DEFAULT_ALERT_THRESHOLD: f64 = 20.0;

pub struct InventoryBlock;

#[async_trait]
impl BlockHandler for InventoryBlock {
    async fn execute(&self, ctx: &BlockContext<'_>) -> Result<BlockResult, BlockError> {
        let items = ctx.str_list_or("items", &DEFAULT_ITEMS);
        let threshold = ctx.f64_or("auto_alert_threshold", DEFAULT_ALERT_THRESHOLD);

        Ok(BlockResult::completed(serde_json::json!({
            "items_tracked": items,
            "auto_alert_threshold": threshold,
            "message": "Inventory check completed - no critical shortages",
        })))
    }
}
