//! Billing block: mock invoice over configured line items.
//!
//! Costs are display-precision floating point; the two-decimal rendering
//! happens in the UI, not here.

use async_trait::async_trait;
use rand::Rng;

use crate::blocks::{BlockError, BlockHandler};
use crate::context::BlockContext;
use crate::result::BlockResult;

/// Fixed base cost in currency units.
const BASE_COST: f64 = 500.0;

/// Tax rate (percent) when unconfigured.
const DEFAULT_TAX_RATE: f64 = 10.0;

/// Line items when the node does not name any.
const DEFAULT_LINE_ITEMS: [&str; 3] = ["consultation", "scan_processing", "medication"];

pub struct BillingBlock;

#[async_trait]
impl BlockHandler for BillingBlock {
    async fn execute(&self, ctx: &BlockContext<'_>) -> Result<BlockResult, BlockError> {
        let items = ctx.str_list_or("line_items", &DEFAULT_LINE_ITEMS);
        let tax_rate = ctx.f64_or("tax_rate", DEFAULT_TAX_RATE);
        let tax = BASE_COST * tax_rate / 100.0;

        let mut rng = rand::rng();
        let line_items: Vec<_> = items
            .iter()
            .map(|name| {
                serde_json::json!({
                    "name": name,
                    "cost": 50.0 + rng.random::<f64>() * 300.0,
                })
            })
            .collect();

        Ok(BlockResult::completed(serde_json::json!({
            "patient_id": ctx.emr.id,
            "line_items": line_items,
            "subtotal": BASE_COST,
            "tax": tax,
            "total": BASE_COST + tax,
            "currency": "USD",
            "tax_rate_percent": tax_rate,
        })))
    }
}
