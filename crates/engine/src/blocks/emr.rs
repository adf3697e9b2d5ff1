//! Patient record block: echoes the demographics the node asks for.

use async_trait::async_trait;

use crate::blocks::{BlockError, BlockHandler};
use crate::context::BlockContext;
use crate::result::BlockResult;

/// Fields returned when the node does not name any.
const DEFAULT_FIELDS: [&str; 3] = ["patient_name", "age", "notes"];

pub struct EmrBlock;

#[async_trait]
impl BlockHandler for EmrBlock {
    async fn execute(&self, ctx: &BlockContext<'_>) -> Result<BlockResult, BlockError> {
        let fields = ctx.str_list_or("fields", &DEFAULT_FIELDS);

        Ok(BlockResult::completed(serde_json::json!({
            "patient_id": ctx.emr.id,
            "patient_name": ctx.emr.patient_name,
            "age": ctx.emr.age,
            "notes": ctx.emr.notes,
            "created_at": ctx.emr.created_at,
            "fields_retrieved": fields,
        })))
    }
}
