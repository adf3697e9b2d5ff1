//! Storage block: reports the configured storage medium and a derived
//! location string.

use async_trait::async_trait;

use crate::blocks::{BlockError, BlockHandler};
use crate::context::BlockContext;
use crate::result::BlockResult;

pub struct StorageBlock;

#[async_trait]
impl BlockHandler for StorageBlock {
    async fn execute(&self, ctx: &BlockContext<'_>) -> Result<BlockResult, BlockError> {
        let storage_type = ctx.str_or("storage_type", "cloud");
        let encryption = ctx.str_or("encryption", "AES-256");
        let sensitive = ctx.bool_or("sensitive_data", false);

        let (location, data_location) = if storage_type == "cloud" {
            ("Carelink Object Storage", "object_store")
        } else {
            ("PostgreSQL", "database")
        };

        Ok(BlockResult::completed(serde_json::json!({
            "storage_type": storage_type,
            "encryption": encryption,
            "sensitive_data_protected": sensitive,
            "location": location,
            "patient_data_location": data_location,
        })))
    }
}
