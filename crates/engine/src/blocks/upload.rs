//! Upload block: summarizes the patient's existing scans.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::blocks::{BlockError, BlockHandler};
use crate::context::BlockContext;
use crate::result::BlockResult;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

pub struct UploadBlock;

#[async_trait]
impl BlockHandler for UploadBlock {
    async fn execute(&self, ctx: &BlockContext<'_>) -> Result<BlockResult, BlockError> {
        // BTreeSet keeps the extension list deterministic.
        let scan_types: BTreeSet<&str> = ctx
            .scans
            .iter()
            .filter_map(|s| s.file_url.rsplit_once('.').map(|(_, ext)| ext))
            .collect();

        let total_bytes: i64 = ctx.scans.iter().filter_map(|s| s.file_size).sum();

        Ok(BlockResult::completed(serde_json::json!({
            "scans_found": ctx.scans.len(),
            "scan_types": scan_types,
            "total_size_mb": total_bytes as f64 / BYTES_PER_MB,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ctx, emr, scan, StubServices};

    #[tokio::test]
    async fn summarizes_scan_count_types_and_size() {
        let services = StubServices::default();
        let patient = emr(1, "Jane Doe", Some(42));
        let scans = vec![
            scan(10, 1, "https://cdn.test/scans/a.png", Some(1024 * 1024)),
            scan(11, 1, "https://cdn.test/scans/b.jpeg", Some(2 * 1024 * 1024)),
            scan(12, 1, "https://cdn.test/scans/c.png", None),
        ];
        let config = serde_json::Map::new();

        let result = UploadBlock
            .execute(&ctx(&patient, &scans, &config, &services))
            .await
            .unwrap();

        assert_eq!(result.data["scans_found"], 3);
        assert_eq!(result.data["scan_types"], serde_json::json!(["jpeg", "png"]));
        assert_eq!(result.data["total_size_mb"], 3.0);
    }

    #[tokio::test]
    async fn empty_scan_list_is_still_completed() {
        let services = StubServices::default();
        let patient = emr(1, "Jane Doe", Some(42));
        let config = serde_json::Map::new();

        let result = UploadBlock
            .execute(&ctx(&patient, &[], &config, &services))
            .await
            .unwrap();

        assert_eq!(result.data["scans_found"], 0);
        assert_eq!(result.data["total_size_mb"], 0.0);
    }
}
