//! Graph block: synthetic time-series data for dashboard previews.

use async_trait::async_trait;
use rand::Rng;

use crate::blocks::{BlockError, BlockHandler};
use crate::context::BlockContext;
use crate::result::BlockResult;

/// Points generated per metric (one per day of the reported week).
const POINTS_PER_METRIC: usize = 7;

/// Metrics charted when the node does not name any.
const DEFAULT_METRICS: [&str; 3] = ["total_cost", "resources_used", "patient_load"];

pub struct GraphBlock;

#[async_trait]
impl BlockHandler for GraphBlock {
    async fn execute(&self, ctx: &BlockContext<'_>) -> Result<BlockResult, BlockError> {
        let metrics = ctx.str_list_or("metrics", &DEFAULT_METRICS);
        let chart_type = ctx.str_or("chart_type", "line");

        let mut rng = rand::rng();
        let series: Vec<_> = metrics
            .iter()
            .map(|name| {
                let values: Vec<f64> = (0..POINTS_PER_METRIC)
                    .map(|_| rng.random::<f64>() * 1000.0)
                    .collect();
                serde_json::json!({ "name": name, "values": values })
            })
            .collect();

        Ok(BlockResult::completed(serde_json::json!({
            "chart_type": chart_type,
            "metrics": series,
            "time_period": "last_7_days",
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ctx, emr, StubServices};

    #[tokio::test]
    async fn every_metric_gets_seven_points() {
        let services = StubServices::default();
        let patient = emr(1, "Jane Doe", Some(42));
        let config = serde_json::Map::new();

        let result = GraphBlock
            .execute(&ctx(&patient, &[], &config, &services))
            .await
            .unwrap();

        let metrics = result.data["metrics"].as_array().unwrap();
        assert_eq!(metrics.len(), 3);
        for metric in metrics {
            assert_eq!(metric["values"].as_array().unwrap().len(), 7);
        }
    }

    #[tokio::test]
    async fn structure_is_stable_across_invocations() {
        let services = StubServices::default();
        let patient = emr(1, "Jane Doe", Some(42));
        let mut config = serde_json::Map::new();
        config.insert("metrics".to_string(), serde_json::json!(["patient_load"]));

        let handler = GraphBlock;
        let first = handler
            .execute(&ctx(&patient, &[], &config, &services))
            .await
            .unwrap();
        let second = handler
            .execute(&ctx(&patient, &[], &config, &services))
            .await
            .unwrap();

        // Same metric names and point counts; the values themselves are
        // random and may differ.
        let names = |r: &BlockResult| {
            r.data["metrics"]
                .as_array()
                .unwrap()
                .iter()
                .map(|m| m["name"].as_str().unwrap().to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(names(&first), names(&second));
        assert_eq!(
            first.data["metrics"][0]["values"].as_array().unwrap().len(),
            second.data["metrics"][0]["values"].as_array().unwrap().len(),
        );
    }
}
