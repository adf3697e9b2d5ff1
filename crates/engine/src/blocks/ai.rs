//! AI analysis block: per-scan inference review plus narrative insights.
//!
//! For every scan the handler fetches the effective current inference and
//! tags whether its confidence clears the node's threshold. Database
//! faults during those lookups propagate; the engine degrades the node to
//! a failure log entry and the workflow continues.

use async_trait::async_trait;
use carelink_ai::insight::InsightStatus;

use crate::blocks::{BlockError, BlockHandler};
use crate::context::BlockContext;
use crate::result::BlockResult;

/// Confidence threshold when the node does not configure one.
const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Model name reported when the node does not configure one.
const DEFAULT_MODEL: &str = "ResNet50";

pub struct AiBlock;

#[async_trait]
impl BlockHandler for AiBlock {
    async fn execute(&self, ctx: &BlockContext<'_>) -> Result<BlockResult, BlockError> {
        if ctx.scans.is_empty() {
            return Ok(BlockResult::skipped("No scans to analyze"));
        }

        let model = ctx.str_or("model_name", DEFAULT_MODEL).to_string();
        let threshold = ctx.f64_or("confidence_threshold", DEFAULT_CONFIDENCE_THRESHOLD);

        let mut findings = Vec::new();
        for scan in ctx.scans {
            if let Some(inference) = ctx.services.latest_inference(scan.id).await? {
                let confidence = inference.confidence.unwrap_or(0.0);
                findings.push(serde_json::json!({
                    "scan_id": scan.id,
                    "model": model,
                    "label": inference.label,
                    "confidence": confidence,
                    "threshold_met": confidence >= threshold,
                }));
            }
        }

        let insight = ctx.services.generate_insights(ctx.emr_id, ctx.scans).await;
        let insight_text = match insight.status {
            InsightStatus::Completed => insight.insights,
            _ => None,
        };

        Ok(BlockResult::completed(serde_json::json!({
            "model_used": model,
            "scans_analyzed": findings.len(),
            "results": findings,
            "auto_report": ctx.bool_or("auto_report", false),
            "insights": insight_text,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::BlockStatus;
    use crate::test_support::{ctx, emr, inference, scan, StubServices};
    use assert_matches::assert_matches;
    use carelink_ai::insight::InsightOutcome;

    #[tokio::test]
    async fn skipped_when_patient_has_no_scans() {
        let services = StubServices::default();
        let patient = emr(1, "Jane Doe", Some(42));
        let config = serde_json::Map::new();

        let result = AiBlock
            .execute(&ctx(&patient, &[], &config, &services))
            .await
            .unwrap();

        assert_eq!(result.status, BlockStatus::Skipped);
        assert_eq!(result.data["reason"], "No scans to analyze");
    }

    #[tokio::test]
    async fn threshold_met_at_boundary_values() {
        let mut services = StubServices::default();
        services
            .inferences
            .insert(10, inference(100, 10, "possible pneumonia", 0.69999));
        services
            .inferences
            .insert(11, inference(101, 11, "possible pneumonia", 0.7));
        services
            .inferences
            .insert(12, inference(102, 12, "possible pneumonia", 0.70001));

        let patient = emr(1, "Jane Doe", Some(42));
        let scans = vec![
            scan(10, 1, "https://cdn.test/a.png", None),
            scan(11, 1, "https://cdn.test/b.png", None),
            scan(12, 1, "https://cdn.test/c.png", None),
        ];
        let config = serde_json::Map::new();

        let result = AiBlock
            .execute(&ctx(&patient, &scans, &config, &services))
            .await
            .unwrap();

        let findings = result.data["results"].as_array().unwrap();
        assert_eq!(findings.len(), 3);
        assert_eq!(findings[0]["threshold_met"], false);
        assert_eq!(findings[1]["threshold_met"], true);
        assert_eq!(findings[2]["threshold_met"], true);
    }

    #[tokio::test]
    async fn scans_without_inferences_are_not_counted() {
        let mut services = StubServices::default();
        services
            .inferences
            .insert(10, inference(100, 10, "artifact", 0.9));

        let patient = emr(1, "Jane Doe", Some(42));
        let scans = vec![
            scan(10, 1, "https://cdn.test/a.png", None),
            scan(11, 1, "https://cdn.test/b.png", None),
        ];
        let config = serde_json::Map::new();

        let result = AiBlock
            .execute(&ctx(&patient, &scans, &config, &services))
            .await
            .unwrap();

        assert_eq!(result.data["scans_analyzed"], 1);
    }

    #[tokio::test]
    async fn completed_insight_text_is_embedded() {
        let mut services = StubServices::default();
        services.insight = InsightOutcome::completed("Findings look stable.".to_string());

        let patient = emr(1, "Jane Doe", Some(42));
        let scans = vec![scan(10, 1, "https://cdn.test/a.png", None)];
        let config = serde_json::Map::new();

        let result = AiBlock
            .execute(&ctx(&patient, &scans, &config, &services))
            .await
            .unwrap();

        assert_eq!(result.data["insights"], "Findings look stable.");
    }

    #[tokio::test]
    async fn database_fault_propagates_to_the_engine() {
        let mut services = StubServices::default();
        services.fail_inference_lookup = true;

        let patient = emr(1, "Jane Doe", Some(42));
        let scans = vec![scan(10, 1, "https://cdn.test/a.png", None)];
        let config = serde_json::Map::new();

        let result = AiBlock
            .execute(&ctx(&patient, &scans, &config, &services))
            .await;

        assert_matches!(result, Err(BlockError::Database(_)));
    }
}
