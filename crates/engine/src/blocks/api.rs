//! API block: calls an external HTTP endpoint configured on the node.
//!
//! Transport faults are expected failures here: they become a `failed`
//! result on the node, never an engine-level fault.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;

use crate::blocks::{BlockError, BlockHandler};
use crate::context::BlockContext;
use crate::result::BlockResult;

/// HTTP request timeout for the configured endpoint.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct ApiBlock {
    client: reqwest::Client,
}

impl ApiBlock {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { client }
    }
}

impl Default for ApiBlock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlockHandler for ApiBlock {
    async fn execute(&self, ctx: &BlockContext<'_>) -> Result<BlockResult, BlockError> {
        let Some(url) = ctx.config.get("url").and_then(serde_json::Value::as_str) else {
            return Ok(BlockResult::skipped("No URL configured"));
        };

        let method = ctx.str_or("method", "POST").to_uppercase();
        let method = Method::from_bytes(method.as_bytes()).unwrap_or(Method::POST);

        let outcome = async {
            let response = self
                .client
                .request(method.clone(), url)
                .send()
                .await?;
            let status = response.status().as_u16();
            let data: serde_json::Value = response.json().await?;
            Ok::<_, reqwest::Error>((status, data))
        }
        .await;

        match outcome {
            Ok((status, data)) => Ok(BlockResult::completed(serde_json::json!({
                "endpoint": url,
                "method": method.as_str(),
                "response_status": status,
                "response_data": data,
            }))),
            Err(e) => {
                tracing::warn!(url, error = %e, "API block call failed");
                Ok(BlockResult::failed(serde_json::json!({
                    "endpoint": url,
                    "error": e.to_string(),
                })))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::BlockStatus;
    use crate::test_support::{ctx, emr, StubServices};

    #[tokio::test]
    async fn skipped_without_a_url() {
        let services = StubServices::default();
        let patient = emr(1, "Jane Doe", Some(42));
        let config = serde_json::Map::new();

        let result = ApiBlock::new()
            .execute(&ctx(&patient, &[], &config, &services))
            .await
            .unwrap();

        assert_eq!(result.status, BlockStatus::Skipped);
        assert_eq!(result.data["reason"], "No URL configured");
    }

    #[tokio::test]
    async fn unreachable_endpoint_fails_the_node_not_the_engine() {
        let services = StubServices::default();
        let patient = emr(1, "Jane Doe", Some(42));
        let mut config = serde_json::Map::new();
        // Reserved TEST-NET-1 address: connection refused or unroutable.
        config.insert(
            "url".to_string(),
            serde_json::json!("http://192.0.2.1:9/hook"),
        );

        let result = ApiBlock::new()
            .execute(&ctx(&patient, &[], &config, &services))
            .await
            .unwrap();

        assert_eq!(result.status, BlockStatus::Failed);
        assert_eq!(result.data["endpoint"], "http://192.0.2.1:9/hook");
        assert!(result.data["error"].as_str().is_some());
    }
}
