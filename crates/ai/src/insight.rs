//! Narrative insight generation from scan metadata.
//!
//! [`InsightClient`] asks a generative text model for a short clinical
//! summary of a patient's scan history. The call degrades instead of
//! failing: no API key or no scans produce a `Skipped` outcome, transport
//! and API errors produce `Failed`, and the caller decides what (if
//! anything) to do with the text. [`InsightClient::generate`] never
//! returns an `Err`.

use std::time::Duration;

use carelink_core::types::DbId;
use carelink_db::models::scan::Scan;
use serde::Serialize;

/// HTTP request timeout for the generation call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Default generation endpoint.
const DEFAULT_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1/models/gemini-2.0-flash:generateContent";

/// Model identifier recorded on completed outcomes.
const MODEL_NAME: &str = "Gemini 2.0 Flash";

/// Text substituted when the model returns an empty candidate.
const EMPTY_PLACEHOLDER: &str = "No insights generated";

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Terminal status of one insight generation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightStatus {
    Completed,
    Skipped,
    Failed,
}

/// Result of one insight generation attempt.
#[derive(Debug, Clone, Serialize)]
pub struct InsightOutcome {
    pub status: InsightStatus,
    /// Generated narrative; present only when `status` is `Completed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insights: Option<String>,
    /// Why the attempt was skipped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Error text when `status` is `Failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Model identifier; present only when `status` is `Completed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl InsightOutcome {
    pub fn skipped(reason: &str) -> Self {
        Self {
            status: InsightStatus::Skipped,
            insights: None,
            reason: Some(reason.to_string()),
            error: None,
            model: None,
        }
    }

    pub fn failed(error: String) -> Self {
        Self {
            status: InsightStatus::Failed,
            insights: None,
            reason: None,
            error: Some(error),
            model: None,
        }
    }

    pub fn completed(insights: String) -> Self {
        Self {
            status: InsightStatus::Completed,
            insights: Some(insights),
            reason: None,
            error: None,
            model: Some(MODEL_NAME.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// InsightClient
// ---------------------------------------------------------------------------

/// Client for the generative insight service.
pub struct InsightClient {
    client: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
}

impl InsightClient {
    /// Create a client. With `api_key = None` every call is `Skipped`.
    pub fn new(api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            client,
            api_key,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    /// Create a client configured from the `GEMINI_API_KEY` env var.
    pub fn from_env() -> Self {
        Self::new(std::env::var("GEMINI_API_KEY").ok())
    }

    /// Generate a clinical-style summary for a patient's scans.
    pub async fn generate(&self, emr_id: DbId, scans: &[Scan]) -> InsightOutcome {
        let Some(api_key) = &self.api_key else {
            return InsightOutcome::skipped("API key not configured");
        };

        if scans.is_empty() {
            return InsightOutcome::skipped("No scans provided");
        }

        let prompt = build_prompt(emr_id, scans);
        tracing::debug!(emr_id, scan_count = scans.len(), "Requesting insight generation");

        let body = serde_json::json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }],
            "generationConfig": { "temperature": 0.7, "maxOutputTokens": 500 }
        });

        let response = match self
            .client
            .post(format!("{}?key={}", self.endpoint, api_key))
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(emr_id, error = %e, "Insight request failed");
                return InsightOutcome::failed(e.to_string());
            }
        };

        let status = response.status();
        let payload: serde_json::Value = match response.json().await {
            Ok(payload) => payload,
            Err(e) => return InsightOutcome::failed(e.to_string()),
        };

        if !status.is_success() {
            let message = payload["error"]["message"]
                .as_str()
                .unwrap_or("API request failed")
                .to_string();
            tracing::warn!(emr_id, status = status.as_u16(), error = %message, "Insight API error");
            return InsightOutcome::failed(message);
        }

        let insights =
            extract_candidate_text(&payload).unwrap_or_else(|| EMPTY_PLACEHOLDER.to_string());
        tracing::info!(emr_id, "Insight generated");
        InsightOutcome::completed(insights)
    }
}

/// Build the generation prompt from scan metadata.
fn build_prompt(emr_id: DbId, scans: &[Scan]) -> String {
    let summary = scans
        .iter()
        .map(|s| {
            format!(
                "Scan ID: {}, File: {}, Uploaded: {}",
                s.id, s.file_url, s.uploaded_at
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Analyze medical scans and provide brief clinical insights for EMR ID {emr_id}:\n\
         {summary}\n\n\
         Provide: 1) Key findings 2) Recommendations 3) Risk assessment"
    )
}

/// Pull the first candidate's text out of a generation response.
///
/// Returns `None` when the path is absent or the text is empty, so the
/// caller can substitute the placeholder.
fn extract_candidate_text(payload: &serde_json::Value) -> Option<String> {
    let text = payload["candidates"][0]["content"]["parts"][0]["text"].as_str()?;
    if text.is_empty() {
        return None;
    }
    Some(text.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn scan(id: DbId) -> Scan {
        Scan {
            id,
            emr_id: 1,
            file_url: format!("https://cdn.example.com/scans/{id}.png"),
            file_size: Some(2048),
            uploaded_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn skipped_without_api_key() {
        let client = InsightClient::new(None);
        let outcome = client.generate(1, &[scan(10)]).await;
        assert_eq!(outcome.status, InsightStatus::Skipped);
        assert_eq!(outcome.reason.as_deref(), Some("API key not configured"));
    }

    #[tokio::test]
    async fn skipped_without_scans() {
        let client = InsightClient::new(Some("test-key".to_string()));
        let outcome = client.generate(1, &[]).await;
        assert_eq!(outcome.status, InsightStatus::Skipped);
        assert_eq!(outcome.reason.as_deref(), Some("No scans provided"));
    }

    #[test]
    fn prompt_contains_every_scan() {
        let scans = [scan(10), scan(11)];
        let prompt = build_prompt(7, &scans);
        assert!(prompt.contains("EMR ID 7"));
        assert!(prompt.contains("Scan ID: 10"));
        assert!(prompt.contains("Scan ID: 11"));
    }

    #[test]
    fn extracts_first_candidate_text() {
        let payload = serde_json::json!({
            "candidates": [
                { "content": { "parts": [{ "text": "Findings look stable." }] } },
                { "content": { "parts": [{ "text": "second candidate" }] } },
            ]
        });
        assert_eq!(
            extract_candidate_text(&payload).as_deref(),
            Some("Findings look stable.")
        );
    }

    #[test]
    fn empty_or_missing_candidate_yields_none() {
        let empty = serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "" }] } }]
        });
        assert!(extract_candidate_text(&empty).is_none());

        let missing = serde_json::json!({ "candidates": [] });
        assert!(extract_candidate_text(&missing).is_none());
    }
}
