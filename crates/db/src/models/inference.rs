//! Inference entity model.

use carelink_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `inferences` table.
///
/// Multiple inferences may exist per scan (history); the effective current
/// one is selected by `InferenceRepo::latest_for_scan`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Inference {
    pub id: DbId,
    pub scan_id: DbId,
    pub label: Option<String>,
    /// Classifier confidence in `[0.0, 1.0]`.
    pub confidence: Option<f64>,
    pub created_at: Timestamp,
}
