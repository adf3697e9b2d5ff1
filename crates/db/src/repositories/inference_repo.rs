//! Repository for the `inferences` table.

use carelink_core::types::DbId;
use sqlx::PgPool;

use crate::models::inference::Inference;

/// Column list for `inferences` queries.
const COLUMNS: &str = "id, scan_id, label, confidence, created_at";

/// Provides CRUD operations for scan inferences.
pub struct InferenceRepo;

impl InferenceRepo {
    /// Insert an inference for a scan, returning the full row.
    pub async fn create(
        pool: &PgPool,
        scan_id: DbId,
        label: &str,
        confidence: f64,
    ) -> Result<Inference, sqlx::Error> {
        let query = format!(
            "INSERT INTO inferences (scan_id, label, confidence) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Inference>(&query)
            .bind(scan_id)
            .bind(label)
            .bind(confidence)
            .fetch_one(pool)
            .await
    }

    /// The effective current inference for a scan.
    ///
    /// Ties on `created_at` are broken by the higher id, so the result is
    /// deterministic. Every caller that wants "the" inference goes through
    /// this method; there is no load-all-take-first variant.
    pub async fn latest_for_scan(
        pool: &PgPool,
        scan_id: DbId,
    ) -> Result<Option<Inference>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM inferences \
             WHERE scan_id = $1 \
             ORDER BY created_at DESC, id DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, Inference>(&query)
            .bind(scan_id)
            .fetch_optional(pool)
            .await
    }

    /// Full inference history for a scan, newest first.
    pub async fn list_for_scan(pool: &PgPool, scan_id: DbId) -> Result<Vec<Inference>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM inferences \
             WHERE scan_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Inference>(&query)
            .bind(scan_id)
            .fetch_all(pool)
            .await
    }
}
