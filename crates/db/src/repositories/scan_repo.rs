//! Repository for the `scans` table.

use carelink_core::types::DbId;
use sqlx::PgPool;

use crate::models::scan::Scan;

/// Column list for `scans` queries.
const COLUMNS: &str = "id, emr_id, file_url, file_size, uploaded_at";

/// Provides CRUD operations for uploaded scans.
pub struct ScanRepo;

impl ScanRepo {
    /// Insert a scan row for a patient, returning the full row.
    pub async fn create(
        pool: &PgPool,
        emr_id: DbId,
        file_url: &str,
        file_size: Option<i64>,
    ) -> Result<Scan, sqlx::Error> {
        let query = format!(
            "INSERT INTO scans (emr_id, file_url, file_size) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Scan>(&query)
            .bind(emr_id)
            .bind(file_url)
            .bind(file_size)
            .fetch_one(pool)
            .await
    }

    /// List all scans for a patient, newest upload first.
    pub async fn list_for_emr(pool: &PgPool, emr_id: DbId) -> Result<Vec<Scan>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM scans \
             WHERE emr_id = $1 \
             ORDER BY uploaded_at DESC, id DESC"
        );
        sqlx::query_as::<_, Scan>(&query)
            .bind(emr_id)
            .fetch_all(pool)
            .await
    }
}
