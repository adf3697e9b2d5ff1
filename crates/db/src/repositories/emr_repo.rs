//! Repository for the `emr` table.

use carelink_core::types::DbId;
use sqlx::PgPool;

use crate::models::emr::{CreateEmr, Emr};

/// Column list for `emr` queries.
const COLUMNS: &str = "id, patient_name, age, notes, created_at";

/// Provides CRUD operations for patient records.
pub struct EmrRepo;

impl EmrRepo {
    /// Create a patient record, returning the full row.
    pub async fn create(pool: &PgPool, input: &CreateEmr) -> Result<Emr, sqlx::Error> {
        let query = format!(
            "INSERT INTO emr (patient_name, age, notes) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Emr>(&query)
            .bind(&input.patient_name)
            .bind(input.age)
            .bind(&input.notes)
            .fetch_one(pool)
            .await
    }

    /// Find a patient record by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Emr>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM emr WHERE id = $1");
        sqlx::query_as::<_, Emr>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all patient records, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Emr>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM emr ORDER BY created_at DESC");
        sqlx::query_as::<_, Emr>(&query).fetch_all(pool).await
    }
}
