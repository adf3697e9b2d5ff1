//! Patient record (EMR) entity model and DTOs.

use carelink_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `emr` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Emr {
    pub id: DbId,
    pub patient_name: String,
    pub age: Option<i32>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for creating a patient record via `POST /emr`.
#[derive(Debug, Deserialize, validator::Validate)]
pub struct CreateEmr {
    #[validate(length(min = 1, message = "patient_name required"))]
    pub patient_name: String,
    #[validate(range(min = 0, max = 150))]
    pub age: Option<i32>,
    pub notes: Option<String>,
}
