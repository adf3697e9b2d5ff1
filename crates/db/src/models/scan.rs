//! Scan entity model.

use carelink_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `scans` table.
///
/// `file_url` points at the object-store location produced by the upload
/// path; `file_size` is in bytes and may be absent for scans imported
/// before size tracking existed.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Scan {
    pub id: DbId,
    pub emr_id: DbId,
    pub file_url: String,
    pub file_size: Option<i64>,
    pub uploaded_at: Timestamp,
}
