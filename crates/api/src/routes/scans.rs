//! Scan upload and classification handlers.

use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use carelink_ai::inference::InferencePrediction;
use carelink_core::error::CoreError;
use carelink_core::types::DbId;
use carelink_db::repositories::{EmrRepo, InferenceRepo, ScanRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Upload size cap: scans above 10 MB are rejected at the body layer.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Content types accepted for scan uploads.
const ALLOWED_CONTENT_TYPES: [&str; 2] = ["image/png", "image/jpeg"];

/// Response for a completed upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub scan_id: DbId,
    pub file_url: String,
    pub inference: InferencePrediction,
}

/// POST /api/v1/upload/{emr_id}
///
/// Multipart upload of one scan image (field name `scan`). The bytes go
/// to the object store, a scan row is recorded, and a classification is
/// requested and stored immediately so the workflow blocks have an
/// inference to read.
async fn upload_scan(
    State(state): State<AppState>,
    Path(emr_id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    EmrRepo::find_by_id(&state.pool, emr_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "EMR",
            id: emr_id,
        }))?;

    let Some(store) = &state.store else {
        return Err(AppError::InternalError(
            "Object storage is not configured".into(),
        ));
    };

    // Find the `scan` field.
    let mut upload: Option<(String, String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some("scan") {
            continue;
        }

        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let file_name = field.file_name().unwrap_or("scan").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {e}")))?;

        upload = Some((content_type, file_name, bytes.to_vec()));
        break;
    }

    let Some((content_type, file_name, bytes)) = upload else {
        return Err(AppError::BadRequest(
            "file required under \"scan\" field".into(),
        ));
    };

    if !ALLOWED_CONTENT_TYPES.contains(&content_type.as_str()) {
        return Err(AppError::BadRequest(format!(
            "invalid file type {content_type}, expected image/png or image/jpeg"
        )));
    }

    let key = format!(
        "scans/{}-{}",
        chrono::Utc::now().timestamp_millis(),
        file_name
    );
    let file_size = bytes.len() as i64;
    let file_url = store
        .put_public(&key, bytes, &content_type)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    let scan = ScanRepo::create(&state.pool, emr_id, &file_url, Some(file_size)).await?;

    // Classify right away so the scan is never inference-less for long.
    let prediction = state.inference.predict(&file_url).await;
    InferenceRepo::create(&state.pool, scan.id, &prediction.label, prediction.confidence).await?;

    tracing::info!(emr_id, scan_id = scan.id, "Scan uploaded and classified");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UploadResponse {
                scan_id: scan.id,
                file_url,
                inference: prediction,
            },
        }),
    ))
}

/// Request body for ad-hoc classification.
#[derive(Debug, Deserialize)]
pub struct MockInferRequest {
    pub scan_url: Option<String>,
}

/// POST /api/v1/mock-infer
///
/// Classify an arbitrary scan URL. Useful for external callers and for
/// exercising the inference path without an upload.
async fn mock_infer(
    State(state): State<AppState>,
    Json(input): Json<MockInferRequest>,
) -> AppResult<impl IntoResponse> {
    let scan_url = input.scan_url.unwrap_or_default();
    let prediction = state.inference.predict(&scan_url).await;
    Ok(Json(DataResponse { data: prediction }))
}

/// Mount scan routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/upload/{emr_id}",
            post(upload_scan).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/mock-infer", post(mock_infer))
}
