//! Handlers for patient record resources.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use carelink_core::error::CoreError;
use carelink_core::types::DbId;
use carelink_db::models::emr::{CreateEmr, Emr};
use carelink_db::models::inference::Inference;
use carelink_db::models::scan::Scan;
use carelink_db::repositories::{EmrRepo, InferenceRepo, ScanRepo};
use serde::Serialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// One scan with its full inference history, newest first.
#[derive(Debug, Serialize)]
pub struct ScanWithInferences {
    #[serde(flatten)]
    pub scan: Scan,
    pub inferences: Vec<Inference>,
}

/// Patient record detail: demographics plus every scan and its history.
#[derive(Debug, Serialize)]
pub struct EmrDetail {
    pub emr: Emr,
    pub scans: Vec<ScanWithInferences>,
}

/// POST /api/v1/emr
///
/// Create a patient record. Returns 201 with the full row.
async fn create_emr(
    State(state): State<AppState>,
    Json(input): Json<CreateEmr>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let emr = EmrRepo::create(&state.pool, &input).await?;

    tracing::info!(emr_id = emr.id, "Patient record created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: emr })))
}

/// GET /api/v1/emrs
///
/// List all patient records, newest first.
async fn list_emrs(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let emrs = EmrRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: emrs }))
}

/// GET /api/v1/emr/{id}
///
/// Patient record with scans and per-scan inference history.
async fn get_emr(
    State(state): State<AppState>,
    Path(emr_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let emr = EmrRepo::find_by_id(&state.pool, emr_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "EMR",
            id: emr_id,
        }))?;

    let mut scans = Vec::new();
    for scan in ScanRepo::list_for_emr(&state.pool, emr_id).await? {
        let inferences = InferenceRepo::list_for_scan(&state.pool, scan.id).await?;
        scans.push(ScanWithInferences { scan, inferences });
    }

    Ok(Json(DataResponse {
        data: EmrDetail { emr, scans },
    }))
}

/// Mount patient record routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/emr", post(create_emr))
        .route("/emrs", get(list_emrs))
        .route("/emr/{id}", get(get_emr))
}
