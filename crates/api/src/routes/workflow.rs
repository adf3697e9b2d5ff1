//! Workflow definition and execution handlers.
//!
//! Saving stores the graph document verbatim; executing creates a
//! `queued` execution row, hands it to the in-process queue when one is
//! running, and returns immediately; callers poll
//! `/workflow/execution/{id}` for the terminal status, logs, and result.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use carelink_core::error::CoreError;
use carelink_core::types::DbId;
use carelink_db::models::workflow::CreateWorkflow;
use carelink_db::repositories::{ExecutionRepo, WorkflowRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/workflow
///
/// Save a workflow graph. The payload is stored exactly as received.
async fn create_workflow(
    State(state): State<AppState>,
    Json(input): Json<CreateWorkflow>,
) -> AppResult<impl IntoResponse> {
    if input.payload.is_null() {
        return Err(AppError::BadRequest("payload required".into()));
    }

    let workflow = WorkflowRepo::create(&state.pool, &input).await?;

    tracing::info!(workflow_id = workflow.id, "Workflow saved");

    Ok((StatusCode::CREATED, Json(DataResponse { data: workflow })))
}

/// GET /api/v1/workflows
///
/// List workflow summaries, newest first.
async fn list_workflows(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let workflows = WorkflowRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: workflows }))
}

/// GET /api/v1/workflow/{id}
///
/// Fetch one workflow including its payload.
async fn get_workflow(
    State(state): State<AppState>,
    Path(workflow_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let workflow = WorkflowRepo::find_by_id(&state.pool, workflow_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Workflow",
            id: workflow_id,
        }))?;

    Ok(Json(DataResponse { data: workflow }))
}

/// DELETE /api/v1/workflow/{id}
///
/// Delete a workflow. Returns 204 on success.
async fn delete_workflow(
    State(state): State<AppState>,
    Path(workflow_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = WorkflowRepo::delete(&state.pool, workflow_id).await?;

    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Workflow",
            id: workflow_id,
        }));
    }

    tracing::info!(workflow_id, "Workflow deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Request body for enqueuing an execution.
#[derive(Debug, Deserialize)]
pub struct ExecuteWorkflow {
    pub emr_id: Option<DbId>,
}

/// POST /api/v1/workflow/{id}/execute
///
/// Enqueue a run of this workflow against a patient. Returns 202 with the
/// queued execution row; node-level and delivery-level failures never
/// surface here; poll the execution for them.
async fn execute_workflow(
    State(state): State<AppState>,
    Path(workflow_id): Path<DbId>,
    Json(input): Json<ExecuteWorkflow>,
) -> AppResult<impl IntoResponse> {
    WorkflowRepo::find_by_id(&state.pool, workflow_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Workflow",
            id: workflow_id,
        }))?;

    let execution = ExecutionRepo::create(&state.pool, workflow_id, input.emr_id).await?;

    // The row is durable already; handing it to the in-process queue is
    // best-effort. If the queue is gone (shutdown) or absent (external
    // worker deployment), the row stays `queued` for a worker to claim.
    if let Some(queue) = &state.queue {
        if !queue.enqueue(execution.id) {
            tracing::warn!(
                execution_id = execution.id,
                "In-process queue not accepting, execution left queued"
            );
        }
    }

    tracing::info!(
        workflow_id,
        execution_id = execution.id,
        emr_id = input.emr_id,
        "Execution enqueued"
    );

    Ok((StatusCode::ACCEPTED, Json(DataResponse { data: execution })))
}

/// GET /api/v1/workflow/execution/{id}
///
/// Current status, logs, and result of one execution.
async fn get_execution(
    State(state): State<AppState>,
    Path(execution_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let execution = ExecutionRepo::find_by_id(&state.pool, execution_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Execution",
            id: execution_id,
        }))?;

    Ok(Json(DataResponse { data: execution }))
}

/// Mount workflow routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/workflow", post(create_workflow))
        .route("/workflows", get(list_workflows))
        .route(
            "/workflow/{id}",
            get(get_workflow).delete(delete_workflow),
        )
        .route("/workflow/{id}/execute", post(execute_workflow))
        .route("/workflow/execution/{id}", get(get_execution))
}
