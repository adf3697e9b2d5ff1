//! Route tree.
//!
//! `/health` mounts at the root; everything else lives under `/api/v1`:
//!
//! ```text
//! /emr                          create patient record
//! /emrs                         list patient records
//! /emr/{id}                     patient record + scans + inference history
//!
//! /upload/{emr_id}              multipart scan upload (field name `scan`)
//! /mock-infer                   classify an arbitrary scan URL
//!
//! /workflow                     save a workflow graph
//! /workflows                    list workflow summaries
//! /workflow/{id}                fetch / delete one workflow
//! /workflow/{id}/execute        enqueue a run against a patient
//! /workflow/execution/{id}      poll status, logs, and result
//! ```

pub mod emr;
pub mod health;
pub mod scans;
pub mod workflow;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(emr::router())
        .merge(scans::router())
        .merge(workflow::router())
}
