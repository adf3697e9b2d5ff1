//! The engine's seam to the outside world.
//!
//! [`EngineServices`] bundles every side effect a block may perform:
//! database reads for the patient snapshot and inference history,
//! fire-and-forget notification dispatch, and insight generation. The
//! production implementation [`PgEngineServices`] wires the repositories,
//! the notification dispatcher, and the insight client; tests substitute
//! an in-memory stub.

use std::sync::Arc;

use async_trait::async_trait;
use carelink_ai::insight::{InsightClient, InsightOutcome};
use carelink_core::types::DbId;
use carelink_db::models::emr::Emr;
use carelink_db::models::inference::Inference;
use carelink_db::models::scan::Scan;
use carelink_db::repositories::{EmrRepo, InferenceRepo, ScanRepo};
use carelink_db::DbPool;
use carelink_notify::{NotificationDispatcher, NotificationMessage};
use tokio::task::JoinHandle;

/// Side-effect and data-access surface available to block handlers.
#[async_trait]
pub trait EngineServices: Send + Sync {
    /// Load the patient snapshot. `Ok(None)` means the record is absent,
    /// which fails the whole execution; `Err` is a provider fault.
    async fn load_emr(&self, emr_id: DbId) -> Result<Option<Emr>, sqlx::Error>;

    /// Load all scans for a patient, newest upload first.
    async fn load_scans(&self, emr_id: DbId) -> Result<Vec<Scan>, sqlx::Error>;

    /// The effective current inference for a scan, if any.
    async fn latest_inference(&self, scan_id: DbId) -> Result<Option<Inference>, sqlx::Error>;

    /// Hand a notification to the dispatcher as a detached task.
    ///
    /// The returned handle is the explicit fire-and-forget contract: the
    /// engine never awaits it, and the task's completion only affects the
    /// email audit log, never the node result that triggered it.
    fn dispatch_notification(&self, message: NotificationMessage) -> JoinHandle<bool>;

    /// Generate a narrative insight over the given scans. Degrades to a
    /// skipped/failed outcome instead of erroring.
    async fn generate_insights(&self, emr_id: DbId, scans: &[Scan]) -> InsightOutcome;
}

/// Production services backed by Postgres, the notification dispatcher,
/// and the generative insight client.
pub struct PgEngineServices {
    pool: DbPool,
    dispatcher: Arc<NotificationDispatcher>,
    insights: Arc<InsightClient>,
}

impl PgEngineServices {
    pub fn new(
        pool: DbPool,
        dispatcher: Arc<NotificationDispatcher>,
        insights: Arc<InsightClient>,
    ) -> Self {
        Self {
            pool,
            dispatcher,
            insights,
        }
    }
}

#[async_trait]
impl EngineServices for PgEngineServices {
    async fn load_emr(&self, emr_id: DbId) -> Result<Option<Emr>, sqlx::Error> {
        EmrRepo::find_by_id(&self.pool, emr_id).await
    }

    async fn load_scans(&self, emr_id: DbId) -> Result<Vec<Scan>, sqlx::Error> {
        ScanRepo::list_for_emr(&self.pool, emr_id).await
    }

    async fn latest_inference(&self, scan_id: DbId) -> Result<Option<Inference>, sqlx::Error> {
        InferenceRepo::latest_for_scan(&self.pool, scan_id).await
    }

    fn dispatch_notification(&self, message: NotificationMessage) -> JoinHandle<bool> {
        let dispatcher = Arc::clone(&self.dispatcher);
        tokio::spawn(async move { dispatcher.send(&message).await })
    }

    async fn generate_insights(&self, emr_id: DbId, scans: &[Scan]) -> InsightOutcome {
        self.insights.generate(emr_id, scans).await
    }
}
