//! In-memory service stub and fixture builders shared by unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use carelink_ai::insight::InsightOutcome;
use carelink_core::types::DbId;
use carelink_db::models::emr::Emr;
use carelink_db::models::inference::Inference;
use carelink_db::models::scan::Scan;
use carelink_notify::NotificationMessage;
use chrono::Utc;
use tokio::task::JoinHandle;

use crate::context::BlockContext;
use crate::services::EngineServices;

/// [`EngineServices`] implementation backed by plain collections.
pub(crate) struct StubServices {
    pub emr: Option<Emr>,
    pub scans: Vec<Scan>,
    /// Latest inference per scan id.
    pub inferences: HashMap<DbId, Inference>,
    pub insight: InsightOutcome,
    /// Every message handed to `dispatch_notification`.
    pub dispatched: Arc<Mutex<Vec<NotificationMessage>>>,
    /// Force `latest_inference` to fail, exercising the propagation path.
    pub fail_inference_lookup: bool,
}

impl Default for StubServices {
    fn default() -> Self {
        Self {
            emr: None,
            scans: Vec::new(),
            inferences: HashMap::new(),
            insight: InsightOutcome::skipped("API key not configured"),
            dispatched: Arc::new(Mutex::new(Vec::new())),
            fail_inference_lookup: false,
        }
    }
}

#[async_trait]
impl EngineServices for StubServices {
    async fn load_emr(&self, _emr_id: DbId) -> Result<Option<Emr>, sqlx::Error> {
        Ok(self.emr.clone())
    }

    async fn load_scans(&self, _emr_id: DbId) -> Result<Vec<Scan>, sqlx::Error> {
        Ok(self.scans.clone())
    }

    async fn latest_inference(&self, scan_id: DbId) -> Result<Option<Inference>, sqlx::Error> {
        if self.fail_inference_lookup {
            return Err(sqlx::Error::PoolClosed);
        }
        Ok(self.inferences.get(&scan_id).cloned())
    }

    fn dispatch_notification(&self, message: NotificationMessage) -> JoinHandle<bool> {
        self.dispatched.lock().unwrap().push(message);
        tokio::spawn(async { false })
    }

    async fn generate_insights(&self, _emr_id: DbId, _scans: &[Scan]) -> InsightOutcome {
        self.insight.clone()
    }
}

pub(crate) fn emr(id: DbId, name: &str, age: Option<i32>) -> Emr {
    Emr {
        id,
        patient_name: name.to_string(),
        age,
        notes: None,
        created_at: Utc::now(),
    }
}

pub(crate) fn scan(id: DbId, emr_id: DbId, file_url: &str, file_size: Option<i64>) -> Scan {
    Scan {
        id,
        emr_id,
        file_url: file_url.to_string(),
        file_size,
        uploaded_at: Utc::now(),
    }
}

pub(crate) fn inference(id: DbId, scan_id: DbId, label: &str, confidence: f64) -> Inference {
    Inference {
        id,
        scan_id,
        label: Some(label.to_string()),
        confidence: Some(confidence),
        created_at: Utc::now(),
    }
}

/// Build a [`BlockContext`] over borrowed fixtures.
pub(crate) fn ctx<'a>(
    emr: &'a Emr,
    scans: &'a [Scan],
    config: &'a serde_json::Map<String, serde_json::Value>,
    services: &'a StubServices,
) -> BlockContext<'a> {
    BlockContext {
        emr,
        scans,
        config,
        emr_id: emr.id,
        execution_id: Some(1),
        services,
    }
}
