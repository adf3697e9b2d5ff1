use std::sync::Arc;

use carelink_ai::inference::InferenceClient;
use carelink_engine::ExecutionQueue;
use carelink_store::ObjectStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: carelink_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Object store for scan uploads; `None` when not configured.
    pub store: Option<Arc<ObjectStore>>,
    /// Scan classification client (external service or local mock).
    pub inference: Arc<InferenceClient>,
    /// In-process execution queue; `None` when an external worker fleet
    /// claims executions from the database instead.
    pub queue: Option<Arc<ExecutionQueue>>,
}
