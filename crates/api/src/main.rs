use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use carelink_ai::inference::InferenceClient;
use carelink_ai::insight::InsightClient;
use carelink_api::config::ServerConfig;
use carelink_api::router::build_app_router;
use carelink_api::state::AppState;
use carelink_engine::{ExecutionQueue, ExecutionRunner, PgEngineServices};
use carelink_notify::NotificationDispatcher;
use carelink_store::{ObjectStore, StoreConfig};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "carelink_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = carelink_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    carelink_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    carelink_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Object store ---
    let store = StoreConfig::from_env().map(|cfg| Arc::new(ObjectStore::new(cfg)));
    if store.is_none() {
        tracing::warn!("Object storage not configured, scan uploads disabled");
    }

    // --- AI clients ---
    let inference = Arc::new(InferenceClient::from_env());
    let insights = Arc::new(InsightClient::from_env());

    // --- Notification dispatcher ---
    let dispatcher = Arc::new(NotificationDispatcher::from_env(pool.clone()));

    // --- Engine + in-process queue ---
    let services = Arc::new(PgEngineServices::new(
        pool.clone(),
        dispatcher,
        Arc::clone(&insights),
    ));
    let runner = Arc::new(ExecutionRunner::new(pool.clone(), services));

    let queue_cancel = CancellationToken::new();
    let (queue, queue_handle) = if config.inprocess_queue {
        let (queue, handle) = ExecutionQueue::start(runner, queue_cancel.clone());
        (Some(Arc::new(queue)), Some(handle))
    } else {
        tracing::info!("In-process queue disabled, external workers will claim executions");
        (None, None)
    };

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        store,
        inference,
        queue,
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    queue_cancel.cancel();
    if let Some(handle) = queue_handle {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
    }
    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
