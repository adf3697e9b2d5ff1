//! Router and middleware behaviour without a live database.
//!
//! A lazily-connecting pool lets the full router come up; endpoints that
//! actually touch the database are exercised elsewhere. These tests pin
//! down the middleware stack: health shape, 404 behaviour, request-id
//! propagation.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use carelink_ai::inference::InferenceClient;
use carelink_api::config::ServerConfig;
use carelink_api::router::build_app_router;
use carelink_api::state::AppState;
use http_body_util::BodyExt;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 5,
        inprocess_queue: false,
    }
}

fn test_app() -> axum::Router {
    // Lazy pool: no connection is attempted until a query runs. The short
    // acquire timeout keeps the failing health probe well inside the
    // request timeout.
    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(200))
        .connect_lazy("postgres://localhost:1/carelink_unreachable")
        .expect("lazy pool construction cannot fail");

    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        store: None,
        inference: Arc::new(InferenceClient::new(None)),
        queue: None,
    };
    build_app_router(state, &config)
}

#[tokio::test]
async fn health_reports_degraded_when_db_is_unreachable() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["db_healthy"], false);
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/this-route-does-not-exist")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let request_id = response.headers().get("x-request-id");
    assert!(
        request_id.is_some(),
        "Response must contain an x-request-id header"
    );
}
