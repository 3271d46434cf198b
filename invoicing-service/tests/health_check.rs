//! Probe, metrics and request-id tests.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::TestApp;

#[tokio::test]
async fn health_check_works() {
    let app = TestApp::spawn().await;

    let (status, _, body) = app.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "invoicing-service-test");
}

#[tokio::test]
async fn ready_when_database_answers() {
    let app = TestApp::spawn().await;

    let (status, _, body) = app.get("/ready").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn not_ready_once_pool_is_closed() {
    let app = TestApp::spawn().await;
    app.db.pool().close().await;

    let (status, _, body) = app.get("/ready").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["detail"], "Database unavailable");
}

#[tokio::test]
async fn metrics_expose_request_counters() {
    let app = TestApp::spawn().await;
    app.get("/invoices").await;

    let (status, headers, body) = app.get("/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(headers["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
    assert!(body
        .as_str()
        .unwrap()
        .contains("invoicing_http_requests_total"));
}

#[tokio::test]
async fn request_id_is_generated() {
    let app = TestApp::spawn().await;

    let (_, headers, _) = app.get("/health").await;

    let id = headers["x-request-id"].to_str().unwrap();
    assert!(!id.is_empty());
}

#[tokio::test]
async fn request_id_is_echoed() {
    let app = TestApp::spawn().await;

    let (_, headers, _) = app
        .send(
            Request::builder()
                .uri("/invoices/products")
                .header("x-request-id", "trace-abc-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(headers["x-request-id"], "trace-abc-123");
}
