//! Test helpers for invoicing-service integration tests.
//!
//! Each `TestApp` owns a private, freshly migrated in-memory SQLite database
//! and drives the router directly with `oneshot`.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use invoicing_service::{
    config::InvoicingConfig,
    services::{Database, DbConfig},
    startup::{build_router, AppState},
};
use serde_json::{json, Value};
use tower::util::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub db: Database,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let db = Database::new(DbConfig::in_memory())
            .await
            .expect("Failed to open in-memory database");

        let state = AppState {
            db: db.clone(),
            config: InvoicingConfig::in_memory(),
        };

        Self {
            router: build_router(state),
            db,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router failed to respond");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        (status, headers, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, HeaderMap, Value) {
        self.send(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn post_json(&self, uri: &str, body: &Value) -> (StatusCode, HeaderMap, Value) {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, HeaderMap, Value) {
        self.send(
            Request::builder()
                .method("DELETE")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Create an invoice and return its response body.
    pub async fn create_invoice(&self, body: &Value) -> Value {
        let (status, _, created) = self.post_json("/invoices", body).await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {}", created);
        created
    }

    pub async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(1) FROM {}", table))
            .fetch_one(self.db.pool())
            .await
            .expect("Failed to count rows")
    }
}

/// Invoice payload for client 1 with the given `(product_id, quantity)` lines.
pub fn invoice_payload(items: &[(i64, i64)]) -> Value {
    json!({
        "issue_date": "2025-01-01",
        "due_date": "2025-01-31",
        "client_id": 1,
        "items": items
            .iter()
            .map(|(product_id, quantity)| json!({"product_id": product_id, "quantity": quantity}))
            .collect::<Vec<_>>(),
    })
}
