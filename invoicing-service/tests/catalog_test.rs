//! Seeded catalog endpoints.

mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn products_are_seeded_in_id_order() {
    let app = TestApp::spawn().await;

    let (status, _, body) = app.get("/invoices/products").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"products": [
            {"id": 1, "name": "Widget A", "price": 10.0},
            {"id": 2, "name": "Widget B", "price": 15.5},
            {"id": 3, "name": "Service C", "price": 50.0},
        ]})
    );
}

#[tokio::test]
async fn clients_are_seeded_in_id_order() {
    let app = TestApp::spawn().await;

    let (status, _, body) = app.get("/invoices/clients").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"clients": [
            {"id": 1, "name": "Alice", "address": "123 Main St", "registration_no": "REG-001"},
            {"id": 2, "name": "Bob Inc", "address": "456 Oak Ave", "registration_no": "REG-002"},
        ]})
    );
}
