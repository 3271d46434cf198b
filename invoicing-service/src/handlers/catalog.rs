use axum::{extract::State, Json};
use service_core::error::AppError;

use super::reject;
use crate::dtos::{ClientListResponse, ProductListResponse};
use crate::startup::AppState;

/// Seeded products, for reference lookups.
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<ProductListResponse>, AppError> {
    let products = state.db.list_products().await.map_err(reject)?;
    Ok(Json(ProductListResponse { products }))
}

/// Seeded clients, for reference lookups.
pub async fn list_clients(
    State(state): State<AppState>,
) -> Result<Json<ClientListResponse>, AppError> {
    let clients = state.db.list_clients().await.map_err(reject)?;
    Ok(Json(ClientListResponse { clients }))
}
