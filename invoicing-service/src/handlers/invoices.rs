//! Invoice handlers.

use axum::{extract::State, http::StatusCode, Json};
use service_core::error::AppError;

use super::reject;
use crate::{
    dtos::{CreateInvoiceRequest, InvoiceListResponse, InvoiceResponse, InvoiceSummary},
    extract::{ApiPath, ValidatedJson},
    services::metrics::INVOICES_TOTAL,
    startup::AppState,
};

/// Create an invoice with its items; the total is computed server-side.
#[tracing::instrument(skip(state, payload), fields(client_id = payload.client_id))]
pub async fn create_invoice(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateInvoiceRequest>,
) -> Result<(StatusCode, Json<InvoiceResponse>), AppError> {
    let created = state
        .db
        .create_invoice(&payload.into())
        .await
        .map_err(reject)?;

    INVOICES_TOTAL.with_label_values(&["created"]).inc();

    Ok((StatusCode::CREATED, Json(InvoiceResponse::from(created))))
}

/// List invoice headers, newest first.
pub async fn list_invoices(
    State(state): State<AppState>,
) -> Result<Json<InvoiceListResponse>, AppError> {
    let invoices = state.db.list_invoices().await.map_err(reject)?;

    Ok(Json(InvoiceListResponse {
        invoices: invoices.into_iter().map(InvoiceSummary::from).collect(),
    }))
}

/// Get one invoice with its items.
#[tracing::instrument(skip(state))]
pub async fn get_invoice(
    State(state): State<AppState>,
    ApiPath(invoice_id): ApiPath<i64>,
) -> Result<Json<InvoiceResponse>, AppError> {
    let invoice = state.db.get_invoice(invoice_id).await.map_err(reject)?;
    Ok(Json(InvoiceResponse::from(invoice)))
}

/// Delete an invoice and its items.
#[tracing::instrument(skip(state))]
pub async fn delete_invoice(
    State(state): State<AppState>,
    ApiPath(invoice_id): ApiPath<i64>,
) -> Result<StatusCode, AppError> {
    state.db.delete_invoice(invoice_id).await.map_err(reject)?;

    INVOICES_TOTAL.with_label_values(&["deleted"]).inc();

    Ok(StatusCode::NO_CONTENT)
}
