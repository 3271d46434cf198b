//! HTTP handlers for invoicing-service.

pub mod catalog;
pub mod health;
pub mod invoices;

use crate::services::{metrics::ERRORS_TOTAL, InvoiceError};
use service_core::error::AppError;

/// Count the failure and convert it for the HTTP boundary.
pub(crate) fn reject(err: InvoiceError) -> AppError {
    ERRORS_TOTAL.with_label_values(&[err.kind()]).inc();
    AppError::from(err)
}
