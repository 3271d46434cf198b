use service_core::error::AppError;
use thiserror::Error;

/// Failures raised by invoice and catalog operations.
#[derive(Error, Debug)]
pub enum InvoiceError {
    #[error("Client not found")]
    ClientNotFound,

    #[error("Product {0} not found")]
    ProductNotFound(i64),

    #[error("Invoice not found")]
    InvoiceNotFound,

    #[error("{0}")]
    Database(#[from] sqlx::Error),
}

impl InvoiceError {
    /// Label used for the error counter.
    pub fn kind(&self) -> &'static str {
        match self {
            InvoiceError::ClientNotFound => "client_not_found",
            InvoiceError::ProductNotFound(_) => "product_not_found",
            InvoiceError::InvoiceNotFound => "invoice_not_found",
            InvoiceError::Database(_) => "database",
        }
    }
}

impl From<InvoiceError> for AppError {
    fn from(err: InvoiceError) -> Self {
        match err {
            InvoiceError::ClientNotFound | InvoiceError::ProductNotFound(_) => {
                AppError::BadRequest(anyhow::anyhow!(err.to_string()))
            }
            InvoiceError::InvoiceNotFound => AppError::NotFound(anyhow::anyhow!(err.to_string())),
            InvoiceError::Database(e) => AppError::DatabaseError(anyhow::Error::new(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn missing_references_are_bad_requests() {
        let err = AppError::from(InvoiceError::ProductNotFound(42));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.detail(), "Product 42 not found");

        let err = AppError::from(InvoiceError::ClientNotFound);
        assert_eq!(err.detail(), "Client not found");
    }

    #[test]
    fn missing_invoice_is_not_found() {
        let err = AppError::from(InvoiceError::InvoiceNotFound);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.detail(), "Invoice not found");
    }

    #[test]
    fn driver_failures_are_database_errors() {
        let err = AppError::from(InvoiceError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.detail().starts_with("Database error: "));
    }
}
