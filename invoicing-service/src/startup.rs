//! Application startup and lifecycle management.

use crate::config::InvoicingConfig;
use crate::handlers;
use crate::middleware::metrics_middleware;
use crate::services::Database;
use axum::{middleware::from_fn, routing::get, Router};
use service_core::error::AppError;
use tokio::net::TcpListener;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: InvoicingConfig,
}

/// Build the HTTP router with its middleware stack.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .route("/metrics", get(handlers::health::metrics))
        .route(
            "/invoices",
            get(handlers::invoices::list_invoices).post(handlers::invoices::create_invoice),
        )
        .route("/invoices/products", get(handlers::catalog::list_products))
        .route("/invoices/clients", get(handlers::catalog::list_clients))
        .route(
            "/invoices/:id",
            get(handlers::invoices::get_invoice).delete(handlers::invoices::delete_invoice),
        )
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Connect the database (migrating it if configured) and bind the listener.
    pub async fn build(config: InvoicingConfig) -> Result<Self, AppError> {
        let db = Database::new(config.database.db_config()).await?;

        // Port 0 binds a random port, used by tests.
        let addr = config.common.bind_address();
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(port, "Invoicing service bound");

        Ok(Self {
            port,
            listener,
            state: AppState { db, config },
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve HTTP until the listener fails or the task is cancelled.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);

        tracing::info!("Listening on port {}", self.port);
        axum::serve(self.listener, router).await.map_err(|e| {
            tracing::error!("HTTP server error: {}", e);
            std::io::Error::other(format!("HTTP server error: {}", e))
        })
    }
}
