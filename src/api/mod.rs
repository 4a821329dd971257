//! API module
//!
//! HTTP API endpoints and middleware.

pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::{middleware as axum_middleware, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::service::LedgerService;
use crate::storage::AccountStore;

pub use routes::{create_router, AppState};

/// Build the application router over a ledger service.
///
/// Layers run top to bottom: tracing, correlation id, request logging.
pub fn build_router<S: AccountStore>(ledger: Arc<LedgerService<S>>) -> Router {
    create_router::<S>()
        .route("/health", get(health_check))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum_middleware::from_fn(middleware::correlation_middleware))
                .layer(axum_middleware::from_fn(middleware::logging_middleware)),
        )
        .with_state(ledger)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
