//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes for running ledger audits
//! - JSON error responses

pub mod error;
pub mod routes;

use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use keystone_core::audit::LedgerSource;
use keystone_shared::AuditConfig;

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Ledger store the audits read from.
    pub ledger: Arc<dyn LedgerSource>,
    /// Audit page size and time budget.
    pub audit: AuditConfig,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
