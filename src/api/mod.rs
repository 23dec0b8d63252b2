//! API module
//!
//! HTTP API endpoints and middleware.

pub mod middleware;
pub mod response;
pub mod routes;

use std::sync::Arc;

use axum::{middleware::from_fn, routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::TokenService;
use crate::error::AppError;
use crate::store::Store;

pub use response::{ApiResponse, Envelope};
pub use routes::create_router;

/// Shared state handed to every route
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, tokens: TokenService) -> Self {
        Self { store, tokens }
    }
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    // Axum layers run outermost-last: cors -> trace -> logging -> handler
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", create_router())
        .fallback(route_not_found)
        .layer(from_fn(middleware::logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

async fn route_not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}
