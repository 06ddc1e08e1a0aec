//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `POST /download`   - Point time series (CSV or zip)
//! - `GET  /variables`  - Variable catalog
//! - `GET  /health`     - Health check
//!
//! # Middleware
//!
//! - **Panic recovery** - JSON 500 instead of a dropped connection
//! - **CORS** - Any origin
//! - **Tracing** - Structured request/response logging
//! - **Path normalization** - Trailing slash handling

use axum::Router;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

use crate::api;
use crate::api::middleware::{cors, panic, tracing};
use crate::state::AppState;

/// Routes with state and middleware applied, before path normalization.
pub fn router(state: AppState) -> Router {
    api::routes::routes()
        .with_state(state)
        .layer(panic::layer())
        .layer(cors::layer())
        .layer(tracing::layer())
}

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}
