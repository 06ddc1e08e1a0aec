//! API route configuration.

use axum::{
    Router,
    routing::{get, post},
};

use crate::api::handlers::{download_handler, health_handler, variables_handler};
use crate::state::AppState;

/// All public routes.
///
/// # Endpoints
///
/// - `POST /download`   - Point time series as CSV or zip
/// - `GET  /variables`  - Variable catalog
/// - `GET  /health`     - Output directory check
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/download", post(download_handler))
        .route("/variables", get(variables_handler))
        .route("/health", get(health_handler))
}
