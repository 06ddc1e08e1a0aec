//! Handler for health check endpoint.

use std::path::Path;

use axum::{Json, extract::State, http::StatusCode};
use tokio::fs;
use tracing::warn;

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;
use crate::utils::request_id::generate_request_id;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: The output directory is usable
/// - **503 Service Unavailable**: Scratch files cannot be written
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "output_dir": {
///       "status": "ok",
///       "message": "Writable: /srv/imd/output"
///     }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let output_check = check_output_dir(state.retrieval_service.output_dir()).await;
    let healthy = output_check.is_ok();

    let response = HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            output_dir: output_check,
        },
    };

    if healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

/// Creates the directory if needed and writes then removes a marker file.
async fn check_output_dir(dir: &Path) -> CheckStatus {
    if let Err(e) = fs::create_dir_all(dir).await {
        return CheckStatus::error(format!("Cannot create {}: {}", dir.display(), e));
    }

    let marker = dir.join(format!(".health-{}", generate_request_id()));
    if let Err(e) = fs::write(&marker, b"ok").await {
        return CheckStatus::error(format!("Not writable: {}: {}", dir.display(), e));
    }
    discard_marker(&marker).await;

    CheckStatus::ok(format!("Writable: {}", dir.display()))
}

/// Removes the health marker file. A failure is logged, not reported.
async fn discard_marker(marker: &Path) -> bool {
    match fs::remove_file(marker).await {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to delete health marker {}: {}", marker.display(), e);
            false
        }
    }
}
