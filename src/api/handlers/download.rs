//! Handler for the point time-series download endpoint.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::header,
    response::{IntoResponse, Response},
};
use tracing::{error, info};

use crate::api::dto::download::DownloadRequest;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the requested series as one CSV or a zip of CSVs.
///
/// # Endpoint
///
/// `POST /download`
///
/// # Request Body
///
/// ```json
/// {
///   "start_yr": 2020,
///   "end_yr": 2021,
///   "lat": 28.61,
///   "lon": 77.21,
///   "variables": ["rain", "tmax"]
/// }
/// ```
///
/// # Response
///
/// - One variable: `text/csv` attachment named `{variable}_{lat}_{lon}.csv`
/// - Several variables: `application/zip` attachment named `weather_data.zip`,
///   one entry per variable in request order
///
/// # Errors
///
/// - **400 Bad Request**: missing or malformed fields, unknown variable,
///   coordinate outside the supported grid
/// - **500 Internal Server Error**: download, extraction or packaging failure
///
/// Both carry `{"error": "<message>"}`. No files are left in the output
/// directory either way.
pub async fn download_handler(
    State(state): State<AppState>,
    payload: Result<Json<DownloadRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(payload) = payload?;
    let request = payload.into_retrieval_request()?;

    let payload = state
        .retrieval_service
        .retrieve(request)
        .await
        .inspect_err(|e| match e {
            AppError::Internal(msg) => error!("Download failed: {}", msg),
            other => info!("Download rejected: {}", other),
        })?;

    let disposition = format!("attachment; filename=\"{}\"", payload.file_name());
    let content_type = payload.content_type();

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        payload.into_bytes(),
    )
        .into_response())
}
