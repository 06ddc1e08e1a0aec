//! Handler for the variable catalog endpoint.

use axum::{Json, extract::State};

use crate::api::dto::variables::VariablesResponse;
use crate::state::AppState;

/// Lists the variables `POST /download` accepts.
///
/// # Endpoint
///
/// `GET /variables`
pub async fn variables_handler(State(state): State<AppState>) -> Json<VariablesResponse> {
    Json(state.retrieval_service.variables().into())
}
