//! Shared state injected into every handler.

use std::sync::Arc;

use crate::application::services::RetrievalService;

#[derive(Clone)]
pub struct AppState {
    pub retrieval_service: Arc<RetrievalService>,
}

impl AppState {
    pub fn new(retrieval_service: Arc<RetrievalService>) -> Self {
        Self { retrieval_service }
    }
}
