//! # IMD Grid Service
//!
//! HTTP service that turns IMD (India Meteorological Department) gridded
//! climate data into point time series, built with Axum.
//!
//! ## Architecture
//!
//! This crate follows Clean Architecture principles with clear layer separation:
//!
//! - **Domain Layer** ([`domain`]) - Request entities and the grid source traits
//! - **Application Layer** ([`application`]) - Retrieval orchestration
//! - **Infrastructure Layer** ([`infrastructure`]) - IMD download and grid decoding
//! - **API Layer** ([`api`]) - REST API handlers, DTOs, and middleware
//!
//! ## Features
//!
//! - `POST /download` returns one CSV, or `weather_data.zip` for several variables
//! - Nearest-cell extraction for rain, tmax and tmin
//! - Per-request scratch directories, removed on every exit path
//! - Retried downloads with exponential backoff
//!
//! ## Quick Start
//!
//! ```bash
//! export PORT=5000
//! export OUTPUT_DIR=/var/tmp/imd
//!
//! cargo run
//!
//! curl -X POST localhost:5000/download \
//!   -H 'Content-Type: application/json' \
//!   -d '{"start_yr":2020,"end_yr":2020,"lat":28.6,"lon":77.2,"variables":["rain"]}' \
//!   -o rain.csv
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod utils;

pub mod config;
pub mod server;

pub mod routes;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::RetrievalService;
    pub use crate::domain::entities::{DownloadPayload, RetrievalRequest, VariableInfo, YearRange};
    pub use crate::domain::sources::{GridError, GridSource, PointDataset};
    pub use crate::error::AppError;
    pub use crate::state::AppState;
}
