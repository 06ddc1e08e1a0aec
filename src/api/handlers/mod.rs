//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod download;
pub mod health;
pub mod variables;

pub use download::download_handler;
pub use health::health_handler;
pub use variables::variables_handler;
