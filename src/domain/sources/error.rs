//! Errors raised by grid sources.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GridError {
    #[error("Unknown variable '{0}'")]
    UnknownVariable(String),

    #[error("Year {year} is not available for '{variable}' (available: {first}-{last})")]
    YearOutOfRange {
        variable: String,
        year: i32,
        first: i32,
        last: i32,
    },

    #[error("Coordinate lat={lat}, lon={lon} lies outside the '{variable}' grid")]
    OutOfDomain { variable: String, lat: f64, lon: f64 },

    #[error("Grid file '{0}' has not been acquired")]
    MissingGrid(PathBuf),

    #[error("Invalid base URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Network request failed for {0}")]
    Network(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Malformed grid data for '{variable}' {year}: {reason}")]
    Format {
        variable: String,
        year: i32,
        reason: String,
    },

    #[error("I/O error on '{0}'")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Failed to write CSV '{0}'")]
    Csv(PathBuf, #[source] csv::Error),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl GridError {
    /// True when the failure is caused by what the caller asked for
    /// rather than by the source itself.
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownVariable(_)
                | Self::YearOutOfRange { .. }
                | Self::OutOfDomain { .. }
                | Self::MissingGrid(_)
        )
    }
}
