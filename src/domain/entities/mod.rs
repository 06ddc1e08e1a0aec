//! Core domain entities for point retrievals.
//!
//! Every entity here is request-scoped: nothing outlives the HTTP request
//! that created it.
//!
//! # Entity Types
//!
//! - [`RetrievalRequest`] - Validated year range, coordinate and variables
//! - [`YearRange`] - Inclusive span of years to acquire
//! - [`NormalizedCoordinate`] - Two-decimal coordinate used in file names
//! - [`DownloadPayload`] - In-memory CSV or zip returned to the caller
//! - [`VariableInfo`] - Catalog entry for a servable variable

pub mod coordinate;
pub mod payload;
pub mod retrieval;
pub mod variable;

pub use coordinate::NormalizedCoordinate;
pub use payload::{ARCHIVE_FILE_NAME, DownloadPayload};
pub use retrieval::{RetrievalRequest, YearRange};
pub use variable::VariableInfo;
