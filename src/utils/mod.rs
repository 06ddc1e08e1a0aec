//! Filesystem and packaging helpers used by the retrieval service.
//!
//! - [`workspace`] - Per-request scratch directories, glob discovery and cleanup
//! - [`archive`] - In-memory zip construction
//! - [`request_id`] - Random identifiers for scratch directories

pub mod archive;
pub mod request_id;
pub mod workspace;
