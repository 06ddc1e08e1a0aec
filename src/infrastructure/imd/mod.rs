//! IMD Pune gridded climate data.
//!
//! - [`client`] - HTTP downloads with retry
//! - [`grid`] - Variables and binary grid geometry
//! - [`dataset`] - Nearest-cell CSV extraction
//! - [`source`] - [`crate::domain::sources::GridSource`] implementation

pub mod client;
pub mod dataset;
pub mod grid;
pub mod source;

pub use client::{DEFAULT_BASE_URL, ImdClient, parse_base_url};
pub use dataset::ImdDataset;
pub use grid::{GridSpec, ImdVariable};
pub use source::ImdGridSource;
