//! Grid source trait definitions for the domain layer.
//!
//! These traits abstract the gridded climate data collaborator: acquiring
//! grids, opening them and extracting a point time series. Concrete sources
//! live in `crate::infrastructure`; mocks are generated with `mockall`.

pub mod error;
pub mod grid_source;

pub use error::GridError;
pub use grid_source::{GridSource, PointDataset};

#[cfg(test)]
pub use grid_source::{MockGridSource, MockPointDataset};
