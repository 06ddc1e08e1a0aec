//! Infrastructure layer for external integrations.
//!
//! Implements the grid source contract defined by the domain layer.
//!
//! # Modules
//!
//! - [`imd`] - India Meteorological Department gridded data

pub mod imd;
