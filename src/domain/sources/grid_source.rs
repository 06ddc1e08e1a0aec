//! Traits for the gridded climate data collaborator.

use std::path::Path;

use async_trait::async_trait;

use super::error::GridError;
use crate::domain::entities::{VariableInfo, YearRange};

/// Source of gridded climate data.
///
/// Every call receives the directory it must work in. Acquisition writes
/// one `{variable}_{year}.grd` file per year there, and `open` reads those
/// files back, so a source never touches anything outside the directory
/// it was handed.
///
/// # Implementations
///
/// - [`crate::infrastructure::imd::ImdGridSource`] - IMD Pune download service
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GridSource: Send + Sync {
    /// Downloads the grids of `variable` for every year in `years` into `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::UnknownVariable`] or [`GridError::YearOutOfRange`]
    /// for requests the source cannot serve, and network or I/O errors
    /// otherwise. Files written before a failure are left in `dir`.
    async fn acquire(&self, variable: &str, years: YearRange, dir: &Path) -> Result<(), GridError>;

    /// Opens previously acquired grids of `variable` in `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::MissingGrid`] if a year has not been acquired.
    async fn open(
        &self,
        variable: &str,
        years: YearRange,
        dir: &Path,
    ) -> Result<Box<dyn PointDataset>, GridError>;

    /// Variables this source can serve.
    fn variables(&self) -> Vec<VariableInfo>;
}

/// Handle over opened grid data for one variable and year range.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PointDataset: Send + Sync {
    /// Writes the time series of the grid cell nearest to `lat`/`lon`
    /// as CSV to `destination`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfDomain`] if the coordinate is not covered
    /// by the grid.
    async fn extract_point_csv(
        &self,
        destination: &Path,
        lat: f64,
        lon: f64,
    ) -> Result<(), GridError>;
}
