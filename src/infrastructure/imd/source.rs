//! [`GridSource`] backed by the IMD Pune download service.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use tokio::fs;
use tracing::info;

use super::client::ImdClient;
use super::dataset::{ImdDataset, YearFile};
use super::grid::ImdVariable;
use crate::domain::entities::{VariableInfo, YearRange};
use crate::domain::sources::{GridError, GridSource, PointDataset};
use crate::utils::workspace::GRID_EXTENSION;

/// Grid source that downloads IMD yearly grids into the given directory.
#[derive(Debug, Clone)]
pub struct ImdGridSource {
    client: ImdClient,
}

impl ImdGridSource {
    pub fn new(client: ImdClient) -> Self {
        Self { client }
    }

    /// Path of one acquired year, e.g. `dir/rain_2020.grd`.
    pub fn grid_path(dir: &Path, variable: &str, year: i32) -> PathBuf {
        dir.join(format!("{variable}_{year}.{GRID_EXTENSION}"))
    }

    fn check_years(variable: ImdVariable, years: YearRange) -> Result<(), GridError> {
        let first = variable.first_year();
        let last = Utc::now().year();

        for year in [years.start, years.end] {
            if year < first || year > last {
                return Err(GridError::YearOutOfRange {
                    variable: variable.name().to_string(),
                    year,
                    first,
                    last,
                });
            }
        }
        Ok(())
    }
}

#[async_trait]
impl GridSource for ImdGridSource {
    async fn acquire(&self, variable: &str, years: YearRange, dir: &Path) -> Result<(), GridError> {
        let imd_variable: ImdVariable = variable.parse()?;
        Self::check_years(imd_variable, years)?;

        for year in years.years() {
            let bytes = self.client.download_year(imd_variable, year).await?;
            imd_variable
                .grid()
                .days_in_file(variable, year, bytes.len() as u64)?;

            let path = Self::grid_path(dir, variable, year);
            fs::write(&path, &bytes)
                .await
                .map_err(|e| GridError::Io(path.clone(), e))?;
            info!("Saved {} {} to {}", variable, year, path.display());
        }

        Ok(())
    }

    async fn open(
        &self,
        variable: &str,
        years: YearRange,
        dir: &Path,
    ) -> Result<Box<dyn PointDataset>, GridError> {
        let imd_variable: ImdVariable = variable.parse()?;
        let grid = imd_variable.grid();
        let mut files = Vec::with_capacity(years.len());

        for year in years.years() {
            let path = Self::grid_path(dir, variable, year);
            let metadata = match fs::metadata(&path).await {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    return Err(GridError::MissingGrid(path));
                }
                Err(e) => return Err(GridError::Io(path, e)),
            };

            let days = grid.days_in_file(variable, year, metadata.len())?;
            files.push(YearFile { year, path, days });
        }

        Ok(Box::new(ImdDataset::new(imd_variable, variable, files)))
    }

    fn variables(&self) -> Vec<VariableInfo> {
        ImdVariable::ALL.iter().map(ImdVariable::info).collect()
    }
}
