//! Point extraction over acquired IMD yearly grids.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use tokio::task;
use tracing::debug;

use super::grid::{GridSpec, ImdVariable};
use crate::domain::sources::{GridError, PointDataset};

/// One acquired year on disk.
#[derive(Debug, Clone)]
pub struct YearFile {
    pub year: i32,
    pub path: PathBuf,
    pub days: usize,
}

/// Opened grids of one variable, oldest year first.
#[derive(Debug, Clone)]
pub struct ImdDataset {
    variable: ImdVariable,
    label: String,
    grid: GridSpec,
    files: Vec<YearFile>,
}

impl ImdDataset {
    /// `label` is the variable name as requested; it heads the value column.
    pub fn new(variable: ImdVariable, label: impl Into<String>, files: Vec<YearFile>) -> Self {
        Self {
            variable,
            label: label.into(),
            grid: variable.grid(),
            files,
        }
    }

    /// Total number of daily records across all years.
    pub fn total_days(&self) -> usize {
        self.files.iter().map(|f| f.days).sum()
    }

    fn write_series(&self, destination: &Path, row: usize, col: usize) -> Result<(), GridError> {
        let csv_error = |e: csv::Error| GridError::Csv(destination.to_path_buf(), e);
        let mut writer = csv::Writer::from_path(destination).map_err(csv_error)?;
        writer
            .write_record(["DateTime", self.label.as_str()])
            .map_err(csv_error)?;

        for file in &self.files {
            let io_error = |e: std::io::Error| GridError::Io(file.path.clone(), e);
            let mut reader = BufReader::new(File::open(&file.path).map_err(io_error)?);
            let first_day = NaiveDate::from_ymd_opt(file.year, 1, 1).ok_or_else(|| {
                GridError::Format {
                    variable: self.label.clone(),
                    year: file.year,
                    reason: "year is outside the calendar range".to_string(),
                }
            })?;

            let mut buffer = [0u8; 4];
            for day in 0..file.days {
                reader
                    .seek(SeekFrom::Start(self.grid.offset(day, row, col)))
                    .map_err(io_error)?;
                reader.read_exact(&mut buffer).map_err(io_error)?;
                let value = f32::from_le_bytes(buffer);

                let date = first_day + Days::new(day as u64);
                let date = date.format("%Y-%m-%d").to_string();
                let value = if self.grid.is_missing(value) {
                    String::new()
                } else {
                    value.to_string()
                };
                writer.write_record([date, value]).map_err(csv_error)?;
            }
        }

        writer
            .flush()
            .map_err(|e| GridError::Io(destination.to_path_buf(), e))?;
        Ok(())
    }
}

#[async_trait]
impl PointDataset for ImdDataset {
    async fn extract_point_csv(
        &self,
        destination: &Path,
        lat: f64,
        lon: f64,
    ) -> Result<(), GridError> {
        let (row, col) = self
            .grid
            .nearest_index(lat, lon)
            .ok_or_else(|| GridError::OutOfDomain {
                variable: self.label.clone(),
                lat,
                lon,
            })?;

        let (cell_lat, cell_lon) = self.grid.cell_center(row, col);
        debug!(
            "Extracting {} days of {} at cell ({}, {}) for lat={}, lon={}",
            self.total_days(),
            self.variable,
            cell_lat,
            cell_lon,
            lat,
            lon
        );

        let dataset = self.clone();
        let destination = destination.to_path_buf();
        task::spawn_blocking(move || dataset.write_series(&destination, row, col)).await?
    }
}
