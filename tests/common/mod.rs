#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum_test::TestServer;
use imd_grid_service::application::services::RetrievalService;
use imd_grid_service::domain::entities::{VariableInfo, YearRange};
use imd_grid_service::domain::sources::{GridError, GridSource, PointDataset};
use imd_grid_service::routes::router;
use imd_grid_service::state::AppState;
use tempfile::TempDir;

/// Variables the fake source serves.
pub const KNOWN_VARIABLES: [&str; 3] = ["rain", "tmax", "tmin"];

/// Variable whose acquisition writes its first year and then fails.
pub const BROKEN_VARIABLE: &str = "broken";

/// Grid source that writes small text "grids" to disk.
///
/// Serves [`KNOWN_VARIABLES`] inside a box roughly covering India.
pub struct FakeGridSource;

impl FakeGridSource {
    fn grid_path(dir: &Path, variable: &str, year: i32) -> PathBuf {
        dir.join(format!("{variable}_{year}.grd"))
    }
}

#[async_trait]
impl GridSource for FakeGridSource {
    async fn acquire(&self, variable: &str, years: YearRange, dir: &Path) -> Result<(), GridError> {
        if variable == BROKEN_VARIABLE {
            let path = Self::grid_path(dir, variable, years.start);
            std::fs::write(&path, b"partial").map_err(|e| GridError::Io(path.clone(), e))?;
            return Err(GridError::Format {
                variable: variable.to_string(),
                year: years.start,
                reason: "truncated download".to_string(),
            });
        }

        if !KNOWN_VARIABLES.contains(&variable) {
            return Err(GridError::UnknownVariable(variable.to_string()));
        }

        for year in years.years() {
            let path = Self::grid_path(dir, variable, year);
            std::fs::write(&path, year.to_string()).map_err(|e| GridError::Io(path.clone(), e))?;
        }
        Ok(())
    }

    async fn open(
        &self,
        variable: &str,
        years: YearRange,
        dir: &Path,
    ) -> Result<Box<dyn PointDataset>, GridError> {
        let mut files = Vec::new();
        for year in years.years() {
            let path = Self::grid_path(dir, variable, year);
            if !path.exists() {
                return Err(GridError::MissingGrid(path));
            }
            files.push((year, path));
        }

        Ok(Box::new(FakeDataset {
            variable: variable.to_string(),
            files,
        }))
    }

    fn variables(&self) -> Vec<VariableInfo> {
        KNOWN_VARIABLES
            .iter()
            .map(|name| VariableInfo {
                name: name.to_string(),
                description: format!("Fake {name}"),
                unit: "unit".to_string(),
                resolution_deg: 1.0,
                first_year: 1951,
                lat_range: [6.0, 39.0],
                lon_range: [66.0, 101.0],
            })
            .collect()
    }
}

/// Writes two rows per acquired year.
pub struct FakeDataset {
    variable: String,
    files: Vec<(i32, PathBuf)>,
}

#[async_trait]
impl PointDataset for FakeDataset {
    async fn extract_point_csv(
        &self,
        destination: &Path,
        lat: f64,
        lon: f64,
    ) -> Result<(), GridError> {
        if !(6.0..=39.0).contains(&lat) || !(66.0..=101.0).contains(&lon) {
            return Err(GridError::OutOfDomain {
                variable: self.variable.clone(),
                lat,
                lon,
            });
        }

        std::fs::write(destination, expected_csv(&self.variable, self.years()))
            .map_err(|e| GridError::Io(destination.to_path_buf(), e))
    }
}

impl FakeDataset {
    fn years(&self) -> YearRange {
        let first = self.files.first().map(|f| f.0).unwrap_or_default();
        let last = self.files.last().map(|f| f.0).unwrap_or_default();
        YearRange::new(first, last)
    }
}

/// The CSV [`FakeDataset`] writes for `variable` over `years`.
pub fn expected_csv(variable: &str, years: YearRange) -> String {
    let mut csv = format!("DateTime,{variable}\n");
    for year in years.years() {
        csv.push_str(&format!("{year}-01-01,1.5\n{year}-01-02,\n"));
    }
    csv
}

/// A test server over the full router, scratch space in a temp dir.
pub struct TestApp {
    pub server: TestServer,
    pub output_dir: PathBuf,
    _temp: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let output_dir = temp.path().join("output");
        let state = create_test_state(&output_dir);
        let server = TestServer::new(router(state)).unwrap();

        Self {
            server,
            output_dir,
            _temp: temp,
        }
    }

    /// Number of entries left anywhere under the output directory.
    pub fn leftover_files(&self) -> usize {
        count_entries(&self.output_dir)
    }
}

pub fn create_test_state(output_dir: &Path) -> AppState {
    let service = RetrievalService::new(Arc::new(FakeGridSource), output_dir);
    AppState::new(Arc::new(service))
}

pub fn test_router(output_dir: &Path) -> Router {
    router(create_test_state(output_dir))
}

fn count_entries(dir: &Path) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };

    entries
        .flatten()
        .map(|entry| {
            let path = entry.path();
            if path.is_dir() {
                1 + count_entries(&path)
            } else {
                1
            }
        })
        .sum()
}
