//! Point retrieval orchestration.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs;
use tracing::{debug, info, warn};
use validator::Validate;

use crate::domain::entities::{DownloadPayload, RetrievalRequest, VariableInfo};
use crate::domain::sources::{GridError, GridSource};
use crate::error::AppError;
use crate::utils::archive::build_zip;
use crate::utils::workspace::ScratchWorkspace;

/// Service turning a [`RetrievalRequest`] into a downloadable payload.
///
/// Each call works in its own [`ScratchWorkspace`] under `output_dir`, so
/// concurrent requests never share files. The workspace is cleaned once the
/// payload is in memory, and on every early return through `Drop`.
pub struct RetrievalService {
    source: Arc<dyn GridSource>,
    output_dir: PathBuf,
}

impl RetrievalService {
    pub fn new(source: Arc<dyn GridSource>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source,
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Variables the underlying grid source can serve.
    pub fn variables(&self) -> Vec<VariableInfo> {
        self.source.variables()
    }

    /// Acquires, extracts and packages every requested variable.
    ///
    /// # Flow
    ///
    /// For each variable, in request order: acquire its grids, record the
    /// `{variable}_*.grd` files produced (even if acquisition failed part
    /// way), open the dataset, extract the nearest-cell series to
    /// `{variable}_{lat}_{lon}.csv`. One variable yields its CSV; several
    /// yield a zip of all CSVs in request order.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if the request is malformed; nothing is acquired
    /// - [`AppError::Extraction`] if the coordinate is outside the grid, or the
    ///   source rejects a variable or year
    /// - [`AppError::Internal`] for network, I/O or packaging failures
    pub async fn retrieve(&self, request: RetrievalRequest) -> Result<DownloadPayload, AppError> {
        request.validate()?;

        let coordinate = request.normalized_coordinate();
        let years = request.years();

        let mut workspace = ScratchWorkspace::create(&self.output_dir)
            .await
            .map_err(|e| {
                AppError::internal(format!(
                    "Failed to create scratch directory in {}: {}",
                    self.output_dir.display(),
                    e
                ))
            })?;

        info!(
            request_id = workspace.id(),
            "Received lat: {}, lon: {} (rounded: {:.2}, {:.2})",
            request.latitude,
            request.longitude,
            coordinate.lat_rounded,
            coordinate.lon_rounded
        );

        for variable in &request.variables {
            info!(
                request_id = workspace.id(),
                "Fetching {} data for {}-{} at ({:.2}, {:.2})",
                variable,
                years.start,
                years.end,
                coordinate.lat_rounded,
                coordinate.lon_rounded
            );

            let acquired = self
                .source
                .acquire(variable, years, workspace.dir())
                .await;
            workspace.discover_intermediates(variable);
            acquired?;

            let dataset = self.source.open(variable, years, workspace.dir()).await?;

            let destination = workspace.output_path(&coordinate.output_file_name(variable));
            match dataset
                .extract_point_csv(&destination, request.latitude, request.longitude)
                .await
            {
                Ok(()) => {}
                Err(GridError::OutOfDomain { .. }) => {
                    return Err(out_of_domain(&request));
                }
                Err(e) => return Err(e.into()),
            }

            let output = resolve_output(&workspace, variable, &destination, &request)?;
            workspace.track_output(output);
        }

        let payload = package(workspace.outputs()).await?;

        let request_id = workspace.id().to_string();
        let report = workspace.finish().await;
        debug!(
            request_id = %request_id,
            "Deleted {} artifact(s)",
            report.deleted
        );
        if !report.failed.is_empty() {
            warn!(
                request_id = %request_id,
                "{} artifact(s) could not be deleted",
                report.failed.len()
            );
        }

        Ok(payload)
    }
}

fn out_of_domain(request: &RetrievalRequest) -> AppError {
    AppError::extraction(format!(
        "Could not extract data for lat={}, lon={}. Please use a valid location within India.",
        request.latitude, request.longitude
    ))
}

/// The expected output file, or the first `{variable}_*.csv` in the workspace.
fn resolve_output(
    workspace: &ScratchWorkspace,
    variable: &str,
    expected: &Path,
    request: &RetrievalRequest,
) -> Result<PathBuf, AppError> {
    if expected.exists() {
        return Ok(expected.to_path_buf());
    }

    match workspace.find_output(variable) {
        Some(found) => {
            warn!(
                "Expected {} was not written; using {}",
                expected.display(),
                found.display()
            );
            Ok(found)
        }
        None => Err(out_of_domain(request)),
    }
}

/// Reads every output into memory and builds the response payload.
async fn package(outputs: &[PathBuf]) -> Result<DownloadPayload, AppError> {
    let mut files = Vec::with_capacity(outputs.len());
    for path in outputs {
        let bytes = fs::read(path).await.map_err(|e| {
            AppError::internal(format!("Failed to read {}: {}", path.display(), e))
        })?;
        files.push((base_name(path), bytes));
    }

    match files.len() {
        0 => Err(AppError::internal("No output files were produced")),
        1 => {
            let (file_name, bytes) = files.remove(0);
            Ok(DownloadPayload::Csv { file_name, bytes })
        }
        _ => {
            let bytes = build_zip(
                files
                    .iter()
                    .map(|(name, bytes)| (name.as_str(), bytes.as_slice())),
            )
            .map_err(|e| AppError::internal(format!("Failed to build zip archive: {e}")))?;
            Ok(DownloadPayload::Archive { bytes })
        }
    }
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::YearRange;
    use crate::domain::sources::{MockGridSource, MockPointDataset, PointDataset};
    use std::io::{Cursor, Read};
    use tempfile::TempDir;
    use zip::ZipArchive;

    fn request(variables: &[&str]) -> RetrievalRequest {
        RetrievalRequest::new(
            2020,
            2021,
            11.004,
            78.996,
            variables.iter().map(|v| v.to_string()).collect(),
        )
    }

    /// Acquisition that writes one fake grid per year, like a real source.
    fn expect_acquire(source: &mut MockGridSource, times: usize) {
        source
            .expect_acquire()
            .times(times)
            .returning(|variable, years: YearRange, dir| {
                for year in years.years() {
                    std::fs::write(dir.join(format!("{variable}_{year}.grd")), b"grid").unwrap();
                }
                Ok(())
            });
    }

    /// Dataset that writes `DateTime,{variable}` plus one row.
    fn csv_dataset(variable: &'static str) -> Box<dyn PointDataset> {
        let mut dataset = MockPointDataset::new();
        dataset
            .expect_extract_point_csv()
            .times(1)
            .returning(move |destination, _, _| {
                std::fs::write(destination, format!("DateTime,{variable}\n2020-01-01,1.5\n"))
                    .unwrap();
                Ok(())
            });
        Box::new(dataset)
    }

    fn assert_empty(dir: &Path) {
        let leftovers: Vec<_> = std::fs::read_dir(dir).unwrap().collect();
        assert!(leftovers.is_empty(), "leftover artifacts: {leftovers:?}");
    }

    #[tokio::test]
    async fn test_single_variable_returns_csv_and_cleans_up() {
        let out = TempDir::new().unwrap();
        let mut source = MockGridSource::new();
        expect_acquire(&mut source, 1);
        source
            .expect_open()
            .times(1)
            .returning(|_, _, _| Ok(csv_dataset("rain")));

        let service = RetrievalService::new(Arc::new(source), out.path());
        let payload = service.retrieve(request(&["rain"])).await.unwrap();

        assert_eq!(
            payload,
            DownloadPayload::Csv {
                file_name: "rain_11.00_79.00.csv".to_string(),
                bytes: b"DateTime,rain\n2020-01-01,1.5\n".to_vec(),
            }
        );
        assert_empty(out.path());
    }

    #[tokio::test]
    async fn test_multiple_variables_return_zip_in_request_order() {
        let out = TempDir::new().unwrap();
        let mut source = MockGridSource::new();
        expect_acquire(&mut source, 2);
        source
            .expect_open()
            .times(2)
            .returning(|variable, _, _| {
                Ok(match variable {
                    "tmax" => csv_dataset("tmax"),
                    _ => csv_dataset("rain"),
                })
            });

        let service = RetrievalService::new(Arc::new(source), out.path());
        let payload = service.retrieve(request(&["tmax", "rain"])).await.unwrap();

        assert_eq!(payload.file_name(), "weather_data.zip");
        assert_eq!(payload.content_type(), "application/zip");

        let mut archive = ZipArchive::new(Cursor::new(payload.into_bytes())).unwrap();
        assert_eq!(archive.len(), 2);
        assert_eq!(archive.by_index(0).unwrap().name(), "tmax_11.00_79.00.csv");
        assert_eq!(archive.by_index(1).unwrap().name(), "rain_11.00_79.00.csv");

        let mut content = String::new();
        archive
            .by_index(1)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert!(content.starts_with("DateTime,rain"));

        assert_empty(out.path());
    }

    #[tokio::test]
    async fn test_invalid_request_never_reaches_source() {
        let out = TempDir::new().unwrap();
        let mut source = MockGridSource::new();
        source.expect_acquire().times(0);
        source.expect_open().times(0);

        let service = RetrievalService::new(Arc::new(source), out.path());
        let result = service.retrieve(request(&[])).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_empty(out.path());
    }

    #[tokio::test]
    async fn test_out_of_domain_is_extraction_error() {
        let out = TempDir::new().unwrap();
        let mut source = MockGridSource::new();
        expect_acquire(&mut source, 1);
        source.expect_open().times(1).returning(|_, _, _| {
            let mut dataset = MockPointDataset::new();
            dataset
                .expect_extract_point_csv()
                .returning(|_, lat, lon| {
                    Err(GridError::OutOfDomain {
                        variable: "rain".into(),
                        lat,
                        lon,
                    })
                });
            Ok(Box::new(dataset) as Box<dyn PointDataset>)
        });

        let service = RetrievalService::new(Arc::new(source), out.path());
        let mut req = request(&["rain"]);
        req.latitude = 0.0;
        req.longitude = 0.0;

        match service.retrieve(req).await {
            Err(AppError::Extraction(message)) => {
                assert!(message.contains("valid location within India"));
            }
            other => panic!("expected extraction error, got {other:?}"),
        }
        assert_empty(out.path());
    }

    #[tokio::test]
    async fn test_failure_after_first_variable_cleans_earlier_artifacts() {
        let out = TempDir::new().unwrap();
        let mut source = MockGridSource::new();
        source
            .expect_acquire()
            .times(2)
            .returning(|variable, years: YearRange, dir| {
                if variable == "invalid_var" {
                    return Err(GridError::UnknownVariable(variable.to_string()));
                }
                std::fs::write(dir.join(format!("{variable}_{}.grd", years.start)), b"g").unwrap();
                Ok(())
            });
        source
            .expect_open()
            .times(1)
            .returning(|_, _, _| Ok(csv_dataset("rain")));

        let service = RetrievalService::new(Arc::new(source), out.path());
        let result = service.retrieve(request(&["rain", "invalid_var"])).await;

        assert!(matches!(result, Err(AppError::Extraction(_))));
        assert_empty(out.path());
    }

    #[tokio::test]
    async fn test_partial_download_is_cleaned_up() {
        let out = TempDir::new().unwrap();
        let mut source = MockGridSource::new();
        source
            .expect_acquire()
            .times(1)
            .returning(|variable, years: YearRange, dir| {
                std::fs::write(dir.join(format!("{variable}_{}.grd", years.start)), b"g").unwrap();
                Err(GridError::HttpStatus {
                    url: "http://imd/RF25.php".into(),
                    status: reqwest::StatusCode::BAD_GATEWAY,
                })
            });
        source.expect_open().times(0);

        let service = RetrievalService::new(Arc::new(source), out.path());
        let result = service.retrieve(request(&["rain"])).await;

        assert!(matches!(result, Err(AppError::Internal(_))));
        assert_empty(out.path());
    }

    #[tokio::test]
    async fn test_undeletable_artifact_does_not_mask_result() {
        let out = TempDir::new().unwrap();
        let mut source = MockGridSource::new();
        source
            .expect_acquire()
            .times(1)
            .returning(|variable, years: YearRange, dir| {
                // A directory under a grid name cannot be removed with remove_file.
                let odd = dir.join(format!("{variable}_{}.grd", years.start));
                std::fs::create_dir(&odd).unwrap();
                std::fs::write(odd.join("chunk"), b"g").unwrap();
                Ok(())
            });
        source
            .expect_open()
            .times(1)
            .returning(|_, _, _| Ok(csv_dataset("rain")));

        let service = RetrievalService::new(Arc::new(source), out.path());
        let payload = service.retrieve(request(&["rain"])).await;

        assert!(payload.is_ok(), "{payload:?}");
        assert_eq!(payload.unwrap().file_name(), "rain_11.00_79.00.csv");
        assert_empty(out.path());
    }

    #[tokio::test]
    async fn test_missing_output_falls_back_to_variable_glob() {
        let out = TempDir::new().unwrap();
        let mut source = MockGridSource::new();
        expect_acquire(&mut source, 1);
        source.expect_open().times(1).returning(|_, _, _| {
            let mut dataset = MockPointDataset::new();
            dataset
                .expect_extract_point_csv()
                .returning(|destination, _, _| {
                    let dir = destination.parent().unwrap();
                    std::fs::write(dir.join("rain_11.0_79.0.csv"), b"DateTime,rain\n").unwrap();
                    Ok(())
                });
            Ok(Box::new(dataset) as Box<dyn PointDataset>)
        });

        let service = RetrievalService::new(Arc::new(source), out.path());
        let payload = service.retrieve(request(&["rain"])).await.unwrap();

        assert_eq!(payload.file_name(), "rain_11.0_79.0.csv");
        assert_empty(out.path());
    }

    #[tokio::test]
    async fn test_missing_output_without_fallback_fails() {
        let out = TempDir::new().unwrap();
        let mut source = MockGridSource::new();
        expect_acquire(&mut source, 1);
        source.expect_open().times(1).returning(|_, _, _| {
            let mut dataset = MockPointDataset::new();
            dataset
                .expect_extract_point_csv()
                .returning(|_, _, _| Ok(()));
            Ok(Box::new(dataset) as Box<dyn PointDataset>)
        });

        let service = RetrievalService::new(Arc::new(source), out.path());
        let result = service.retrieve(request(&["rain"])).await;

        assert!(matches!(result, Err(AppError::Extraction(_))));
        assert_empty(out.path());
    }

    #[tokio::test]
    async fn test_extraction_uses_unrounded_coordinate() {
        let out = TempDir::new().unwrap();
        let mut source = MockGridSource::new();
        expect_acquire(&mut source, 1);
        source.expect_open().times(1).returning(|_, _, _| {
            let mut dataset = MockPointDataset::new();
            dataset
                .expect_extract_point_csv()
                .withf(|destination, lat, lon| {
                    *lat == 11.004
                        && *lon == 78.996
                        && destination.ends_with("rain_11.00_79.00.csv")
                })
                .times(1)
                .returning(|destination, _, _| {
                    std::fs::write(destination, b"DateTime,rain\n").unwrap();
                    Ok(())
                });
            Ok(Box::new(dataset) as Box<dyn PointDataset>)
        });

        let service = RetrievalService::new(Arc::new(source), out.path());
        assert!(service.retrieve(request(&["rain"])).await.is_ok());
    }
}
