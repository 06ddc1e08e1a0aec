//! Per-request scratch directories and artifact cleanup.
//!
//! A [`ScratchWorkspace`] is a uniquely named directory under the output
//! root. Grid files and extracted CSVs of one request are written inside
//! it, tracked as they appear, and deleted when the workspace is finished
//! or dropped, whichever comes first.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tokio::task;
use tracing::{debug, warn};

use super::request_id::generate_request_id;

/// Extension of intermediate grid files.
pub const GRID_EXTENSION: &str = "grd";

/// Outcome of a cleanup pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanupReport {
    pub deleted: usize,
    pub failed: Vec<PathBuf>,
}

/// Scratch directory owning every artifact of one request.
#[derive(Debug)]
pub struct ScratchWorkspace {
    id: String,
    dir: PathBuf,
    intermediates: Vec<PathBuf>,
    outputs: Vec<PathBuf>,
    cleaned: bool,
}

impl ScratchWorkspace {
    /// Creates `root/req-<id>`, creating `root` first if needed.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if either directory cannot be created.
    pub async fn create(root: &Path) -> io::Result<Self> {
        tokio::fs::create_dir_all(root).await?;

        let id = generate_request_id();
        let dir = root.join(format!("req-{id}"));
        tokio::fs::create_dir(&dir).await?;
        debug!("Created scratch directory {}", dir.display());

        Ok(Self {
            id,
            dir,
            intermediates: Vec::new(),
            outputs: Vec::new(),
            cleaned: false,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn outputs(&self) -> &[PathBuf] {
        &self.outputs
    }

    /// Tracks every `{variable}_*.grd` file currently in the workspace.
    ///
    /// Returns how many new files were picked up.
    pub fn discover_intermediates(&mut self, variable: &str) -> usize {
        let pattern = format!("{variable}_*.{GRID_EXTENSION}");
        let mut added = 0;

        for path in self.glob(&pattern) {
            if !self.intermediates.contains(&path) {
                self.intermediates.push(path);
                added += 1;
            }
        }

        added
    }

    /// Path inside the workspace for an output file name.
    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    pub fn track_output(&mut self, path: PathBuf) {
        if !self.outputs.contains(&path) {
            self.outputs.push(path);
        }
    }

    /// First `{variable}_*.csv` file in the workspace, if any.
    ///
    /// Used when extraction did not produce the exact expected file name.
    pub fn find_output(&self, variable: &str) -> Option<PathBuf> {
        self.glob(&format!("{variable}_*.csv")).into_iter().next()
    }

    /// Runs [`ScratchWorkspace::cleanup`] on the blocking pool.
    ///
    /// Consumes the workspace, so `Drop` has nothing left to do afterwards.
    pub async fn finish(mut self) -> CleanupReport {
        let dir = self.dir.clone();
        match task::spawn_blocking(move || self.cleanup()).await {
            Ok(report) => report,
            Err(e) => {
                warn!("Cleanup of {} did not complete: {}", dir.display(), e);
                CleanupReport {
                    deleted: 0,
                    failed: vec![dir],
                }
            }
        }
    }

    /// Deletes intermediates, then outputs, then the directory itself.
    ///
    /// Each deletion is attempted independently; failures are logged and
    /// reported but never returned as errors. Calling this again is a no-op.
    pub fn cleanup(&mut self) -> CleanupReport {
        let mut report = CleanupReport::default();
        if self.cleaned {
            return report;
        }
        self.cleaned = true;

        for path in self.intermediates.drain(..).chain(self.outputs.drain(..)) {
            match fs::remove_file(&path) {
                Ok(()) => {
                    debug!("Deleted {}", path.display());
                    report.deleted += 1;
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    warn!("Failed to delete {}: {}", path.display(), e);
                    report.failed.push(path);
                }
            }
        }

        // Also sweeps files nobody tracked, e.g. a half-written download.
        if let Err(e) = fs::remove_dir_all(&self.dir)
            && e.kind() != io::ErrorKind::NotFound
        {
            warn!(
                "Failed to remove scratch directory {}: {}",
                self.dir.display(),
                e
            );
            report.failed.push(self.dir.clone());
        }

        report
    }

    fn glob(&self, pattern: &str) -> Vec<PathBuf> {
        let Some(dir) = self.dir.to_str() else {
            warn!("Scratch path is not valid UTF-8: {}", self.dir.display());
            return Vec::new();
        };

        // Only the file part is a pattern; the directory is matched literally.
        let full = Path::new(&glob::Pattern::escape(dir)).join(pattern);
        let full = full.to_string_lossy();

        match glob::glob(&full) {
            Ok(paths) => {
                let mut found: Vec<PathBuf> = paths.filter_map(Result::ok).collect();
                found.sort();
                found
            }
            Err(e) => {
                warn!("Invalid glob pattern {}: {}", full, e);
                Vec::new()
            }
        }
    }
}

impl Drop for ScratchWorkspace {
    fn drop(&mut self) {
        self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_create_makes_unique_directories() {
        let root = TempDir::new().unwrap();
        let a = ScratchWorkspace::create(root.path()).await.unwrap();
        let b = ScratchWorkspace::create(root.path()).await.unwrap();

        assert!(a.dir().is_dir());
        assert!(b.dir().is_dir());
        assert_ne!(a.dir(), b.dir());
        assert!(a.dir().starts_with(root.path()));
    }

    #[tokio::test]
    async fn test_create_makes_missing_root() {
        let root = TempDir::new().unwrap();
        let nested = root.path().join("output");
        let ws = ScratchWorkspace::create(&nested).await.unwrap();
        assert!(ws.dir().starts_with(&nested));
    }

    #[tokio::test]
    async fn test_discover_intermediates_matches_variable_prefix() {
        let root = TempDir::new().unwrap();
        let mut ws = ScratchWorkspace::create(root.path()).await.unwrap();

        fs::write(ws.dir().join("rain_2020.grd"), b"x").unwrap();
        fs::write(ws.dir().join("rain_2021.grd"), b"x").unwrap();
        fs::write(ws.dir().join("tmax_2020.grd"), b"x").unwrap();

        assert_eq!(ws.discover_intermediates("rain"), 2);
        assert_eq!(ws.discover_intermediates("rain"), 0);

        // Only the two tracked files count; tmax goes with the directory.
        let report = ws.cleanup();
        assert_eq!(report.deleted, 2);
        assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_find_output_fallback() {
        let root = TempDir::new().unwrap();
        let ws = ScratchWorkspace::create(root.path()).await.unwrap();
        assert!(ws.find_output("rain").is_none());

        fs::write(ws.dir().join("rain_11.0_79.0.csv"), b"x").unwrap();
        let found = ws.find_output("rain").unwrap();
        assert!(found.ends_with("rain_11.0_79.0.csv"));
    }

    #[tokio::test]
    async fn test_cleanup_removes_everything() {
        let root = TempDir::new().unwrap();
        let mut ws = ScratchWorkspace::create(root.path()).await.unwrap();

        fs::write(ws.dir().join("rain_2020.grd"), b"x").unwrap();
        ws.discover_intermediates("rain");
        let out = ws.output_path("rain_11.00_79.00.csv");
        fs::write(&out, b"x").unwrap();
        ws.track_output(out);
        fs::write(ws.dir().join("stray.tmp"), b"x").unwrap();

        let report = ws.cleanup();
        assert_eq!(report.deleted, 2);
        assert!(report.failed.is_empty());
        assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);

        assert_eq!(ws.cleanup(), CleanupReport::default());
    }

    #[tokio::test]
    async fn test_cleanup_tolerates_already_deleted_files() {
        let root = TempDir::new().unwrap();
        let mut ws = ScratchWorkspace::create(root.path()).await.unwrap();

        let out = ws.output_path("rain_1.00_2.00.csv");
        ws.track_output(out);

        let report = ws.cleanup();
        assert!(report.failed.is_empty());
    }

    #[tokio::test]
    async fn test_undeletable_file_is_reported_and_swept() {
        let root = TempDir::new().unwrap();
        let mut ws = ScratchWorkspace::create(root.path()).await.unwrap();

        // A directory with a grid name: remove_file fails, but not with NotFound.
        let odd = ws.dir().join("rain_2020.grd");
        fs::create_dir(&odd).unwrap();
        fs::write(odd.join("chunk"), b"x").unwrap();
        assert_eq!(ws.discover_intermediates("rain"), 1);

        let report = ws.finish().await;

        assert_eq!(report.deleted, 0);
        assert_eq!(report.failed, vec![odd]);
        assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_finish_removes_directory() {
        let root = TempDir::new().unwrap();
        let mut ws = ScratchWorkspace::create(root.path()).await.unwrap();
        let out = ws.output_path("tmax_1.00_2.00.csv");
        fs::write(&out, b"x").unwrap();
        ws.track_output(out);

        let report = ws.finish().await;

        assert_eq!(report.deleted, 1);
        assert!(report.failed.is_empty());
        assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_drop_cleans_up() {
        let root = TempDir::new().unwrap();
        {
            let mut ws = ScratchWorkspace::create(root.path()).await.unwrap();
            fs::write(ws.dir().join("tmin_2001.grd"), b"x").unwrap();
            ws.discover_intermediates("tmin");
        }
        assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
    }
}
