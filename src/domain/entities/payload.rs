//! Downloadable result of a retrieval.

/// Download name used when several variables are bundled together.
pub const ARCHIVE_FILE_NAME: &str = "weather_data.zip";

/// Fully materialized response body.
///
/// Holds bytes rather than paths so that it stays valid after the
/// request's artifacts have been deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadPayload {
    /// A single variable's CSV, served under its own file name.
    Csv { file_name: String, bytes: Vec<u8> },
    /// A zip archive holding one CSV per variable.
    Archive { bytes: Vec<u8> },
}

impl DownloadPayload {
    pub fn file_name(&self) -> &str {
        match self {
            Self::Csv { file_name, .. } => file_name,
            Self::Archive { .. } => ARCHIVE_FILE_NAME,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Csv { .. } => "text/csv",
            Self::Archive { .. } => "application/zip",
        }
    }

    pub fn bytes(&self) -> &[u8] {
        match self {
            Self::Csv { bytes, .. } | Self::Archive { bytes } => bytes,
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Csv { bytes, .. } | Self::Archive { bytes } => bytes,
        }
    }
}
