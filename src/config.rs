//! Application configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup and validated before the server starts.
//!
//! ## Variables
//!
//! - `HOST` - Bind host (default: `0.0.0.0`)
//! - `PORT` - Bind port (default: `5000`)
//! - `OUTPUT_DIR` - Root for per-request scratch directories
//!   (default: `output` next to the executable)
//! - `IMD_BASE_URL` - IMD gridded data endpoint root
//!   (default: `https://www.imdpune.gov.in/cmpg/Griddata`)
//! - `DOWNLOAD_TIMEOUT_SECS` - Per-download HTTP timeout (default: 300)
//! - `DOWNLOAD_RETRIES` - Retries for transient download failures (default: 3, max: 10)
//! - `RUST_LOG` - Log level (default: `info`)
//! - `LOG_FORMAT` - Log format: `text` or `json` (default: `text`)
//!
//! A `.env` file is honoured when `main.rs` loads it through `dotenvy`.

use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::infrastructure::imd::{DEFAULT_BASE_URL, parse_base_url};

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Every request works in its own subdirectory of this one.
    pub output_dir: PathBuf,
    pub imd_base_url: String,
    pub download_timeout_secs: u64,
    pub download_retries: usize,
    pub log_level: String,
    pub log_format: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable does not parse, or if the
    /// default output directory cannot be derived from the executable path.
    pub fn from_env() -> Result<Self> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = match env::var("PORT") {
            Ok(v) => v
                .parse()
                .with_context(|| format!("PORT must be a port number, got '{v}'"))?,
            Err(_) => 5000,
        };

        let output_dir = match env::var("OUTPUT_DIR") {
            Ok(v) if !v.trim().is_empty() => PathBuf::from(v),
            _ => Self::default_output_dir()?,
        };

        let imd_base_url =
            env::var("IMD_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let download_timeout_secs = env::var("DOWNLOAD_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(300);

        let download_retries = env::var("DOWNLOAD_RETRIES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3);

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

        Ok(Self {
            host,
            port,
            output_dir,
            imd_base_url,
            download_timeout_secs,
            download_retries,
            log_level,
            log_format,
        })
    }

    /// `output` alongside the running executable.
    fn default_output_dir() -> Result<PathBuf> {
        let exe = env::current_exe().context("Failed to locate the running executable")?;
        let dir = exe
            .parent()
            .context("Executable path has no parent directory")?;
        Ok(dir.join("output"))
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `log_format` is not `text` or `json`
    /// - `host` and `port` do not form a socket address
    /// - `imd_base_url` is not an `http(s)://` URL with a host
    /// - `download_timeout_secs` is zero
    /// - `download_retries` is above 10
    pub fn validate(&self) -> Result<()> {
        if self.log_format != "text" && self.log_format != "json" {
            anyhow::bail!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.log_format
            );
        }

        self.listen_addr()?;

        parse_base_url(&self.imd_base_url).context("IMD_BASE_URL is invalid")?;

        if self.download_timeout_secs == 0 {
            anyhow::bail!("DOWNLOAD_TIMEOUT_SECS must be greater than 0");
        }

        if self.download_retries > 10 {
            anyhow::bail!(
                "DOWNLOAD_RETRIES must be between 0 and 10, got {}",
                self.download_retries
            );
        }

        Ok(())
    }

    /// Socket address built from `host` and `port`.
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| {
                format!(
                    "HOST and PORT must form a socket address, got '{}:{}'",
                    self.host, self.port
                )
            })
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    /// Prints configuration summary.
    pub fn print_summary(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Listen address: {}:{}", self.host, self.port);
        tracing::info!("  Output directory: {}", self.output_dir.display());
        tracing::info!("  IMD endpoint: {}", self.imd_base_url);
        tracing::info!(
            "  Downloads: timeout {}s, {} retries",
            self.download_timeout_secs,
            self.download_retries
        );
        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Log format: {}", self.log_format);
    }
}

/// Loads and validates configuration from environment variables.
///
/// # Errors
///
/// Returns an error if a variable is malformed or validation fails.
///
/// # Note
///
/// This function expects environment variables to be already loaded
/// (e.g., via `dotenvy::dotenv()` in `main.rs`).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}
