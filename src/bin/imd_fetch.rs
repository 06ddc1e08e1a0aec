//! Command-line client for IMD point time series.
//!
//! Runs the same retrieval pipeline as the HTTP service, without a server.
//!
//! # Usage
//!
//! ```bash
//! # List the variables that can be requested
//! cargo run --bin imd-fetch -- variables
//!
//! # Rain for New Delhi, 2020, written to ./rain_28.61_77.21.csv
//! cargo run --bin imd-fetch -- download --start-year 2020 --end-year 2020 \
//!     --lat 28.61 --lon 77.21 -v rain
//!
//! # Several variables are bundled into weather_data.zip
//! cargo run --bin imd-fetch -- download --start-year 2019 --end-year 2020 \
//!     --lat 19.07 --lon 72.88 -v tmax -v tmin --out data/
//! ```
//!
//! # Environment Variables
//!
//! - `IMD_BASE_URL`, `DOWNLOAD_TIMEOUT_SECS`, `DOWNLOAD_RETRIES` as for the server
//! - `RUST_LOG` (default: `warn`)

use imd_grid_service::application::services::RetrievalService;
use imd_grid_service::domain::entities::{DownloadPayload, RetrievalRequest};
use imd_grid_service::infrastructure::imd::{DEFAULT_BASE_URL, ImdClient, ImdGridSource};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// CLI tool for fetching IMD point time series.
#[derive(Parser)]
#[command(name = "imd-fetch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// IMD gridded data endpoint root
    #[arg(long, env = "IMD_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Per-download timeout in seconds
    #[arg(long, env = "DOWNLOAD_TIMEOUT_SECS", default_value_t = 300)]
    timeout: u64,

    /// Retries for transient download failures
    #[arg(long, env = "DOWNLOAD_RETRIES", default_value_t = 3)]
    retries: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available variables
    Variables,

    /// Download a point time series
    Download {
        #[arg(long)]
        start_year: i32,

        #[arg(long)]
        end_year: i32,

        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        /// Variable to fetch; repeat for several
        #[arg(short = 'v', long = "variable", required = true)]
        variables: Vec<String>,

        /// Directory the CSV or zip is written to
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let client = ImdClient::new(&cli.base_url, Duration::from_secs(cli.timeout), cli.retries)
        .context("Failed to build IMD client")?;
    let source = Arc::new(ImdGridSource::new(client));

    match cli.command {
        Commands::Variables => {
            let service = RetrievalService::new(source, std::env::temp_dir());
            list_variables(&service);
        }
        Commands::Download {
            start_year,
            end_year,
            lat,
            lon,
            variables,
            out,
        } => {
            let scratch = std::env::temp_dir().join("imd-fetch");
            let service = RetrievalService::new(source, scratch);
            let request = RetrievalRequest::new(start_year, end_year, lat, lon, variables);
            download(&service, request, out).await?;
        }
    }

    Ok(())
}

/// Prints the variable catalog.
///
/// # Output Format
///
/// ```text
/// IMD variables
///
///   Name   Unit     Resolution  Since  Description
///   ────────────────────────────────────────────────────────────
///   rain   mm/day   0.25°       1901   Daily gridded rainfall
/// ```
fn list_variables(service: &RetrievalService) {
    println!("{}", "IMD variables".bright_blue().bold());
    println!();

    println!(
        "  {:<6} {:<8} {:<11} {:<6} {}",
        "Name".bright_white().bold(),
        "Unit".bright_white().bold(),
        "Resolution".bright_white().bold(),
        "Since".bright_white().bold(),
        "Description".bright_white().bold()
    );
    println!("  {}", "─".repeat(60).bright_black());

    for info in service.variables() {
        println!(
            "  {:<6} {:<8} {:<11} {:<6} {}",
            info.name.cyan(),
            info.unit,
            format!("{}°", info.resolution_deg),
            info.first_year.to_string().bright_black(),
            info.description
        );
    }
    println!();
}

/// Runs one retrieval and writes the payload into `out`.
async fn download(
    service: &RetrievalService,
    request: RetrievalRequest,
    out: PathBuf,
) -> Result<()> {
    println!(
        "{} {} for {}-{} at ({}, {})",
        "Fetching".bright_blue().bold(),
        request.variables.join(", ").cyan(),
        request.start_year,
        request.end_year,
        request.latitude,
        request.longitude
    );

    let payload = match service.retrieve(request).await {
        Ok(payload) => payload,
        Err(e) => {
            println!("{} {}", "Failed:".red().bold(), e);
            return Err(anyhow::anyhow!("Download failed: {}", e));
        }
    };

    tokio::fs::create_dir_all(&out)
        .await
        .with_context(|| format!("Failed to create {}", out.display()))?;

    let path = out.join(payload.file_name());
    tokio::fs::write(&path, payload.bytes())
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    let kind = match &payload {
        DownloadPayload::Csv { .. } => "CSV",
        DownloadPayload::Archive { .. } => "zip archive",
    };
    println!(
        "{} {} ({} bytes) to {}",
        "Saved".green().bold(),
        kind,
        payload.bytes().len(),
        path.display().to_string().bright_white()
    );

    Ok(())
}
