//! HTTP client for the IMD Pune gridded data download scripts.

use std::time::Duration;

use reqwest::Client;
use url::Url;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{info, warn};

use super::grid::ImdVariable;
use crate::domain::sources::GridError;

/// Default root of the download scripts.
pub const DEFAULT_BASE_URL: &str = "https://www.imdpune.gov.in/cmpg/Griddata";

/// Downloads yearly binary grids.
///
/// Each year is one `POST {base_url}/{endpoint}.php` with the form body
/// `{endpoint}={year}`. Network errors and 5xx responses are retried with
/// exponential backoff; everything else fails immediately.
#[derive(Debug, Clone)]
pub struct ImdClient {
    http: Client,
    base_url: Url,
    retries: usize,
}

/// Parses the root of the download scripts.
///
/// Only `http` and `https` URLs with a host are accepted. The path always
/// ends with `/` so that script names join below it rather than replacing
/// its last segment.
///
/// # Errors
///
/// Returns [`GridError::InvalidUrl`] describing why `input` was rejected.
pub fn parse_base_url(input: &str) -> Result<Url, GridError> {
    let invalid = |reason: String| GridError::InvalidUrl {
        url: input.to_string(),
        reason,
    };

    let mut url = Url::parse(input).map_err(|e| invalid(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("scheme '{other}' is not http or https"))),
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }

    url.set_query(None);
    url.set_fragment(None);
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

impl ImdClient {
    /// Builds a client with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidUrl`] if `base_url` is not an http(s) URL
    /// with a host, and [`GridError::Network`] if the TLS backend cannot be
    /// initialized.
    pub fn new(base_url: &str, timeout: Duration, retries: usize) -> Result<Self, GridError> {
        let base_url = parse_base_url(base_url)?;
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| GridError::Network(base_url.to_string(), e))?;

        Ok(Self {
            http,
            base_url,
            retries,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Download script of `variable`, e.g. `{base_url}RF25.php`.
    pub fn url_for(&self, variable: ImdVariable) -> Result<Url, GridError> {
        self.base_url
            .join(&format!("{}.php", variable.endpoint()))
            .map_err(|e| GridError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    /// Downloads one year of `variable` and returns the raw grid bytes.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::HttpStatus`] for non-success responses and
    /// [`GridError::Network`] when the request itself fails, after retries.
    pub async fn download_year(
        &self,
        variable: ImdVariable,
        year: i32,
    ) -> Result<Vec<u8>, GridError> {
        let strategy = ExponentialBackoff::from_millis(2)
            .factor(250)
            .max_delay(Duration::from_secs(10))
            .map(jitter)
            .take(self.retries);

        RetryIf::spawn(
            strategy,
            || self.try_download(variable, year),
            |e: &GridError| {
                let transient = is_transient(e);
                if transient {
                    warn!("Retrying {} {} after error: {}", variable, year, e);
                }
                transient
            },
        )
        .await
    }

    async fn try_download(&self, variable: ImdVariable, year: i32) -> Result<Vec<u8>, GridError> {
        let endpoint = self.url_for(variable)?;
        let url = endpoint.to_string();
        let year_field = year.to_string();
        info!("Downloading {} {} from {}", variable, year, url);

        let response = self
            .http
            .post(endpoint)
            .form(&[(variable.endpoint(), year_field.as_str())])
            .send()
            .await
            .map_err(|e| GridError::Network(url.clone(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GridError::HttpStatus { url, status });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| GridError::Network(url.clone(), e))?;

        info!("Downloaded {} bytes for {} {}", bytes.len(), variable, year);
        Ok(bytes.to_vec())
    }
}

fn is_transient(err: &GridError) -> bool {
    match err {
        GridError::Network(..) => true,
        GridError::HttpStatus { status, .. } => status.is_server_error(),
        _ => false,
    }
}
