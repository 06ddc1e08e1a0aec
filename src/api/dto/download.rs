//! DTO for the download endpoint.
//!
//! Fields arrive as loose JSON so that clients may send years and
//! coordinates either as numbers or as numeric strings. Coercion happens in
//! [`DownloadRequest::into_retrieval_request`], which names the offending
//! field in every error message.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::entities::RetrievalRequest;
use crate::error::AppError;

/// Raw body of `POST /download`.
///
/// # Example
///
/// ```json
/// {
///   "start_yr": 2020,
///   "end_yr": "2021",
///   "lat": 28.61,
///   "lon": "77.21",
///   "variables": ["rain", "tmax"]
/// }
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct DownloadRequest {
    pub start_yr: Option<Value>,
    pub end_yr: Option<Value>,
    pub lat: Option<Value>,
    pub lon: Option<Value>,
    pub variables: Option<Value>,
}

impl DownloadRequest {
    /// Coerces every field into a [`RetrievalRequest`].
    ///
    /// Cross-field rules (year order, variable names) are left to the
    /// request's own validation.
    pub fn into_retrieval_request(self) -> Result<RetrievalRequest, AppError> {
        let start_year = year_field("start_yr", self.start_yr)?;
        let end_year = year_field("end_yr", self.end_yr)?;
        let latitude = coordinate_field("lat", self.lat)?;
        let longitude = coordinate_field("lon", self.lon)?;
        let variables = variables_field(self.variables)?;

        Ok(RetrievalRequest::new(
            start_year, end_year, latitude, longitude, variables,
        ))
    }
}

fn required(name: &str, value: Option<Value>) -> Result<Value, AppError> {
    match value {
        None | Some(Value::Null) => Err(AppError::bad_request(format!(
            "Missing required field '{name}'"
        ))),
        Some(value) => Ok(value),
    }
}

fn year_field(name: &str, value: Option<Value>) -> Result<i32, AppError> {
    let value = required(name, value)?;
    let invalid = || AppError::bad_request(format!("Field '{name}' must be an integer year"));

    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return i32::try_from(i).map_err(|_| invalid());
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f >= i32::MIN as f64 && f <= i32::MAX as f64 => {
                    Ok(f as i32)
                }
                _ => Err(invalid()),
            }
        }
        Value::String(s) => s.trim().parse::<i32>().map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

fn coordinate_field(name: &str, value: Option<Value>) -> Result<f64, AppError> {
    let value = required(name, value)?;
    let invalid = || AppError::bad_request(format!("Field '{name}' must be a number"));

    let number = match value {
        Value::Number(n) => n.as_f64().ok_or_else(invalid)?,
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| invalid())?,
        _ => return Err(invalid()),
    };

    if number.is_finite() {
        Ok(number)
    } else {
        Err(invalid())
    }
}

fn variables_field(value: Option<Value>) -> Result<Vec<String>, AppError> {
    let value = required("variables", value)?;
    let invalid = || AppError::bad_request("Field 'variables' must be a list of strings");

    let Value::Array(items) = value else {
        return Err(invalid());
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::String(s) => Ok(s),
            _ => Err(invalid()),
        })
        .collect()
}
