//! Catalog entry describing a variable a grid source can serve.

use serde::Serialize;

/// Static description of one gridded variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableInfo {
    pub name: String,
    pub description: String,
    pub unit: String,
    /// Grid spacing in degrees.
    pub resolution_deg: f64,
    pub first_year: i32,
    /// `[south, north]` cell centres in degrees.
    pub lat_range: [f64; 2],
    /// `[west, east]` cell centres in degrees.
    pub lon_range: [f64; 2],
}
