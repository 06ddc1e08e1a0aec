//! IMD variables and the geometry of their binary grids.
//!
//! Yearly files are raw little-endian `f32` values laid out day by day;
//! within a day rows run south to north and columns west to east.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};

use crate::domain::entities::VariableInfo;
use crate::domain::sources::GridError;

const VALUE_SIZE: usize = std::mem::size_of::<f32>();

/// Regular latitude/longitude grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    pub lat_start: f64,
    pub lon_start: f64,
    pub step: f64,
    pub lat_count: usize,
    pub lon_count: usize,
    pub missing: f32,
}

/// 0.25° daily rainfall grid.
pub const RAIN_GRID: GridSpec = GridSpec {
    lat_start: 6.5,
    lon_start: 66.5,
    step: 0.25,
    lat_count: 129,
    lon_count: 135,
    missing: -999.0,
};

/// 1.0° daily temperature grid shared by `tmax` and `tmin`.
pub const TEMPERATURE_GRID: GridSpec = GridSpec {
    lat_start: 7.5,
    lon_start: 67.5,
    step: 1.0,
    lat_count: 31,
    lon_count: 31,
    missing: 99.9,
};

impl GridSpec {
    pub fn cells(&self) -> usize {
        self.lat_count * self.lon_count
    }

    pub fn day_bytes(&self) -> usize {
        self.cells() * VALUE_SIZE
    }

    pub fn lat_end(&self) -> f64 {
        self.lat_start + self.step * (self.lat_count - 1) as f64
    }

    pub fn lon_end(&self) -> f64 {
        self.lon_start + self.step * (self.lon_count - 1) as f64
    }

    /// Row and column of the cell nearest to a coordinate.
    ///
    /// Returns `None` when the coordinate is more than half a cell outside
    /// the grid extent.
    pub fn nearest_index(&self, lat: f64, lon: f64) -> Option<(usize, usize)> {
        let row = nearest_axis_index(lat, self.lat_start, self.step, self.lat_count)?;
        let col = nearest_axis_index(lon, self.lon_start, self.step, self.lon_count)?;
        Some((row, col))
    }

    /// Centre of a grid cell as `(lat, lon)`.
    pub fn cell_center(&self, row: usize, col: usize) -> (f64, f64) {
        (
            self.lat_start + self.step * row as f64,
            self.lon_start + self.step * col as f64,
        )
    }

    /// Byte offset of one cell on one day inside a yearly file.
    pub fn offset(&self, day: usize, row: usize, col: usize) -> u64 {
        ((day * self.cells() + row * self.lon_count + col) * VALUE_SIZE) as u64
    }

    /// True if `value` is the missing-data sentinel or not a number.
    pub fn is_missing(&self, value: f32) -> bool {
        value.is_nan() || (value - self.missing).abs() < 1e-3
    }

    /// Number of days stored in a yearly file of `len` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Format`] if the file is empty, holds a partial
    /// day, or more days than the year has.
    pub fn days_in_file(&self, variable: &str, year: i32, len: u64) -> Result<usize, GridError> {
        let format_error = |reason: String| GridError::Format {
            variable: variable.to_string(),
            year,
            reason,
        };

        let day_bytes = self.day_bytes() as u64;
        if len == 0 {
            return Err(format_error("file is empty".to_string()));
        }
        if len % day_bytes != 0 {
            return Err(format_error(format!(
                "{len} bytes is not a whole number of {day_bytes}-byte days"
            )));
        }

        let days = (len / day_bytes) as usize;
        let max_days = days_in_year(year);
        if days > max_days {
            return Err(format_error(format!(
                "{days} days exceeds the {max_days} days of the year"
            )));
        }

        Ok(days)
    }
}

fn nearest_axis_index(value: f64, start: f64, step: f64, count: usize) -> Option<usize> {
    if !value.is_finite() {
        return None;
    }
    let position = ((value - start) / step).round();
    if position < 0.0 || position > (count - 1) as f64 {
        return None;
    }
    Some(position as usize)
}

pub fn days_in_year(year: i32) -> usize {
    NaiveDate::from_ymd_opt(year, 12, 31)
        .map(|d| d.ordinal() as usize)
        .unwrap_or(365)
}

/// Variables served by the IMD Pune gridded data service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImdVariable {
    Rain,
    Tmax,
    Tmin,
}

impl ImdVariable {
    pub const ALL: [ImdVariable; 3] = [Self::Rain, Self::Tmax, Self::Tmin];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Rain => "rain",
            Self::Tmax => "tmax",
            Self::Tmin => "tmin",
        }
    }

    /// Download script name, also used as the form field carrying the year.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Rain => "RF25",
            Self::Tmax => "maxtemp",
            Self::Tmin => "mintemp",
        }
    }

    pub fn grid(&self) -> GridSpec {
        match self {
            Self::Rain => RAIN_GRID,
            Self::Tmax | Self::Tmin => TEMPERATURE_GRID,
        }
    }

    pub fn first_year(&self) -> i32 {
        match self {
            Self::Rain => 1901,
            Self::Tmax | Self::Tmin => 1951,
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Self::Rain => "mm/day",
            Self::Tmax | Self::Tmin => "°C",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Rain => "Daily gridded rainfall",
            Self::Tmax => "Daily gridded maximum temperature",
            Self::Tmin => "Daily gridded minimum temperature",
        }
    }

    pub fn info(&self) -> VariableInfo {
        let grid = self.grid();
        VariableInfo {
            name: self.name().to_string(),
            description: self.description().to_string(),
            unit: self.unit().to_string(),
            resolution_deg: grid.step,
            first_year: self.first_year(),
            lat_range: [grid.lat_start, grid.lat_end()],
            lon_range: [grid.lon_start, grid.lon_end()],
        }
    }
}

impl fmt::Display for ImdVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ImdVariable {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.name() == s)
            .ok_or_else(|| GridError::UnknownVariable(s.to_string()))
    }
}
