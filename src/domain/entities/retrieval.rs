//! Retrieval request entity and its year range.

use std::collections::HashSet;
use std::ops::RangeInclusive;
use std::sync::LazyLock;

use regex::Regex;
use validator::{Validate, ValidationError};

use super::coordinate::NormalizedCoordinate;

/// Variable names end up in file names and glob patterns.
static VARIABLE_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

/// Inclusive range of calendar years.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    /// Iterates every year in the range, oldest first.
    pub fn years(&self) -> RangeInclusive<i32> {
        self.start..=self.end
    }

    /// Number of years covered, zero for an inverted range.
    pub fn len(&self) -> usize {
        if self.end < self.start {
            0
        } else {
            (self.end - self.start) as usize + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A validated request for point time series of one or more variables.
///
/// Coordinates are kept unrounded: grid cell selection uses the exact
/// values, while [`NormalizedCoordinate`] only drives output file naming.
#[derive(Debug, Clone, Validate)]
#[validate(schema(function = "validate_year_order"))]
pub struct RetrievalRequest {
    pub start_year: i32,
    pub end_year: i32,
    pub latitude: f64,
    pub longitude: f64,

    #[validate(
        length(min = 1, message = "At least one variable is required"),
        custom(function = "validate_variable_names")
    )]
    pub variables: Vec<String>,
}

impl RetrievalRequest {
    pub fn new(
        start_year: i32,
        end_year: i32,
        latitude: f64,
        longitude: f64,
        variables: Vec<String>,
    ) -> Self {
        Self {
            start_year,
            end_year,
            latitude,
            longitude,
            variables,
        }
    }

    pub fn years(&self) -> YearRange {
        YearRange::new(self.start_year, self.end_year)
    }

    pub fn normalized_coordinate(&self) -> NormalizedCoordinate {
        NormalizedCoordinate::new(self.latitude, self.longitude)
    }
}

fn validate_year_order(request: &RetrievalRequest) -> Result<(), ValidationError> {
    if request.start_year > request.end_year {
        let mut err = ValidationError::new("year_order");
        err.message = Some(
            format!(
                "start_yr ({}) must not be after end_yr ({})",
                request.start_year, request.end_year
            )
            .into(),
        );
        return Err(err);
    }
    Ok(())
}

fn validate_variable_names(variables: &[String]) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(variables.len());

    for name in variables {
        if !VARIABLE_NAME_REGEX.is_match(name) {
            let mut err = ValidationError::new("variable_name");
            err.message = Some(
                format!("Invalid variable name '{name}': use letters, digits, '_' or '-'").into(),
            );
            return Err(err);
        }

        if !seen.insert(name.as_str()) {
            let mut err = ValidationError::new("duplicate_variable");
            err.message = Some(format!("Variable '{name}' is requested more than once").into());
            return Err(err);
        }
    }

    Ok(())
}
