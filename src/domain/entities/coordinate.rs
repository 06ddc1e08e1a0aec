//! Coordinate normalization used for output file naming.

/// A coordinate rounded to two decimal places.
///
/// Rounding is half away from zero on the binary value of `x * 100`,
/// and negative zero is folded into `0.00`. The rounded values name
/// output files only; grid cell selection always uses the raw request
/// coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedCoordinate {
    pub lat_rounded: f64,
    pub lon_rounded: f64,
}

impl NormalizedCoordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            lat_rounded: round_to_hundredths(latitude),
            lon_rounded: round_to_hundredths(longitude),
        }
    }

    /// Coordinate part of output file names, e.g. `11.00_79.00`.
    pub fn suffix(&self) -> String {
        format!("{:.2}_{:.2}", self.lat_rounded, self.lon_rounded)
    }

    /// Output CSV name for one variable, e.g. `rain_11.00_79.00.csv`.
    pub fn output_file_name(&self, variable: &str) -> String {
        format!("{}_{}.csv", variable, self.suffix())
    }
}

fn round_to_hundredths(value: f64) -> f64 {
    // `+ 0.0` turns -0.0 into 0.0
    (value * 100.0).round() / 100.0 + 0.0
}
