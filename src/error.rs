//! Error type shared by loaders, the standardizer and the regional aggregation

use thiserror::Error;

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, StandardizationError>;

#[derive(Debug, Error)]
pub enum StandardizationError {
    /// A country or location was requested that the table does not contain
    #[error("country not found: {country}")]
    MissingCountry { country: String },

    /// Rates and weights have different lengths
    #[error("length mismatch: {rates} rates vs {weights} weights")]
    LengthMismatch { rates: usize, weights: usize },

    /// Normalization divisor is zero (empty or all-zero counts)
    #[error("total population is zero")]
    ZeroTotalPopulation,

    /// Keyed series do not cover the same age buckets
    #[error("age buckets do not match (missing in rates: [{}], missing in weights: [{}])",
        .missing_in_rates.join(", "), .missing_in_weights.join(", "))]
    BucketMismatch {
        missing_in_rates: Vec<String>,
        missing_in_weights: Vec<String>,
    },

    /// Negative or non-finite count/weight
    #[error("invalid value {value} at position {index}")]
    InvalidValue { index: usize, value: f64 },

    #[error("invalid age bucket label: {0:?}")]
    InvalidAgeBucket(String),

    /// Malformed input row
    #[error("row {row}: {message}")]
    Parse { row: usize, message: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl StandardizationError {
    pub fn missing_country(country: impl Into<String>) -> Self {
        Self::MissingCountry { country: country.into() }
    }

    pub(crate) fn parse(row: usize, message: impl Into<String>) -> Self {
        Self::Parse { row, message: message.into() }
    }
}

/// 1-based line of a CSV record, for error messages
pub(crate) fn record_line(record: &csv::StringRecord) -> usize {
    record.position().map_or(0, |position| position.line() as usize)
}
