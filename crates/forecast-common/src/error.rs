//! Error types for forecast datasets.

use thiserror::Error;

/// Result type alias using ForecastError.
pub type ForecastResult<T> = Result<T, ForecastError>;

/// Errors raised while building or interpreting a forecast dataset.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("Shape mismatch for '{var}': expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        var: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Invalid leadtime coordinate: {0}")]
    InvalidLeadtime(String),

    #[error("Invalid time specification: {0}")]
    InvalidTime(String),

    #[error("Array error: {0}")]
    Array(#[from] ndarray::ShapeError),
}
