//! Error types for curve construction.

use thiserror::Error;

/// Result type for curve operations.
pub type CurveResult<T> = Result<T, CurveError>;

/// Errors that can occur when building streamline curves.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CurveError {
    /// Too few vertices to fit a curve.
    #[error("invalid geometry: insufficient points, need at least {required}, got {actual}")]
    InsufficientPoints {
        /// Minimum required points.
        required: usize,
        /// Actual number of points provided.
        actual: usize,
    },

    /// A vertex has a NaN or infinite coordinate.
    #[error("invalid geometry: point {index} has a non-finite coordinate")]
    NonFinitePoint {
        /// Position of the offending point.
        index: usize,
    },
}

impl CurveError {
    /// Create an insufficient points error.
    #[must_use]
    pub fn insufficient_points(required: usize, actual: usize) -> Self {
        Self::InsufficientPoints { required, actual }
    }

    /// Check if this is an insufficient points error.
    #[must_use]
    pub fn is_insufficient_points(&self) -> bool {
        matches!(self, Self::InsufficientPoints { .. })
    }
}
