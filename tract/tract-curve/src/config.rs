//! Configuration for curve building.
//!
//! # Example
//!
//! ```
//! use tract_curve::{ColorMode, GeometryConfig};
//!
//! let config = GeometryConfig::default()
//!     .with_smoothing(4)
//!     .with_color_mode(ColorMode::LocalDirection);
//! assert_eq!(config.max_streamline_count, 1000);
//! ```

use crate::color::ColorMode;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default number of curves materialized at once.
pub const DEFAULT_MAX_STREAMLINE_COUNT: usize = 1000;

/// Configuration for [`GeometryBuilder`](crate::GeometryBuilder).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeometryConfig {
    /// Interpolated spline points between each pair of raw vertices.
    pub smoothing: usize,
    /// Segment coloring.
    pub color_mode: ColorMode,
    /// Upper bound on curves built by one batch. A display throttle only;
    /// selection never looks at it.
    pub max_streamline_count: usize,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            smoothing: 2,
            color_mode: ColorMode::GlobalDirection,
            max_streamline_count: DEFAULT_MAX_STREAMLINE_COUNT,
        }
    }
}

impl GeometryConfig {
    /// Raw polylines without interpolation, for very large batches.
    #[must_use]
    pub fn coarse() -> Self {
        Self {
            smoothing: 0,
            ..Self::default()
        }
    }

    /// Set the smoothing factor.
    #[must_use]
    pub fn with_smoothing(mut self, smoothing: usize) -> Self {
        self.smoothing = smoothing;
        self
    }

    /// Set the color mode.
    #[must_use]
    pub fn with_color_mode(mut self, mode: ColorMode) -> Self {
        self.color_mode = mode;
        self
    }

    /// Set the display budget.
    #[must_use]
    pub fn with_max_streamline_count(mut self, count: usize) -> Self {
        self.max_streamline_count = count;
        self
    }
}
