//! Configuration for streamline selection.

use tract_index::DEFAULT_LEAF_SIZE;
use tract_interior::InteriorConfig;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for [`StreamlineSelector`](crate::StreamlineSelector).
///
/// # Example
///
/// ```
/// use tract_select::SelectionConfig;
///
/// let config = SelectionConfig::default().with_worker_count(2).with_leaf_size(16);
/// assert_eq!(config.interior.worker_count, 2);
/// assert_eq!(config.leaf_size, 16);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SelectionConfig {
    /// Settings for mesh mode.
    pub interior: InteriorConfig,
    /// Points per k-d tree leaf for box mode.
    pub leaf_size: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            interior: InteriorConfig::default(),
            leaf_size: DEFAULT_LEAF_SIZE,
        }
    }
}

impl SelectionConfig {
    /// Tighter mesh tolerances.
    #[must_use]
    pub fn precise() -> Self {
        Self {
            interior: InteriorConfig::precise(),
            ..Self::default()
        }
    }

    /// Set the interior configuration.
    #[must_use]
    pub fn with_interior(mut self, interior: InteriorConfig) -> Self {
        self.interior = interior;
        self
    }

    /// Set the number of mesh-mode workers.
    #[must_use]
    pub fn with_worker_count(mut self, workers: usize) -> Self {
        self.interior = self.interior.with_worker_count(workers);
        self
    }

    /// Set the k-d tree leaf size (at least 1).
    #[must_use]
    pub fn with_leaf_size(mut self, leaf_size: usize) -> Self {
        self.leaf_size = leaf_size.max(1);
        self
    }
}
