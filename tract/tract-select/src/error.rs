//! Error types for streamline selection.

use thiserror::Error;
use tract_interior::InteriorError;

/// Result type for selection operations.
pub type SelectResult<T> = Result<T, SelectError>;

/// Errors that can occur during selection.
///
/// An empty selection is not an error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectError {
    /// A cached endpoint index was built for a different collection.
    #[error(
        "stale endpoint index: built over {index_streamlines} streamlines, \
         selection input has {streamline_count}"
    )]
    StaleIndex {
        /// Streamlines covered by the cached index.
        index_streamlines: usize,
        /// Streamlines passed to the selection.
        streamline_count: usize,
    },

    /// A cached endpoint index has the right length but was built over
    /// different endpoints.
    #[error(
        "stale endpoint index: built over a different collection of \
         {streamline_count} streamlines"
    )]
    ForeignIndex {
        /// Streamlines passed to the selection.
        streamline_count: usize,
    },

    /// The selection mesh was rejected or the worker pool failed.
    #[error(transparent)]
    Interior(#[from] InteriorError),
}

impl SelectError {
    /// Create a stale index error.
    #[must_use]
    pub fn stale_index(index_streamlines: usize, streamline_count: usize) -> Self {
        Self::StaleIndex {
            index_streamlines,
            streamline_count,
        }
    }

    /// Create an error for a same-length index over other endpoints.
    #[must_use]
    pub fn foreign_index(streamline_count: usize) -> Self {
        Self::ForeignIndex { streamline_count }
    }

    /// Check if a cached index was rejected, for either reason.
    #[must_use]
    pub fn is_stale_index(&self) -> bool {
        matches!(self, Self::StaleIndex { .. } | Self::ForeignIndex { .. })
    }

    /// Check if the error describes malformed input geometry.
    #[must_use]
    pub fn is_invalid_geometry(&self) -> bool {
        match self {
            Self::Interior(err) => err.is_invalid_geometry(),
            Self::StaleIndex { .. } | Self::ForeignIndex { .. } => false,
        }
    }
}
