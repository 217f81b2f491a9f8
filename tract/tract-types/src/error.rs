//! Error types for streamline construction.

use thiserror::Error;

/// Result type for streamline operations.
pub type TractResult<T> = Result<T, TractError>;

/// Errors raised when raw streamline data is rejected at the API boundary.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TractError {
    /// A streamline has too few vertices to define a polyline.
    #[error("invalid geometry: streamline needs at least {required} vertices, got {actual}")]
    InsufficientVertices {
        /// Minimum number of vertices.
        required: usize,
        /// Number of vertices provided.
        actual: usize,
    },

    /// A flat coordinate buffer is not made of whole `xyz` triplets.
    #[error("invalid geometry: coordinate buffer of length {len} is not a multiple of 3")]
    MalformedBuffer {
        /// Length of the rejected buffer.
        len: usize,
    },

    /// A vertex has a NaN or infinite coordinate.
    #[error("invalid geometry: vertex {vertex} has a non-finite coordinate")]
    NonFiniteVertex {
        /// Position of the offending vertex in its streamline.
        vertex: usize,
    },

    /// A streamline inside a collection was rejected.
    #[error("streamline {index}: {reason}")]
    InvalidStreamline {
        /// Position of the streamline in the collection.
        index: usize,
        /// Why the streamline was rejected.
        reason: String,
    },
}

impl TractError {
    /// Create an insufficient vertices error.
    #[must_use]
    pub fn insufficient_vertices(required: usize, actual: usize) -> Self {
        Self::InsufficientVertices { required, actual }
    }

    /// Wrap an error with the index of the streamline that caused it.
    #[must_use]
    pub fn in_streamline(self, index: usize) -> Self {
        match self {
            Self::InvalidStreamline { .. } => self,
            other => Self::InvalidStreamline {
                index,
                reason: other.to_string(),
            },
        }
    }

    /// Position of the rejected streamline in its collection, if known.
    #[must_use]
    pub fn streamline_index(&self) -> Option<usize> {
        match self {
            Self::InvalidStreamline { index, .. } => Some(*index),
            Self::InsufficientVertices { .. }
            | Self::MalformedBuffer { .. }
            | Self::NonFiniteVertex { .. } => None,
        }
    }

    /// Check if this is an insufficient vertices error.
    #[must_use]
    pub fn is_insufficient_vertices(&self) -> bool {
        matches!(self, Self::InsufficientVertices { .. })
    }
}
