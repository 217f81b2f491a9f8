//! Error types for mesh interior testing.

use thiserror::Error;

/// Result type for interior operations.
pub type InteriorResult<T> = Result<T, InteriorError>;

/// Errors raised when a selection mesh is rejected or the worker pool
/// cannot be created.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InteriorError {
    /// The mesh has no triangles.
    #[error("invalid geometry: selection mesh has no triangles")]
    EmptyMesh,

    /// A triangle refers to a vertex that does not exist.
    #[error("invalid geometry: face {face} references vertex {vertex}, mesh has {vertex_count} vertices")]
    InvalidFaceIndex {
        /// Face position.
        face: usize,
        /// Offending vertex index.
        vertex: u32,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },

    /// A flat buffer does not divide into whole triplets.
    #[error("invalid geometry: {buffer} buffer of length {len} is not a multiple of 3")]
    MalformedBuffer {
        /// Which buffer was rejected ("vertex" or "index").
        buffer: &'static str,
        /// Length of the buffer.
        len: usize,
    },

    /// A vertex has a NaN or infinite coordinate.
    #[error("invalid geometry: mesh vertex {vertex} has a non-finite coordinate")]
    NonFiniteVertex {
        /// Position of the offending vertex.
        vertex: usize,
    },

    /// The worker pool could not be created.
    #[error("failed to build worker pool: {reason}")]
    WorkerPool {
        /// Message from the thread pool builder.
        reason: String,
    },
}

impl InteriorError {
    /// Create a worker pool error from any displayable cause.
    #[must_use]
    pub fn worker_pool(reason: impl std::fmt::Display) -> Self {
        Self::WorkerPool {
            reason: reason.to_string(),
        }
    }

    /// Check if the error describes malformed mesh input.
    #[must_use]
    pub fn is_invalid_geometry(&self) -> bool {
        !matches!(self, Self::WorkerPool { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = InteriorError::InvalidFaceIndex {
            face: 3,
            vertex: 99,
            vertex_count: 8,
        };
        let msg = err.to_string();
        assert!(msg.contains("face 3"));
        assert!(msg.contains("vertex 99"));
        assert!(msg.contains("8 vertices"));

        assert!(InteriorError::EmptyMesh.to_string().contains("no triangles"));
    }

    #[test]
    fn test_error_predicates() {
        assert!(InteriorError::EmptyMesh.is_invalid_geometry());
        assert!(
            InteriorError::MalformedBuffer {
                buffer: "vertex",
                len: 4
            }
            .is_invalid_geometry()
        );
        assert!(!InteriorError::worker_pool("no threads").is_invalid_geometry());
    }
}
