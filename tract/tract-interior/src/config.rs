//! Configuration for interior testing.
//!
//! # Presets
//!
//! - [`InteriorConfig::default()`] - 8 workers, 1.0 model-unit search padding
//! - [`InteriorConfig::precise()`] - Tighter boundary and tangent tolerances
//! - [`InteriorConfig::sequential()`] - Single worker, no parallel overhead
//!
//! # Example
//!
//! ```
//! use tract_interior::InteriorConfig;
//!
//! let config = InteriorConfig::default()
//!     .with_worker_count(4)
//!     .with_epsilon(0.5);
//! assert_eq!(config.worker_count, 4);
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default number of workers in a classification pool.
pub const DEFAULT_WORKER_COUNT: usize = 8;

/// Configuration for [`InteriorTester`](crate::InteriorTester).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InteriorConfig {
    /// Padding, in model units, applied to BVH node bounds when gathering
    /// candidate triangles for the parity ray.
    ///
    /// Larger values only cost extra candidate tests; they never change
    /// the classification. Boundary probes use `boundary_tolerance`.
    pub epsilon: f64,

    /// Points closer than this to any triangle are on the boundary and
    /// classified inside.
    pub boundary_tolerance: f64,

    /// Rays whose angle cosine with a triangle's plane normal is below this
    /// are treated as tangent and do not count as a crossing.
    pub parallel_tolerance: f64,

    /// Barycentric distance from a triangle edge below which a ray crossing
    /// counts as passing through the edge. Such a ray is discarded and the
    /// point is re-tested along another direction.
    pub edge_tolerance: f64,

    /// Number of workers used by [`classify_points`](crate::InteriorTester::classify_points).
    pub worker_count: usize,

    /// Maximum triangles per BVH leaf.
    pub bvh_leaf_size: usize,

    /// Batches smaller than this are classified on the calling thread.
    pub parallel_threshold: usize,
}

impl Default for InteriorConfig {
    fn default() -> Self {
        Self {
            epsilon: 1.0,
            boundary_tolerance: 1e-9,
            parallel_tolerance: 1e-12,
            edge_tolerance: 1e-9,
            worker_count: DEFAULT_WORKER_COUNT,
            bvh_leaf_size: 8,
            parallel_threshold: 256,
        }
    }
}

impl InteriorConfig {
    /// Tighter tolerances for small, finely tessellated meshes.
    #[must_use]
    pub fn precise() -> Self {
        Self {
            epsilon: 1e-3,
            boundary_tolerance: 1e-12,
            parallel_tolerance: 1e-15,
            edge_tolerance: 1e-12,
            bvh_leaf_size: 4,
            ..Self::default()
        }
    }

    /// Classify everything on the calling thread.
    #[must_use]
    pub fn sequential() -> Self {
        Self {
            worker_count: 1,
            parallel_threshold: usize::MAX,
            ..Self::default()
        }
    }

    /// Set the candidate search padding.
    #[must_use]
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon.abs();
        self
    }

    /// Set the boundary tolerance.
    #[must_use]
    pub fn with_boundary_tolerance(mut self, tolerance: f64) -> Self {
        self.boundary_tolerance = tolerance.abs();
        self
    }

    /// Set the tangent rejection threshold.
    #[must_use]
    pub fn with_parallel_tolerance(mut self, tolerance: f64) -> Self {
        self.parallel_tolerance = tolerance.abs();
        self
    }

    /// Set the edge tolerance.
    #[must_use]
    pub fn with_edge_tolerance(mut self, tolerance: f64) -> Self {
        self.edge_tolerance = tolerance.abs();
        self
    }

    /// Set the worker count (at least 1).
    #[must_use]
    pub fn with_worker_count(mut self, workers: usize) -> Self {
        self.worker_count = workers.max(1);
        self
    }

    /// Set the BVH leaf size (at least 1).
    #[must_use]
    pub fn with_bvh_leaf_size(mut self, size: usize) -> Self {
        self.bvh_leaf_size = size.max(1);
        self
    }

    /// Set the parallel threshold.
    #[must_use]
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }
}
