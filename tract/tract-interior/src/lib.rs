//! Point-in-mesh classification against closed triangle meshes.
//!
//! A point is inside a closed mesh when a ray cast from it crosses the
//! surface an odd number of times. This crate provides:
//!
//! - [`RegionMesh`] - Validated, immutable selection mesh
//! - [`Bvh`] - Bounding volume hierarchy that narrows ray candidates
//! - [`InteriorTester`] - Single-point and batch classification
//! - [`MeshQuality`] - Watertightness report attached to every batch result
//!
//! Points within [`InteriorConfig::boundary_tolerance`] of the surface are
//! treated as inside, which keeps boundary results deterministic. A ray that
//! passes through a mesh edge or vertex is discarded and the point is tested
//! again along the next of a fixed set of directions.
//!
//! # Example
//!
//! ```
//! use tract_interior::{InteriorConfig, RegionMesh, classify_points};
//! use tract_types::Point3;
//!
//! let mesh = RegionMesh::unit_cube();
//! let points = [
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(10.0, 10.0, 10.0),
//!     Point3::new(0.5, 0.0, 0.0),
//! ];
//!
//! let result = classify_points(&mesh, &points, &InteriorConfig::default()).unwrap();
//! assert_eq!(result.inside, vec![0, 2]);
//! assert!(result.warning.is_none());
//! ```
//!
//! # Parallelism
//!
//! Batch classification runs on a rayon pool of
//! [`InteriorConfig::worker_count`] threads that lives only for the call.
//! Callers that classify many batches can hand in their own pool through
//! [`InteriorTester::classify_points_in`]. Results never depend on the
//! number of workers.

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod adjacency;
mod bvh;
mod config;
mod error;
mod intersect;
mod mesh;
mod tester;

pub use adjacency::{MeshQuality, MeshQualityWarning};
pub use bvh::{Bvh, BvhNode};
pub use config::{DEFAULT_WORKER_COUNT, InteriorConfig};
pub use error::{InteriorError, InteriorResult};
pub use intersect::{RayCrossing, is_degenerate, point_triangle_distance, ray_triangle_crossing};
pub use mesh::RegionMesh;
pub use tester::{
    Classification, InteriorTester, PointInMeshResult, QueryScratch, RAY_DIRECTIONS, classify_points,
};
