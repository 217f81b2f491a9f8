//! Core types for tractography streamline selection.
//!
//! This crate provides the foundational value types shared by the
//! selection engine:
//!
//! - [`Streamline`] - One fiber tract, an ordered polyline of at least two vertices
//! - [`Tractogram`] - An ordered streamline collection plus its voxel-to-world affine
//! - [`EndpointEntry`] - A `(streamline index, endpoint role)` payload for spatial indices
//! - [`Aabb`] - Axis-aligned bounding box with inclusive containment
//! - [`AffineReport`] - Sanity checks for the tractogram affine (inverse, shear)
//!
//! # Layer 0 Crate
//!
//! This crate has no rendering or file-format dependencies. Streamlines are
//! handed over already materialized in memory by an external reader.
//!
//! # Units
//!
//! All coordinates are `f64` and unit-agnostic. Streamlines and selection
//! volumes must live in the same space before they are compared.
//!
//! # Example
//!
//! ```
//! use tract_types::{Point3, Streamline, Tractogram};
//!
//! let line = Streamline::new(vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//! ])
//! .unwrap();
//!
//! let tractogram = Tractogram::new(vec![line]);
//! assert_eq!(tractogram.len(), 1);
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod affine;
mod bounds;
mod error;
mod streamline;

pub use affine::{AffineReport, DEFAULT_AFFINE_TOLERANCE, transform_point};
pub use bounds::Aabb;
pub use error::{TractError, TractResult};
pub use streamline::{
    EndpointEntry, EndpointRole, MIN_STREAMLINE_VERTICES, PADDING_VERTEX_NORM, Streamline,
    Tractogram,
};

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix4, Point3, Vector3};
