//! Tractography streamline selection and display geometry.
//!
//! This umbrella crate re-exports the tract-* crates behind one API. None of
//! them depend on a renderer; hosts hand in streamlines and meshes and get
//! back index lists and geometry buffers.
//!
//! # Quick Start
//!
//! ```
//! use tract::prelude::*;
//!
//! let tractogram = Tractogram::from_raw_lines(vec![
//!     vec![Point3::new(1.0, 1.0, 1.0), Point3::new(10.0, 10.0, 10.0)],
//!     vec![Point3::new(5.0, 5.0, 5.0), Point3::new(6.0, 6.0, 6.0)],
//! ])
//! .unwrap();
//! let streamlines = tractogram.streamlines();
//!
//! // Endpoint box selection
//! let selection = SelectionBox::new(
//!     Point3::origin(),
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(2.0, 2.0, 2.0),
//! );
//! let selector = StreamlineSelector::default();
//! let result = selector
//!     .select_by_region(streamlines, &selection, IndexSource::Rebuild)
//!     .unwrap();
//! assert_eq!(result.indices(), &[0]);
//!
//! // Display geometry for what was selected
//! let batch = GeometryBuilder::new(GeometryConfig::default())
//!     .build_curves(&result.to_streamlines(streamlines));
//! assert_eq!(batch.curves.len(), 1);
//! ```
//!
//! # Module Organization
//!
//! - [`types`] - Streamlines, tractograms, bounds and affine checks
//! - [`index`] - k-d tree and convex region clipping
//! - [`interior`] - Point-in-mesh classification
//! - [`select`] - Endpoint box and mesh selection
//! - [`curve`] - Spline geometry, frames, colors and curvature metrics
//!
//! # Feature Flags
//!
//! - `serde` - Serialize configs, regions and geometry types

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

// =============================================================================
// Re-exports
// =============================================================================

/// Streamlines, tractograms, bounds and affine checks.
pub use tract_types as types;

/// k-d tree and convex region clipping.
pub use tract_index as index;

/// Point-in-mesh classification.
pub use tract_interior as interior;

/// Endpoint box and mesh selection.
pub use tract_select as select;

/// Spline geometry, frames, colors and curvature metrics.
pub use tract_curve as curve;

// =============================================================================
// Prelude
// =============================================================================

/// Common imports for streamline selection.
///
/// # Usage
///
/// ```
/// use tract::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use tract_types::{Aabb, Matrix4, Point3, Streamline, Tractogram, Vector3};

    // Regions
    pub use tract_index::SelectionBox;
    pub use tract_interior::{InteriorConfig, RegionMesh};

    // Selection
    pub use tract_select::{
        IndexSource, Membership, SelectionConfig, SelectionRegion, SelectionResult,
        StreamlineSelector,
    };

    // Geometry
    pub use tract_curve::{ColorMode, GeometryBuilder, GeometryConfig, SplineCurve};
}

// =============================================================================
// Tests
// =============================================================================
