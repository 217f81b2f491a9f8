//! Streamline selection by endpoint membership.
//!
//! A streamline is selected when its first or last vertex lies in the
//! selection region. Interior vertices never take part.
//!
//! - [`StreamlineSelector`] - Box and mesh selection with explicit index reuse
//! - [`EndpointIndex`] - k-d tree over start and end points
//! - [`SelectionResult`] - Ascending indices with set operations and chaining
//!
//! Box regions are answered by clipping the endpoint tree; mesh regions by
//! classifying every endpoint with [`tract_interior`]. Selections compose:
//! run a second selection over [`SelectionResult::to_streamlines`] and map
//! it back with [`SelectionResult::refine`], or select against several
//! meshes at once with [`StreamlineSelector::select_by_meshes`].
//!
//! # Example
//!
//! ```
//! use tract_interior::RegionMesh;
//! use tract_select::{Membership, StreamlineSelector};
//! use tract_types::{Point3, Streamline};
//!
//! let streamlines = vec![
//!     Streamline::new(vec![Point3::new(0.0, 0.0, 0.0), Point3::new(5.0, 5.0, 5.0)]).unwrap(),
//!     Streamline::new(vec![Point3::new(3.0, 3.0, 3.0), Point3::new(4.0, 4.0, 4.0)]).unwrap(),
//! ];
//! let selector = StreamlineSelector::default();
//! let mesh = RegionMesh::unit_cube();
//!
//! let inside = selector.select_by_mesh(&streamlines, &mesh, Membership::Include).unwrap();
//! let outside = selector.select_by_mesh(&streamlines, &mesh, Membership::Exclude).unwrap();
//! assert_eq!(inside.indices(), &[0]);
//! assert_eq!(outside.indices(), &[1]);
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod config;
mod endpoints;
mod error;
mod region;
mod result;
mod selector;

pub use config::SelectionConfig;
pub use endpoints::EndpointIndex;
pub use error::{SelectError, SelectResult};
pub use region::{IndexSource, Membership, SelectionRegion};
pub use result::SelectionResult;
pub use selector::{StreamlineSelector, select_by_mesh, select_by_region};
