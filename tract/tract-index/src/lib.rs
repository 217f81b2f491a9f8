//! Static spatial index and convex clipping for streamline endpoints.
//!
//! - [`KdTree`] - Immutable balanced k-d tree over `(point, payload)` pairs
//! - [`HalfSpace`] / [`ConvexPolytope`] - Closed convex regions
//! - [`SelectionBox`] - Axis-aligned selection volume given as position plus extents
//! - [`clip`] - Collect the payloads inside a polytope with subtree pruning
//!
//! All queries are exact: no point inside the region is ever missed and
//! boundaries are inclusive.
//!
//! # Example
//!
//! ```
//! use tract_index::{KdTree, SelectionBox, clip};
//! use tract_types::Point3;
//!
//! let points = (0..100).map(|i| (Point3::new(f64::from(i), 0.0, 0.0), i));
//! let tree = KdTree::build(points);
//!
//! let selection = SelectionBox::new(
//!     Point3::new(10.0, 0.0, 0.0),
//!     Point3::new(-2.0, -1.0, -1.0),
//!     Point3::new(2.0, 1.0, 1.0),
//! );
//!
//! let result = clip(&tree, &selection.to_polytope());
//! assert_eq!(result.inside, vec![&8, &9, &10, &11, &12]);
//! ```
//!
//! # Thread Safety
//!
//! A built tree is read-only and `Sync` whenever its payload is, so one
//! tree can serve concurrent queries from many threads.

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod clip;
mod kdtree;
mod polytope;
mod region;

pub use clip::{ClipResult, clip};
pub use kdtree::{DEFAULT_LEAF_SIZE, KdTree, TraversalStats};
pub use polytope::{ConvexPolytope, HalfSpace, SelectionBox};
pub use region::{Containment, Region};
