//! Selection regions and index reuse.

use crate::endpoints::EndpointIndex;
use tract_index::SelectionBox;
use tract_interior::RegionMesh;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Whether mesh mode keeps streamlines touching the mesh or avoiding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Membership {
    /// Keep streamlines with at least one endpoint inside.
    #[default]
    Include,
    /// Keep streamlines with no endpoint inside.
    Exclude,
}

impl Membership {
    /// Whether a streamline with `hit` endpoints inside is kept.
    #[inline]
    #[must_use]
    pub fn keeps(self, hit: bool) -> bool {
        match self {
            Self::Include => hit,
            Self::Exclude => !hit,
        }
    }
}

impl From<bool> for Membership {
    /// `true` is inclusion, `false` exclusion.
    fn from(inclusion: bool) -> Self {
        if inclusion { Self::Include } else { Self::Exclude }
    }
}

/// The volume a selection is made against.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionRegion {
    /// Axis-aligned box, answered through the endpoint k-d tree.
    Box(SelectionBox),
    /// Closed triangle mesh, answered by parallel interior tests.
    Mesh {
        /// The selection mesh in streamline coordinates.
        mesh: RegionMesh,
        /// Inclusion or exclusion.
        membership: Membership,
    },
}

impl SelectionRegion {
    /// A mesh region that keeps streamlines ending inside it.
    #[must_use]
    pub fn inside_mesh(mesh: RegionMesh) -> Self {
        Self::Mesh {
            mesh,
            membership: Membership::Include,
        }
    }

    /// A mesh region that keeps streamlines never ending inside it.
    #[must_use]
    pub fn outside_mesh(mesh: RegionMesh) -> Self {
        Self::Mesh {
            mesh,
            membership: Membership::Exclude,
        }
    }
}

impl From<SelectionBox> for SelectionRegion {
    fn from(selection: SelectionBox) -> Self {
        Self::Box(selection)
    }
}

/// Where box mode gets its endpoint index from.
///
/// Reuse is always explicit; a cached index is never guessed from the
/// identity of the input slice.
#[derive(Debug, Clone, Copy, Default)]
pub enum IndexSource<'a> {
    /// Use this prebuilt index. It must cover exactly the input collection;
    /// the streamline count and an endpoint fingerprint are checked on
    /// every call.
    Cached(&'a EndpointIndex),
    /// Build a fresh index for this call.
    #[default]
    Rebuild,
}
