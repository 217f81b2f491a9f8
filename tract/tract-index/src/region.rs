//! Query regions for tree traversal.

use tract_types::{Aabb, Point3};

/// How a bounding box relates to a query region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Containment {
    /// No point of the box can be inside the region.
    Outside,
    /// Every point of the box is inside the region.
    Inside,
    /// The box straddles the region boundary.
    Partial,
}

/// A closed volume that a spatial index can be queried against.
///
/// `classify_box` must be conservative with respect to `contains`: a box
/// reported [`Containment::Outside`] holds no point for which `contains` is
/// true, and a box reported [`Containment::Inside`] holds no point for which
/// it is false. Returning [`Containment::Partial`] is always correct.
pub trait Region {
    /// Whether the point lies in the region. Boundaries are inclusive.
    fn contains(&self, point: &Point3<f64>) -> bool;

    /// Classify an axis-aligned box against the region.
    fn classify_box(&self, bounds: &Aabb) -> Containment;
}

impl Region for Aabb {
    fn contains(&self, point: &Point3<f64>) -> bool {
        Aabb::contains(self, point)
    }

    fn classify_box(&self, bounds: &Aabb) -> Containment {
        if !self.intersects(bounds) {
            Containment::Outside
        } else if self.contains_box(bounds) {
            Containment::Inside
        } else {
            Containment::Partial
        }
    }
}

impl<R: Region + ?Sized> Region for &R {
    fn contains(&self, point: &Point3<f64>) -> bool {
        (**self).contains(point)
    }

    fn classify_box(&self, bounds: &Aabb) -> Containment {
        (**self).classify_box(bounds)
    }
}
