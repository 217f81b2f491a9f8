//! Half-spaces, convex polytopes and axis-aligned selection boxes.

use crate::region::{Containment, Region};
use nalgebra::Vector3;
use tract_types::{Aabb, Point3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A closed half-space `{ p : normal · p + offset >= 0 }`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HalfSpace {
    normal: Vector3<f64>,
    offset: f64,
}

impl HalfSpace {
    /// Create a half-space, rescaling so that the normal has unit length.
    ///
    /// A zero normal is kept as is; the half-space is then either all of
    /// space (`offset >= 0`) or empty.
    #[must_use]
    pub fn new(normal: Vector3<f64>, offset: f64) -> Self {
        let norm = normal.norm();
        if norm > 0.0 && (norm - 1.0).abs() > f64::EPSILON {
            Self {
                normal: normal / norm,
                offset: offset / norm,
            }
        } else {
            Self { normal, offset }
        }
    }

    /// Half-space whose boundary passes through `point`, keeping the side
    /// that `normal` points into.
    #[must_use]
    pub fn through_point(normal: Vector3<f64>, point: &Point3<f64>) -> Self {
        Self::new(normal, -normal.dot(&point.coords))
    }

    /// Unit normal pointing into the half-space.
    #[inline]
    #[must_use]
    pub fn normal(&self) -> &Vector3<f64> {
        &self.normal
    }

    /// Signed offset of the boundary plane.
    #[inline]
    #[must_use]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// `normal · p + offset`; non-negative on the inside.
    #[inline]
    #[must_use]
    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&point.coords) + self.offset
    }

    /// Inclusive containment.
    #[inline]
    #[must_use]
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        self.signed_distance(point) >= 0.0
    }

    /// Smallest and largest signed distance over a box.
    ///
    /// Evaluated at the box corners picked per axis by the sign of the
    /// normal, so the values bound what [`Self::signed_distance`] returns
    /// for any point of the box.
    #[must_use]
    pub fn distance_range(&self, bounds: &Aabb) -> (f64, f64) {
        let pick = |n: f64, lo: f64, hi: f64| if n >= 0.0 { (lo, hi) } else { (hi, lo) };
        let (x0, x1) = pick(self.normal.x, bounds.min.x, bounds.max.x);
        let (y0, y1) = pick(self.normal.y, bounds.min.y, bounds.max.y);
        let (z0, z1) = pick(self.normal.z, bounds.min.z, bounds.max.z);

        (
            self.signed_distance(&Point3::new(x0, y0, z0)),
            self.signed_distance(&Point3::new(x1, y1, z1)),
        )
    }
}

/// Intersection of a finite set of half-spaces.
///
/// With no planes the polytope is all of space.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConvexPolytope {
    planes: Vec<HalfSpace>,
}

impl ConvexPolytope {
    /// Create a polytope from its half-spaces.
    #[must_use]
    pub fn new(planes: Vec<HalfSpace>) -> Self {
        Self { planes }
    }

    /// The six half-spaces bounding an axis-aligned box.
    ///
    /// Order: `x >= min.x`, `x <= max.x`, then the same for y and z.
    #[must_use]
    pub fn from_aabb(bounds: &Aabb) -> Self {
        let (min, max) = (bounds.min, bounds.max);
        Self::new(vec![
            HalfSpace::new(Vector3::x(), -min.x),
            HalfSpace::new(-Vector3::x(), max.x),
            HalfSpace::new(Vector3::y(), -min.y),
            HalfSpace::new(-Vector3::y(), max.y),
            HalfSpace::new(Vector3::z(), -min.z),
            HalfSpace::new(-Vector3::z(), max.z),
        ])
    }

    /// The bounding half-spaces.
    #[inline]
    #[must_use]
    pub fn planes(&self) -> &[HalfSpace] {
        &self.planes
    }

    /// Add another half-space, shrinking the polytope.
    #[must_use]
    pub fn with_plane(mut self, plane: HalfSpace) -> Self {
        self.planes.push(plane);
        self
    }
}

impl Region for ConvexPolytope {
    fn contains(&self, point: &Point3<f64>) -> bool {
        self.planes.iter().all(|plane| plane.contains(point))
    }

    fn classify_box(&self, bounds: &Aabb) -> Containment {
        if bounds.is_empty() {
            return Containment::Outside;
        }

        let mut all_inside = true;
        for plane in &self.planes {
            let (lo, hi) = plane.distance_range(bounds);
            if hi < 0.0 {
                return Containment::Outside;
            }
            if lo < 0.0 {
                all_inside = false;
            }
        }

        if all_inside {
            Containment::Inside
        } else {
            Containment::Partial
        }
    }
}

/// An axis-aligned selection volume given as a reference position plus
/// local extents.
///
/// The world-space box is `[position + local_min, position + local_max]`.
/// Rotation of the reference frame is not supported.
///
/// # Example
///
/// ```
/// use tract_index::{Region, SelectionBox};
/// use tract_types::Point3;
///
/// let selection = SelectionBox::new(
///     Point3::new(10.0, 0.0, 0.0),
///     Point3::new(-1.0, -1.0, -1.0),
///     Point3::new(1.0, 1.0, 1.0),
/// );
///
/// let polytope = selection.to_polytope();
/// assert!(polytope.contains(&Point3::new(11.0, 0.0, 0.0)));
/// assert!(!polytope.contains(&Point3::new(0.0, 0.0, 0.0)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SelectionBox {
    /// Translation of the box's reference frame.
    pub position: Point3<f64>,
    /// Minimum corner relative to `position`.
    pub local_min: Point3<f64>,
    /// Maximum corner relative to `position`.
    pub local_max: Point3<f64>,
}

impl SelectionBox {
    /// Create a selection box. Extents are sorted per axis.
    #[must_use]
    pub fn new(position: Point3<f64>, local_min: Point3<f64>, local_max: Point3<f64>) -> Self {
        let local = Aabb::new(local_min, local_max);
        Self {
            position,
            local_min: local.min,
            local_max: local.max,
        }
    }

    /// Selection box at the origin with the given world bounds.
    #[must_use]
    pub fn from_bounds(bounds: &Aabb) -> Self {
        Self {
            position: Point3::origin(),
            local_min: bounds.min,
            local_max: bounds.max,
        }
    }

    /// World-space bounds.
    #[must_use]
    pub fn world_bounds(&self) -> Aabb {
        Aabb {
            min: Point3::from(self.local_min.coords + self.position.coords),
            max: Point3::from(self.local_max.coords + self.position.coords),
        }
    }

    /// Whether the box has zero extent along at least one axis.
    ///
    /// A degenerate box is still a valid selection; it selects points on
    /// the plane, line or point it collapses to.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        let size = self.local_max - self.local_min;
        size.x <= 0.0 || size.y <= 0.0 || size.z <= 0.0
    }

    /// The six half-spaces of the box in world space.
    #[must_use]
    pub fn to_polytope(&self) -> ConvexPolytope {
        ConvexPolytope::from_aabb(&self.world_bounds())
    }
}

impl From<SelectionBox> for ConvexPolytope {
    fn from(selection: SelectionBox) -> Self {
        selection.to_polytope()
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn half_space_normalizes() {
        let plane = HalfSpace::new(Vector3::new(2.0, 0.0, 0.0), -4.0);
        assert_relative_eq!(*plane.normal(), Vector3::x());
        assert_relative_eq!(plane.offset(), -2.0);
        assert!(plane.contains(&Point3::new(2.0, 0.0, 0.0)));
        assert!(!plane.contains(&Point3::new(1.9, 0.0, 0.0)));
    }

    #[test]
    fn through_point_keeps_normal_side() {
        let plane = HalfSpace::through_point(Vector3::new(0.0, 0.0, -1.0), &Point3::new(0.0, 0.0, 3.0));
        assert!(plane.contains(&Point3::new(5.0, 5.0, 3.0)));
        assert!(plane.contains(&Point3::new(0.0, 0.0, -10.0)));
        assert!(!plane.contains(&Point3::new(0.0, 0.0, 3.5)));
    }

    #[test]
    fn box_planes_match_offsets() {
        let selection = SelectionBox::new(
            Point3::new(1.0, 2.0, 3.0),
            Point3::new(-1.0, -2.0, -3.0),
            Point3::new(1.0, 2.0, 3.0),
        );
        let polytope = selection.to_polytope();
        let planes = polytope.planes();

        assert_eq!(planes.len(), 6);
        assert_eq!(*planes[0].normal(), Vector3::x());
        assert_eq!(planes[0].offset(), 0.0);
        assert_eq!(*planes[1].normal(), -Vector3::x());
        assert_eq!(planes[1].offset(), 2.0);
        assert_eq!(planes[3].offset(), 4.0);
        assert_eq!(planes[5].offset(), 6.0);
    }

    #[test]
    fn polytope_containment_is_inclusive() {
        let polytope = SelectionBox::from_bounds(&Aabb::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 2.0, 2.0),
        ))
        .to_polytope();

        assert!(polytope.contains(&Point3::new(0.0, 0.0, 0.0)));
        assert!(polytope.contains(&Point3::new(2.0, 2.0, 2.0)));
        assert!(polytope.contains(&Point3::new(1.0, 1.0, 1.0)));
        assert!(!polytope.contains(&Point3::new(2.0, 2.0, 2.000_001)));
    }

    #[test]
    fn degenerate_box_selects_plane() {
        let selection = SelectionBox::new(
            Point3::origin(),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(5.0, 5.0, 1.0),
        );
        assert!(selection.is_degenerate());

        let polytope = selection.to_polytope();
        assert!(polytope.contains(&Point3::new(2.0, 3.0, 1.0)));
        assert!(!polytope.contains(&Point3::new(2.0, 3.0, 1.0 + 1e-9)));
    }

    #[test]
    fn classify_box_against_polytope() {
        let polytope = ConvexPolytope::from_aabb(&Aabb::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(4.0, 4.0, 4.0),
        ));

        let inside = Aabb::new(Point3::new(1.0, 1.0, 1.0), Point3::new(2.0, 2.0, 2.0));
        let partial = Aabb::new(Point3::new(3.0, 3.0, 3.0), Point3::new(5.0, 5.0, 5.0));
        let outside = Aabb::new(Point3::new(4.5, 0.0, 0.0), Point3::new(6.0, 1.0, 1.0));

        assert_eq!(polytope.classify_box(&inside), Containment::Inside);
        assert_eq!(polytope.classify_box(&partial), Containment::Partial);
        assert_eq!(polytope.classify_box(&outside), Containment::Outside);
        assert_eq!(polytope.classify_box(&Aabb::empty()), Containment::Outside);
    }

    #[test]
    fn oblique_plane_prunes_by_corner() {
        // x + y <= 1
        let polytope = ConvexPolytope::default()
            .with_plane(HalfSpace::new(Vector3::new(-1.0, -1.0, 0.0), 1.0));

        let near = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(0.4, 0.4, 1.0));
        let far = Aabb::new(Point3::new(0.6, 0.6, 0.0), Point3::new(1.0, 1.0, 1.0));
        let cut = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));

        assert_eq!(polytope.classify_box(&near), Containment::Inside);
        assert_eq!(polytope.classify_box(&far), Containment::Outside);
        assert_eq!(polytope.classify_box(&cut), Containment::Partial);
    }
}
