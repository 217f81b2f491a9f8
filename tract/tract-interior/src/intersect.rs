//! Ray-triangle crossings and point-triangle distances.

// Barycentric determinants group operands the way the algorithm reads.
#![allow(clippy::suspicious_operation_groupings)]

use nalgebra::Vector3;
use tract_types::Point3;

/// Whether a triangle has (numerically) zero area.
///
/// Compares the sine of the angle between two edges against machine
/// epsilon, so the test does not depend on the triangle's scale.
#[must_use]
pub fn is_degenerate(triangle: &[Point3<f64>; 3]) -> bool {
    let [v0, v1, v2] = triangle;
    let e1 = v1 - v0;
    let e2 = v2 - v0;
    e1.cross(&e2).norm() <= f64::EPSILON * e1.norm() * e2.norm()
}

/// How a parity ray meets one triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RayCrossing {
    /// No crossing in front of the ray origin.
    Miss,
    /// Crossing strictly inside the triangle at ray parameter `t > 0`.
    Hit(f64),
    /// The ray passes within the edge tolerance of an edge or vertex.
    /// Neighbouring triangles may or may not report the same point, so a
    /// parity count along this ray cannot be trusted.
    Grazing,
}

impl RayCrossing {
    /// Ray parameter of a clean crossing.
    #[must_use]
    pub fn distance(self) -> Option<f64> {
        match self {
            Self::Hit(t) => Some(t),
            Self::Miss | Self::Grazing => None,
        }
    }

    /// Whether the ray touched an edge or vertex.
    #[must_use]
    pub fn is_grazing(self) -> bool {
        matches!(self, Self::Grazing)
    }
}

/// Ray-triangle crossing using the Möller-Trumbore algorithm.
///
/// Degenerate triangles and rays whose direction is within
/// `parallel_tolerance` (as a cosine) of the triangle plane are a
/// [`RayCrossing::Miss`]. A crossing whose smallest barycentric coordinate
/// is within `edge_tolerance` of zero is [`RayCrossing::Grazing`] instead
/// of a hit, since the triangles sharing that edge would each count it.
///
/// # Example
///
/// ```
/// use nalgebra::Vector3;
/// use tract_interior::{RayCrossing, ray_triangle_crossing};
/// use tract_types::Point3;
///
/// let triangle = [
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let up = Vector3::z();
///
/// let hit = ray_triangle_crossing(&Point3::new(0.2, 0.2, -1.0), &up, &triangle, 1e-12, 1e-9);
/// assert_eq!(hit, RayCrossing::Hit(1.0));
///
/// // Straight through the hypotenuse
/// let edge = ray_triangle_crossing(&Point3::new(0.5, 0.5, -1.0), &up, &triangle, 1e-12, 1e-9);
/// assert!(edge.is_grazing());
/// ```
#[must_use]
pub fn ray_triangle_crossing(
    origin: &Point3<f64>,
    direction: &Vector3<f64>,
    triangle: &[Point3<f64>; 3],
    parallel_tolerance: f64,
    edge_tolerance: f64,
) -> RayCrossing {
    let [v0, v1, v2] = triangle;
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let normal_len = edge1.cross(&edge2).norm();
    if normal_len <= f64::EPSILON * edge1.norm() * edge2.norm() {
        return RayCrossing::Miss;
    }

    let h = direction.cross(&edge2);
    let a = edge1.dot(&h);

    // |a| / (|n| |d|) is the cosine between the ray and the plane normal
    if a.abs() <= parallel_tolerance * normal_len * direction.norm() {
        return RayCrossing::Miss;
    }

    let f = 1.0 / a;
    let s = origin - v0;
    let u = f * s.dot(&h);
    let q = s.cross(&edge1);
    let v = f * direction.dot(&q);
    let w = 1.0 - u - v;
    if u < -edge_tolerance || v < -edge_tolerance || w < -edge_tolerance {
        return RayCrossing::Miss;
    }

    let t = f * edge2.dot(&q);
    if t <= 0.0 {
        return RayCrossing::Miss;
    }

    if u.min(v).min(w) <= edge_tolerance {
        RayCrossing::Grazing
    } else {
        RayCrossing::Hit(t)
    }
}

/// Euclidean distance from a point to a closed triangle.
///
/// Degenerate triangles fall back to the distance to their edges.
#[must_use]
pub fn point_triangle_distance(point: &Point3<f64>, triangle: &[Point3<f64>; 3]) -> f64 {
    if is_degenerate(triangle) {
        let [a, b, c] = triangle;
        return point_segment_distance(point, a, b)
            .min(point_segment_distance(point, b, c))
            .min(point_segment_distance(point, c, a));
    }
    (point - closest_point_on_triangle(point, triangle)).norm()
}

/// Closest point on a non-degenerate triangle (Voronoi region walk).
fn closest_point_on_triangle(p: &Point3<f64>, triangle: &[Point3<f64>; 3]) -> Point3<f64> {
    let [a, b, c] = *triangle;
    let ab = b - a;
    let ac = c - a;

    let ap = p - a;
    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return a;
    }

    let bp = p - b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        return a + ab * (d1 / (d1 - d3));
    }

    let cp = p - c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        return a + ac * (d2 / (d2 - d6));
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        return b + (c - b) * ((d4 - d3) / ((d4 - d3) + (d5 - d6)));
    }

    let denom = 1.0 / (va + vb + vc);
    a + ab * (vb * denom) + ac * (vc * denom)
}

fn point_segment_distance(p: &Point3<f64>, a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq == 0.0 {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}
