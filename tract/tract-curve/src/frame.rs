//! Rotation-minimizing frames along sampled curves.
//!
//! Frames are propagated by parallel transport (double reflection, Wang et
//! al. 2008) so that tube geometry extruded along a streamline does not
//! twist at inflection points.

use nalgebra::Vector3;
use tract_types::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An orthonormal frame at a sample on a curve.
///
/// - `tangent`: direction of travel
/// - `normal`: perpendicular to the tangent
/// - `binormal`: `tangent × normal`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Frame {
    /// Position on the curve.
    pub position: Point3<f64>,
    /// Unit tangent.
    pub tangent: Vector3<f64>,
    /// Unit normal.
    pub normal: Vector3<f64>,
    /// Unit binormal.
    pub binormal: Vector3<f64>,
}

impl Frame {
    /// Create a frame from a tangent and an "up" hint.
    ///
    /// The normal is as close to `up` as possible; when the two are
    /// parallel an arbitrary perpendicular is chosen.
    #[must_use]
    pub fn from_tangent_and_up(
        position: Point3<f64>,
        tangent: Vector3<f64>,
        up: Vector3<f64>,
    ) -> Self {
        let tangent = tangent.normalize();
        let binormal = tangent.cross(&up);
        let binormal_norm = binormal.norm();

        let binormal = if binormal_norm > 1e-10 {
            binormal / binormal_norm
        } else {
            let perp = if tangent.x.abs() < 0.9 {
                Vector3::x()
            } else {
                Vector3::y()
            };
            tangent.cross(&perp).normalize()
        };

        Self {
            position,
            tangent,
            normal: binormal.cross(&tangent),
            binormal,
        }
    }

    /// Map a point from frame coordinates (x along the tangent, y along the
    /// normal, z along the binormal) to world coordinates.
    #[must_use]
    pub fn local_to_world(&self, local: Point3<f64>) -> Point3<f64> {
        self.position + self.tangent * local.x + self.normal * local.y + self.binormal * local.z
    }

    /// Check if the frame is orthonormal within tolerance.
    #[must_use]
    pub fn is_orthonormal(&self, tolerance: f64) -> bool {
        (self.tangent.norm() - 1.0).abs() < tolerance
            && (self.normal.norm() - 1.0).abs() < tolerance
            && (self.binormal.norm() - 1.0).abs() < tolerance
            && self.tangent.dot(&self.normal).abs() < tolerance
            && self.tangent.dot(&self.binormal).abs() < tolerance
            && self.normal.dot(&self.binormal).abs() < tolerance
    }
}

/// Compute rotation-minimizing frames for `(position, derivative)` samples.
///
/// Samples with a vanishing derivative inherit the previous tangent; a
/// curve that never moves gets frames aligned with the x axis.
///
/// # Example
///
/// ```
/// use tract_curve::parallel_transport_frames;
/// use tract_types::{Point3, Vector3};
///
/// let samples: Vec<_> = (0..5)
///     .map(|i| (Point3::new(f64::from(i), 0.0, 0.0), Vector3::x()))
///     .collect();
///
/// let frames = parallel_transport_frames(&samples);
/// assert_eq!(frames.len(), 5);
/// assert!(frames.iter().all(|f| f.is_orthonormal(1e-10)));
/// ```
#[must_use]
pub fn parallel_transport_frames(samples: &[(Point3<f64>, Vector3<f64>)]) -> Vec<Frame> {
    let Some(fallback) = samples
        .iter()
        .map(|(_, d)| d)
        .find(|d| d.norm() > f64::EPSILON)
        .copied()
        .or_else(|| (!samples.is_empty()).then(Vector3::x))
    else {
        return Vec::new();
    };

    let mut frames: Vec<Frame> = Vec::with_capacity(samples.len());
    let mut tangent = fallback.normalize();

    for (position, derivative) in samples {
        if derivative.norm() > f64::EPSILON {
            tangent = derivative.normalize();
        }
        let frame = match frames.last() {
            None => {
                let up = if tangent.z.abs() < 0.9 {
                    Vector3::z()
                } else {
                    Vector3::y()
                };
                Frame::from_tangent_and_up(*position, tangent, up)
            }
            Some(prev) => transport_frame(prev, *position, tangent),
        };
        frames.push(frame);
    }

    frames
}

/// Transport a frame to a new position and tangent using double reflection.
fn transport_frame(prev: &Frame, position: Point3<f64>, tangent: Vector3<f64>) -> Frame {
    let v1 = position - prev.position;
    let c1 = v1.dot(&v1);

    if c1 < 1e-20 {
        // coincident samples: only rotate onto the new tangent
        let binormal = tangent.cross(&prev.normal);
        let binormal_norm = binormal.norm();
        let (normal, binormal) = if binormal_norm > 1e-10 {
            let binormal = binormal / binormal_norm;
            (binormal.cross(&tangent), binormal)
        } else {
            (prev.normal, prev.binormal)
        };
        return Frame {
            position,
            tangent,
            normal,
            binormal,
        };
    }

    let r_l = prev.normal - v1 * (2.0 / c1) * v1.dot(&prev.normal);
    let t_l = prev.tangent - v1 * (2.0 / c1) * v1.dot(&prev.tangent);

    let v2 = tangent - t_l;
    let c2 = v2.dot(&v2);
    let normal = if c2 < 1e-20 {
        r_l.normalize()
    } else {
        (r_l - v2 * (2.0 / c2) * v2.dot(&r_l)).normalize()
    };

    Frame {
        position,
        tangent,
        normal,
        binormal: tangent.cross(&normal),
    }
}
