//! Uniform cubic B-splines through streamline vertices.
//!
//! The control polygon is padded with one reflected phantom point at each
//! end (`2 * p0 - p1` and `2 * pn - pn-1`), which makes the curve start and
//! end exactly on the first and last vertex. Interior vertices are
//! approximated, not interpolated.

use crate::error::{CurveError, CurveResult};
use nalgebra::Vector3;
use tract_types::{Point3, Streamline};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A uniform cubic B-spline with one segment per pair of consecutive
/// control points.
///
/// # Example
///
/// ```
/// use tract_curve::UniformBSpline;
/// use tract_types::Point3;
///
/// let spline = UniformBSpline::new(vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(2.0, 0.0, 0.0),
/// ])
/// .unwrap();
///
/// assert_eq!(spline.segment_count(), 2);
/// // two interpolated points between each pair of control points
/// assert_eq!(spline.sample(2).len(), 7);
/// assert_eq!(spline.point(0, 0.0), Point3::new(0.0, 0.0, 0.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UniformBSpline {
    /// Control points including the two phantom points.
    padded: Vec<Point3<f64>>,
}

impl UniformBSpline {
    /// Fit a spline to `control_points`.
    ///
    /// # Errors
    ///
    /// - [`CurveError::InsufficientPoints`] for fewer than two points
    /// - [`CurveError::NonFinitePoint`] for NaN or infinite coordinates
    pub fn new(control_points: Vec<Point3<f64>>) -> CurveResult<Self> {
        if control_points.len() < 2 {
            return Err(CurveError::insufficient_points(2, control_points.len()));
        }
        if let Some(index) = control_points
            .iter()
            .position(|p| !p.coords.iter().all(|c| c.is_finite()))
        {
            return Err(CurveError::NonFinitePoint { index });
        }

        Ok(Self::padded(control_points))
    }

    /// Spline through the vertices of a validated streamline.
    #[must_use]
    pub fn from_streamline(streamline: &Streamline) -> Self {
        Self::padded(streamline.vertices().to_vec())
    }

    /// Requires at least two points.
    fn padded(control_points: Vec<Point3<f64>>) -> Self {
        let n = control_points.len();
        let head = control_points[0] + (control_points[0] - control_points[1]);
        let tail = control_points[n - 1] + (control_points[n - 1] - control_points[n - 2]);

        let mut padded = Vec::with_capacity(n + 2);
        padded.push(head);
        padded.extend(control_points);
        padded.push(tail);

        Self { padded }
    }

    /// The control points without the phantom padding.
    #[must_use]
    pub fn control_points(&self) -> &[Point3<f64>] {
        &self.padded[1..self.padded.len() - 1]
    }

    /// Number of polynomial segments (control points minus one).
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.padded.len() - 3
    }

    /// Evaluate segment `segment` at local parameter `u` in `[0, 1]`.
    ///
    /// # Panics
    ///
    /// Panics if `segment >= self.segment_count()`.
    #[must_use]
    pub fn point(&self, segment: usize, u: f64) -> Point3<f64> {
        let [b0, b1, b2, b3] = basis(u);
        let [p0, p1, p2, p3] = self.window(segment);
        Point3::from(p0.coords * b0 + p1.coords * b1 + p2.coords * b2 + p3.coords * b3)
    }

    /// First derivative of segment `segment` with respect to `u`.
    ///
    /// # Panics
    ///
    /// Panics if `segment >= self.segment_count()`.
    #[must_use]
    pub fn derivative(&self, segment: usize, u: f64) -> Vector3<f64> {
        let [d0, d1, d2, d3] = basis_derivative(u);
        let [p0, p1, p2, p3] = self.window(segment);
        p0.coords * d0 + p1.coords * d1 + p2.coords * d2 + p3.coords * d3
    }

    /// Sample the whole curve with `smoothing` interpolated points between
    /// each pair of control points.
    ///
    /// Returns `segment_count * (smoothing + 1) + 1` points; the first and
    /// last coincide with the first and last control point.
    #[must_use]
    pub fn sample(&self, smoothing: usize) -> Vec<Point3<f64>> {
        self.params(smoothing)
            .map(|(segment, u)| self.point(segment, u))
            .collect()
    }

    /// Like [`Self::sample`], also returning the derivative at each sample.
    #[must_use]
    pub fn sample_with_derivatives(&self, smoothing: usize) -> Vec<(Point3<f64>, Vector3<f64>)> {
        self.params(smoothing)
            .map(|(segment, u)| (self.point(segment, u), self.derivative(segment, u)))
            .collect()
    }

    fn params(&self, smoothing: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let steps = smoothing + 1;
        let segments = self.segment_count();
        (0..segments)
            .flat_map(move |s| (0..steps).map(move |k| (s, k as f64 / steps as f64)))
            .chain(std::iter::once((segments - 1, 1.0)))
    }

    fn window(&self, segment: usize) -> [Point3<f64>; 4] {
        [
            self.padded[segment],
            self.padded[segment + 1],
            self.padded[segment + 2],
            self.padded[segment + 3],
        ]
    }
}

fn basis(u: f64) -> [f64; 4] {
    let u2 = u * u;
    let u3 = u2 * u;
    let v = 1.0 - u;
    [
        v * v * v / 6.0,
        (3.0 * u3 - 6.0 * u2 + 4.0) / 6.0,
        (-3.0 * u3 + 3.0 * u2 + 3.0 * u + 1.0) / 6.0,
        u3 / 6.0,
    ]
}

fn basis_derivative(u: f64) -> [f64; 4] {
    let u2 = u * u;
    let v = 1.0 - u;
    [
        -v * v / 2.0,
        (3.0 * u2 - 4.0 * u) / 2.0,
        (-3.0 * u2 + 2.0 * u + 1.0) / 2.0,
        u2 / 2.0,
    ]
}
