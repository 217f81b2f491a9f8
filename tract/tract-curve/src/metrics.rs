//! Length and curvature of raw streamline polylines.

use nalgebra::Vector3;
use tract_types::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Scalar shape metrics of one streamline.
///
/// Curvature is estimated at every interior vertex `i` as
/// `|(T[i+1] - T[i-1]) / (l[i-1] + l[i]) · N[i]|`, where `T` are unit
/// tangents, `N[i]` is the principal normal at vertex `i` and `l` are the
/// adjacent segment lengths. End vertices carry no curvature; with no
/// interior vertex every curvature metric is zero.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CurveMetrics {
    /// Sum of consecutive vertex distances.
    pub length: f64,
    /// Mean local curvature over interior vertices.
    pub average_curvature: f64,
    /// Smallest local curvature over interior vertices.
    pub min_curvature: f64,
    /// Largest local curvature over interior vertices.
    pub max_curvature: f64,
    /// Local curvature per interior vertex, in vertex order.
    pub local_curvature: Vec<f64>,
}

impl CurveMetrics {
    /// Compute metrics over `vertices`.
    ///
    /// # Example
    ///
    /// ```
    /// use tract_curve::CurveMetrics;
    /// use tract_types::Point3;
    ///
    /// let line: Vec<_> = (0..5).map(|i| Point3::new(f64::from(i) * 0.5, 0.0, 0.0)).collect();
    /// let metrics = CurveMetrics::compute(&line);
    ///
    /// assert!((metrics.length - 2.0).abs() < 1e-12);
    /// assert!(metrics.max_curvature.abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn compute(vertices: &[Point3<f64>]) -> Self {
        let segment_lengths: Vec<f64> = vertices.windows(2).map(|w| (w[1] - w[0]).norm()).collect();
        let length = segment_lengths.iter().sum();

        if vertices.len() < 3 {
            return Self {
                length,
                ..Self::default()
            };
        }

        let tangents = vertex_tangents(vertices);
        let local_curvature: Vec<f64> = (1..vertices.len() - 1)
            .map(|i| {
                let span = segment_lengths[i - 1] + segment_lengths[i];
                if span <= 0.0 {
                    return 0.0;
                }
                let turn = tangents[i + 1] - tangents[i - 1];
                // projection onto the principal normal equals the part of
                // the turn perpendicular to the tangent
                let normal_part = turn - tangents[i] * turn.dot(&tangents[i]);
                normal_part.norm() / span
            })
            .collect();

        let average_curvature = local_curvature.iter().sum::<f64>() / local_curvature.len() as f64;
        let min_curvature = local_curvature.iter().copied().fold(f64::INFINITY, f64::min);
        let max_curvature = local_curvature.iter().copied().fold(0.0, f64::max);

        Self {
            length,
            average_curvature,
            min_curvature,
            max_curvature,
            local_curvature,
        }
    }
}

/// Unit tangents at each vertex: one-sided at the ends, central inside.
/// Zero-length differences yield a zero tangent.
fn vertex_tangents(vertices: &[Point3<f64>]) -> Vec<Vector3<f64>> {
    let n = vertices.len();
    (0..n)
        .map(|i| {
            let prev = vertices[i.saturating_sub(1)];
            let next = vertices[(i + 1).min(n - 1)];
            (next - prev).try_normalize(0.0).unwrap_or_else(Vector3::zeros)
        })
        .collect()
}
