//! Direction-encoded streamline colors.

use nalgebra::Vector3;
use tract_types::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How curve segments are colored. Colors are RGB in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ColorMode {
    /// One color for the whole streamline, taken from its overall direction.
    #[default]
    GlobalDirection,
    /// Each segment colored by the direction of the raw edge it follows.
    LocalDirection,
}

impl ColorMode {
    /// Colors for `segment_count` curve segments of a streamline with the
    /// given raw `vertices`.
    ///
    /// In local mode the curve segments are spread evenly over the raw
    /// edges, so segment `s` takes the color of edge
    /// `s * edges / segment_count`.
    #[must_use]
    pub fn segment_colors(self, vertices: &[Point3<f64>], segment_count: usize) -> Vec<Vector3<f64>> {
        match self {
            Self::GlobalDirection => vec![global_color(vertices); segment_count],
            Self::LocalDirection => {
                let edges = vertices.len().saturating_sub(1);
                if edges == 0 {
                    return vec![local_color(&Vector3::zeros()); segment_count];
                }
                (0..segment_count)
                    .map(|s| {
                        let e = (s * edges / segment_count).min(edges - 1);
                        local_color(&(vertices[e + 1] - vertices[e]))
                    })
                    .collect()
            }
        }
    }
}

/// Running direction folded over the vertices: each step normalizes the
/// offset from the previous result to the next vertex. Component magnitudes
/// give the color.
#[must_use]
pub fn global_color(vertices: &[Point3<f64>]) -> Vector3<f64> {
    vertices
        .iter()
        .fold(Vector3::zeros(), |acc, v| unit_or_zero(&(v.coords - acc)))
        .abs()
}

/// Color of a single edge direction: `(unit(d) + 0.5) / 2`, clamped to
/// `[0, 1]`.
#[must_use]
pub fn local_color(direction: &Vector3<f64>) -> Vector3<f64> {
    ((unit_or_zero(direction).add_scalar(0.5)) / 2.0).map(|c| c.clamp(0.0, 1.0))
}

fn unit_or_zero(v: &Vector3<f64>) -> Vector3<f64> {
    v.try_normalize(0.0).unwrap_or_else(Vector3::zeros)
}
