//! Renderable curves with metrics for streamlines.

use crate::color::ColorMode;
use crate::config::GeometryConfig;
use crate::error::CurveResult;
use crate::frame::{Frame, parallel_transport_frames};
use crate::metrics::CurveMetrics;
use crate::spline::UniformBSpline;
use nalgebra::Vector3;
use rayon::prelude::*;
use std::ops::Range;
use std::time::Instant;
use tracing::{debug, info};
use tract_types::{Point3, Streamline};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Up-sampled geometry of one streamline, ready for rendering.
///
/// Metrics describe the raw vertices, not the interpolated points.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SplineCurve {
    /// Interpolated points along the spline.
    pub points: Vec<Point3<f64>>,
    /// One rotation-minimizing frame per point.
    pub frames: Vec<Frame>,
    /// One RGB color per segment between consecutive points.
    pub segment_colors: Vec<Vector3<f64>>,
    /// Length and curvature of the raw polyline.
    pub metrics: CurveMetrics,
}

impl SplineCurve {
    /// Number of interpolated points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the curve has no points; built curves always have two or more.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    fn assemble(spline: &UniformBSpline, smoothing: usize, color_mode: ColorMode) -> Self {
        let samples = spline.sample_with_derivatives(smoothing);
        let frames = parallel_transport_frames(&samples);
        let points: Vec<Point3<f64>> = samples.into_iter().map(|(p, _)| p).collect();
        let vertices = spline.control_points();

        Self {
            segment_colors: color_mode.segment_colors(vertices, points.len() - 1),
            metrics: CurveMetrics::compute(vertices),
            points,
            frames,
        }
    }
}

/// Build the curve for a raw vertex list with the default color mode.
///
/// # Errors
///
/// Returns [`CurveError::InsufficientPoints`](crate::CurveError::InsufficientPoints)
/// for fewer than two vertices and
/// [`CurveError::NonFinitePoint`](crate::CurveError::NonFinitePoint) for
/// NaN or infinite coordinates.
///
/// # Example
///
/// ```
/// use tract_curve::build_curve;
/// use tract_types::Point3;
///
/// let curve = build_curve(&[Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0)], 2).unwrap();
/// assert_eq!(curve.len(), 4);
/// assert!((curve.metrics.length - 2.0).abs() < 1e-12);
///
/// assert!(build_curve(&[Point3::new(0.0, 0.0, 0.0)], 2).is_err());
/// assert!(build_curve(&[], 2).is_err());
/// ```
pub fn build_curve(vertices: &[Point3<f64>], smoothing: usize) -> CurveResult<SplineCurve> {
    let spline = UniformBSpline::new(vertices.to_vec())?;
    Ok(SplineCurve::assemble(&spline, smoothing, ColorMode::default()))
}

/// Curves built for one display batch plus collection-wide statistics.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CurveBatch {
    /// Curves in input order.
    pub curves: Vec<SplineCurve>,
    /// Longest raw polyline in the batch.
    pub max_length: f64,
    /// Largest local curvature in the batch.
    pub max_curvature: f64,
    /// Largest average curvature in the batch.
    pub max_average_curvature: f64,
    /// Number of candidate streamlines offered to the batch.
    pub total_candidates: usize,
}

impl CurveBatch {
    fn from_curves(curves: Vec<SplineCurve>, total_candidates: usize) -> Self {
        let metrics = || curves.iter().map(|c| &c.metrics);
        Self {
            max_length: metrics().map(|m| m.length).fold(0.0, f64::max),
            max_curvature: metrics().map(|m| m.max_curvature).fold(0.0, f64::max),
            max_average_curvature: metrics().map(|m| m.average_curvature).fold(0.0, f64::max),
            curves,
            total_candidates,
        }
    }

    /// Whether the display budget cut the batch short.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.curves.len() < self.total_candidates
    }
}

/// Outcome of changing the display budget.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamlineCountChange {
    /// Remove the curves at these positions of the shown list.
    Reduce {
        /// Positions to drop.
        remove: Range<usize>,
    },
    /// Append these curves; the first belongs at `first_index`.
    Extend {
        /// Position of the first new curve in the shown list.
        first_index: usize,
        /// New curves in candidate order.
        curves: Vec<SplineCurve>,
    },
    /// Nothing to add or remove.
    Unchanged,
}

/// Builds display curves for streamline collections.
///
/// # Example
///
/// ```
/// use tract_curve::{GeometryBuilder, GeometryConfig};
/// use tract_types::{Point3, Streamline};
///
/// let streamlines: Vec<_> = (0..5)
///     .map(|i| {
///         let y = f64::from(i);
///         Streamline::new(vec![Point3::new(0.0, y, 0.0), Point3::new(1.0, y, 0.0)]).unwrap()
///     })
///     .collect();
///
/// let builder = GeometryBuilder::new(GeometryConfig::default().with_max_streamline_count(3));
/// let batch = builder.build_curves(&streamlines);
///
/// assert_eq!(batch.curves.len(), 3);
/// assert!(batch.is_truncated());
/// ```
#[derive(Debug, Clone, Default)]
pub struct GeometryBuilder {
    config: GeometryConfig,
}

impl GeometryBuilder {
    /// Create a builder with the given configuration.
    #[must_use]
    pub fn new(config: GeometryConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &GeometryConfig {
        &self.config
    }

    /// Build the curve for one streamline.
    #[must_use]
    pub fn build_curve(&self, streamline: &Streamline) -> SplineCurve {
        SplineCurve::assemble(
            &UniformBSpline::from_streamline(streamline),
            self.config.smoothing,
            self.config.color_mode,
        )
    }

    /// Build curves for at most `max_streamline_count` leading streamlines,
    /// in parallel, preserving order.
    #[must_use]
    pub fn build_curves(&self, streamlines: &[Streamline]) -> CurveBatch {
        let start = Instant::now();
        let shown = streamlines.len().min(self.config.max_streamline_count);
        let curves: Vec<SplineCurve> = streamlines[..shown]
            .par_iter()
            .map(|s| self.build_curve(s))
            .collect();

        let batch = CurveBatch::from_curves(curves, streamlines.len());
        info!(
            curves = batch.curves.len(),
            candidates = streamlines.len(),
            max_length = batch.max_length,
            max_curvature = batch.max_curvature,
            max_average_curvature = batch.max_average_curvature,
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "built streamline curves"
        );
        batch
    }

    /// Change the display budget to `new_count` when `shown` curves of
    /// `candidates` are currently displayed.
    ///
    /// Candidates are expected in display order (already shuffled if the
    /// caller wants a random subset), so the first `n` are always the ones
    /// on screen.
    pub fn change_streamline_count(
        &mut self,
        candidates: &[Streamline],
        shown: usize,
        new_count: usize,
    ) -> StreamlineCountChange {
        self.config.max_streamline_count = new_count;
        let shown = shown.min(candidates.len());
        let target = new_count.min(candidates.len());

        let change = if target < shown {
            StreamlineCountChange::Reduce {
                remove: target..shown,
            }
        } else if target > shown {
            StreamlineCountChange::Extend {
                first_index: shown,
                curves: candidates[shown..target]
                    .par_iter()
                    .map(|s| self.build_curve(s))
                    .collect(),
            }
        } else {
            StreamlineCountChange::Unchanged
        };

        debug!(shown, new_count, candidates = candidates.len(), "changed streamline budget");
        change
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::error::CurveError;
    use approx::assert_relative_eq;

    fn line(n: usize, spacing: f64) -> Streamline {
        Streamline::new(
            (0..n)
                .map(|i| Point3::new(i as f64 * spacing, 1.0, -2.0))
                .collect(),
        )
        .unwrap()
    }

    fn arc(n: usize) -> Streamline {
        Streamline::new(
            (0..n)
                .map(|i| {
                    let a = i as f64 * 0.1;
                    Point3::new(a.cos(), a.sin(), 0.0)
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_straight_line_metrics() {
        let curve = GeometryBuilder::default().build_curve(&line(11, 0.25));

        assert_relative_eq!(curve.metrics.length, 2.5, epsilon = 1e-12);
        assert_relative_eq!(curve.metrics.average_curvature, 0.0, epsilon = 1e-12);
        assert_relative_eq!(curve.metrics.max_curvature, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_curve_layout() {
        let curve = GeometryBuilder::default().build_curve(&arc(5));

        assert_eq!(curve.len(), 4 * 3 + 1);
        assert_eq!(curve.frames.len(), curve.len());
        assert_eq!(curve.segment_colors.len(), curve.len() - 1);
        assert!(curve.frames.iter().all(|f| f.is_orthonormal(1e-9)));
        assert_relative_eq!(curve.points[0], Point3::new(1.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_two_point_streamline() {
        let curve = GeometryBuilder::default().build_curve(&line(2, 1.0));
        assert!(curve.len() >= 2);
        assert_eq!(curve.metrics.average_curvature, 0.0);
        assert_eq!(curve.metrics.min_curvature, 0.0);
        assert_eq!(curve.metrics.max_curvature, 0.0);
    }

    #[test]
    fn test_short_input_rejected() {
        assert_eq!(
            build_curve(&[Point3::origin()], 2).unwrap_err(),
            CurveError::insufficient_points(2, 1)
        );
        assert!(build_curve(&[], 2).unwrap_err().is_insufficient_points());
    }

    #[test]
    fn test_local_colors_vary() {
        let builder =
            GeometryBuilder::new(GeometryConfig::default().with_color_mode(ColorMode::LocalDirection));
        let bend = Streamline::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ])
        .unwrap();
        let curve = builder.build_curve(&bend);
        assert_ne!(curve.segment_colors.first(), curve.segment_colors.last());

        let global = GeometryBuilder::default().build_curve(&bend);
        assert_eq!(global.segment_colors.first(), global.segment_colors.last());
    }

    #[test]
    fn test_batch_statistics() {
        let streamlines = vec![line(3, 1.0), arc(20), line(5, 2.0)];
        let batch = GeometryBuilder::default().build_curves(&streamlines);

        assert_eq!(batch.curves.len(), 3);
        assert!(!batch.is_truncated());
        assert_relative_eq!(batch.max_length, 8.0, epsilon = 1e-12);
        assert!(batch.max_curvature > 0.5);
        // order preserved
        assert_relative_eq!(batch.curves[0].metrics.length, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_batch_of_nothing() {
        let batch = GeometryBuilder::default().build_curves(&[]);
        assert!(batch.curves.is_empty());
        assert_eq!(batch.max_length, 0.0);
    }

    #[test]
    fn test_change_streamline_count() {
        let candidates: Vec<_> = (2..8).map(|n| line(n, 1.0)).collect();
        let mut builder = GeometryBuilder::new(GeometryConfig::default().with_max_streamline_count(3));

        match builder.change_streamline_count(&candidates, 3, 5) {
            StreamlineCountChange::Extend { first_index, curves } => {
                assert_eq!(first_index, 3);
                assert_eq!(curves.len(), 2);
                assert_relative_eq!(curves[0].metrics.length, 4.0, epsilon = 1e-12);
            }
            other => panic!("expected extension, got {other:?}"),
        }
        assert_eq!(builder.config().max_streamline_count, 5);

        assert_eq!(
            builder.change_streamline_count(&candidates, 5, 1),
            StreamlineCountChange::Reduce { remove: 1..5 }
        );
        assert_eq!(
            builder.change_streamline_count(&candidates, 6, 100),
            StreamlineCountChange::Unchanged
        );
    }
}
