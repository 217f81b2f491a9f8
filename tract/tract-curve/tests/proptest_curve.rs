//! Property-based tests for curve building and metrics.
//!
//! Run with: cargo test -p tract-curve -- proptest

#![allow(clippy::unwrap_used, clippy::float_cmp)]

use proptest::prelude::*;
use tract_curve::{CurveMetrics, GeometryBuilder, GeometryConfig, build_curve};
use tract_types::{Point3, Streamline, Vector3};

// =============================================================================
// Strategies
// =============================================================================

fn arb_direction() -> impl Strategy<Value = Vector3<f64>> {
    prop::array::uniform3(-1.0..1.0f64)
        .prop_filter("non-zero direction", |[x, y, z]| x * x + y * y + z * z > 1e-3)
        .prop_map(|[x, y, z]| Vector3::new(x, y, z).normalize())
}

fn arb_polyline(max_len: usize) -> impl Strategy<Value = Vec<Point3<f64>>> {
    prop::collection::vec(prop::array::uniform3(-50.0..50.0f64), 2..max_len)
        .prop_map(|coords| coords.into_iter().map(|[x, y, z]| Point3::new(x, y, z)).collect())
}

// =============================================================================
// Property Tests: Metrics
// =============================================================================

proptest! {
    /// Equally spaced collinear points have zero curvature and the expected length.
    #[test]
    fn straight_lines_are_flat(
        origin in prop::array::uniform3(-100.0..100.0f64),
        direction in arb_direction(),
        spacing in 0.01..5.0f64,
        n in 2usize..200,
    ) {
        let origin = Point3::from(origin);
        let vertices: Vec<_> = (0..n).map(|i| origin + direction * (spacing * i as f64)).collect();
        let metrics = CurveMetrics::compute(&vertices);

        let expected = (n - 1) as f64 * spacing;
        prop_assert!((metrics.length - expected).abs() <= 1e-9 * expected.max(1.0));
        prop_assert!(metrics.max_curvature <= 1e-6);
        prop_assert!(metrics.average_curvature <= 1e-6);
    }

    /// Metrics are finite and ordered for arbitrary polylines.
    #[test]
    fn metrics_are_consistent(vertices in arb_polyline(60)) {
        let metrics = CurveMetrics::compute(&vertices);

        prop_assert!(metrics.length.is_finite() && metrics.length >= 0.0);
        prop_assert_eq!(metrics.local_curvature.len(), vertices.len() - 2);
        prop_assert!(metrics.min_curvature <= metrics.average_curvature + 1e-12);
        prop_assert!(metrics.average_curvature <= metrics.max_curvature + 1e-12);
    }
}

// =============================================================================
// Property Tests: Curves
// =============================================================================

proptest! {
    /// Curve layout follows the smoothing factor and endpoints are kept.
    #[test]
    fn curve_layout(vertices in arb_polyline(30), smoothing in 0usize..6) {
        let curve = build_curve(&vertices, smoothing).unwrap();
        let segments = vertices.len() - 1;

        prop_assert_eq!(curve.points.len(), segments * (smoothing + 1) + 1);
        prop_assert_eq!(curve.frames.len(), curve.points.len());
        prop_assert_eq!(curve.segment_colors.len(), curve.points.len() - 1);
        prop_assert!((curve.points[0] - vertices[0]).norm() < 1e-9);
        prop_assert!((curve.points[curve.points.len() - 1] - vertices[segments]).norm() < 1e-9);
        for color in &curve.segment_colors {
            prop_assert!(color.iter().all(|c| (0.0..=1.0).contains(c)));
        }
    }

    /// Building never depends on the batch it is part of.
    #[test]
    fn batch_matches_single_builds(lines in prop::collection::vec(arb_polyline(12), 0..20)) {
        let streamlines: Vec<Streamline> =
            lines.into_iter().map(|v| Streamline::new(v).unwrap()).collect();
        let builder = GeometryBuilder::new(GeometryConfig::default().with_max_streamline_count(10));
        let batch = builder.build_curves(&streamlines);

        prop_assert_eq!(batch.curves.len(), streamlines.len().min(10));
        for (curve, streamline) in batch.curves.iter().zip(&streamlines) {
            prop_assert_eq!(curve, &builder.build_curve(streamline));
        }
    }
}

#[test]
fn rejects_fewer_than_two_vertices() {
    assert!(build_curve(&[], 1).unwrap_err().is_insufficient_points());
    assert!(build_curve(&[Point3::origin()], 1).unwrap_err().is_insufficient_points());
}
