//! Property-based tests for the k-d tree and polytope clipping.
//!
//! Run with: cargo test -p tract-index -- proptest

#![allow(clippy::unwrap_used, clippy::float_cmp)]

use proptest::prelude::*;
use tract_index::{ConvexPolytope, HalfSpace, KdTree, Region, SelectionBox, clip};
use tract_types::{Aabb, Point3, Vector3};

// =============================================================================
// Strategies
// =============================================================================

/// Points on a coarse grid so that duplicates and boundary hits are common.
fn arb_grid_point() -> impl Strategy<Value = Point3<f64>> {
    prop::array::uniform3(-8i32..=8).prop_map(|[x, y, z]| {
        Point3::new(f64::from(x) * 0.5, f64::from(y) * 0.5, f64::from(z) * 0.5)
    })
}

fn arb_point() -> impl Strategy<Value = Point3<f64>> {
    prop_oneof![
        arb_grid_point(),
        prop::array::uniform3(-5.0..5.0f64).prop_map(|[x, y, z]| Point3::new(x, y, z)),
    ]
}

fn arb_box() -> impl Strategy<Value = Aabb> {
    (arb_grid_point(), arb_grid_point()).prop_map(|(a, b)| Aabb::new(a, b))
}

fn arb_plane() -> impl Strategy<Value = HalfSpace> {
    (prop::array::uniform3(-1.0..1.0f64), -3.0..3.0f64)
        .prop_map(|([x, y, z], d)| HalfSpace::new(Vector3::new(x, y, z), d))
}

fn brute_force<R: Region>(points: &[Point3<f64>], region: &R) -> Vec<usize> {
    points
        .iter()
        .enumerate()
        .filter(|(_, p)| region.contains(p))
        .map(|(i, _)| i)
        .collect()
}

// =============================================================================
// Property Tests: Range Queries
// =============================================================================

proptest! {
    /// Range queries return exactly the points inside the box, in order.
    #[test]
    fn range_query_matches_brute_force(
        points in prop::collection::vec(arb_point(), 0..400),
        region in arb_box(),
        leaf_size in 1usize..16,
    ) {
        let tree = KdTree::build_with_leaf_size(
            points.iter().copied().enumerate().map(|(i, p)| (p, i)),
            leaf_size,
        );

        let got: Vec<usize> = tree.range_query(&region).into_iter().copied().collect();
        prop_assert_eq!(got, brute_force(&points, &region));
    }

    /// Building never loses or duplicates points.
    #[test]
    fn tree_holds_every_point(points in prop::collection::vec(arb_point(), 0..200)) {
        let tree = KdTree::build(points.iter().copied().enumerate().map(|(i, p)| (p, i)));
        prop_assert_eq!(tree.len(), points.len());

        let ids: Vec<usize> = tree.iter().map(|(_, id)| *id).collect();
        prop_assert_eq!(ids, (0..points.len()).collect::<Vec<_>>());

        if let Some(first) = points.first() {
            prop_assert!(tree.bounds().contains(first));
        }
    }
}

// =============================================================================
// Property Tests: Clipping
// =============================================================================

proptest! {
    /// Clipping against a translated selection box equals the plane predicate.
    #[test]
    fn clip_box_matches_world_bounds(
        points in prop::collection::vec(arb_point(), 0..300),
        position in arb_grid_point(),
        local in arb_box(),
    ) {
        let tree = KdTree::build(points.iter().copied().enumerate().map(|(i, p)| (p, i)));
        let selection = SelectionBox::new(position, local.min, local.max);

        let got: Vec<usize> = clip(&tree, &selection.to_polytope())
            .inside
            .into_iter()
            .copied()
            .collect();
        prop_assert_eq!(got, brute_force(&points, &selection.world_bounds()));
    }

    /// Clipping against arbitrary oblique polytopes has no false negatives
    /// and no false positives.
    #[test]
    fn clip_oblique_matches_brute_force(
        points in prop::collection::vec(arb_point(), 0..300),
        planes in prop::collection::vec(arb_plane(), 0..6),
    ) {
        let tree = KdTree::build_with_leaf_size(
            points.iter().copied().enumerate().map(|(i, p)| (p, i)),
            4,
        );
        let polytope = ConvexPolytope::new(planes);

        let got: Vec<usize> = clip(&tree, &polytope).inside.into_iter().copied().collect();
        prop_assert_eq!(got, brute_force(&points, &polytope));
    }
}
