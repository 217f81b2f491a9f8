//! Clipping a k-d tree against a convex polytope.

use crate::kdtree::{KdTree, TraversalStats};
use crate::polytope::ConvexPolytope;
use tracing::debug;

/// Payloads that survived a clip, in insertion order.
#[derive(Debug, Clone)]
pub struct ClipResult<'a, T> {
    /// Payloads whose point satisfies every half-space.
    pub inside: Vec<&'a T>,
    /// Traversal counters.
    pub stats: TraversalStats,
}

impl<T> ClipResult<'_, T> {
    /// Number of payloads inside the polytope.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.inside.len()
    }

    /// Whether nothing was inside.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inside.is_empty()
    }
}

/// Collect every payload whose point lies inside `polytope`.
///
/// Subtrees whose bounds fall entirely outside any single half-space are
/// pruned; subtrees entirely inside all half-spaces are taken whole. The
/// result is exactly the set of points `p` with
/// `normal · p + offset >= 0` for every plane.
///
/// # Example
///
/// ```
/// use tract_index::{KdTree, SelectionBox, clip};
/// use tract_types::Point3;
///
/// let tree = KdTree::build(vec![
///     (Point3::new(0.5, 0.5, 0.5), 0),
///     (Point3::new(3.0, 0.0, 0.0), 1),
/// ]);
/// let selection = SelectionBox::new(
///     Point3::origin(),
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 1.0),
/// );
///
/// let result = clip(&tree, &selection.to_polytope());
/// assert_eq!(result.inside, vec![&0]);
/// ```
#[must_use]
pub fn clip<'a, T>(tree: &'a KdTree<T>, polytope: &ConvexPolytope) -> ClipResult<'a, T> {
    let (inside, stats) = tree.query_with_stats(polytope);

    debug!(
        planes = polytope.planes().len(),
        points = tree.len(),
        inside = inside.len(),
        visited = stats.nodes_visited,
        pruned = stats.subtrees_pruned,
        accepted = stats.subtrees_accepted,
        "clipped k-d tree against polytope"
    );

    ClipResult { inside, stats }
}
