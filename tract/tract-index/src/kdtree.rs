//! Static k-d tree over 3D points.
//!
//! The tree is built once and never modified. Points are split at the
//! median of the longest axis of each node's bounds, giving a balanced tree
//! of depth `O(log n)`. Every node stores the contiguous slot range of the
//! points below it, so a subtree that lies entirely inside a query region
//! is reported without descending into it.

use crate::region::{Containment, Region};
use smallvec::SmallVec;
use tracing::debug;
use tract_types::{Aabb, Point3};

/// Default maximum number of points per leaf.
pub const DEFAULT_LEAF_SIZE: usize = 8;

#[derive(Debug, Clone)]
enum NodeKind {
    Leaf,
    Split { left: usize, right: usize },
}

#[derive(Debug, Clone)]
struct Node {
    bounds: Aabb,
    start: usize,
    end: usize,
    kind: NodeKind,
}

/// Counters collected during one traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraversalStats {
    /// Nodes whose bounds were classified against the region.
    pub nodes_visited: usize,
    /// Subtrees skipped because their bounds were outside the region.
    pub subtrees_pruned: usize,
    /// Subtrees accepted whole because their bounds were inside the region.
    pub subtrees_accepted: usize,
    /// Individual points tested in partially covered leaves.
    pub points_tested: usize,
}

/// An immutable, balanced k-d tree mapping 3D points to payloads.
///
/// Query results are always reported in insertion order, so coincident
/// points keep the order in which they were supplied.
///
/// # Example
///
/// ```
/// use tract_index::KdTree;
/// use tract_types::{Aabb, Point3};
///
/// let tree = KdTree::build(vec![
///     (Point3::new(0.0, 0.0, 0.0), "a"),
///     (Point3::new(5.0, 5.0, 5.0), "b"),
///     (Point3::new(1.0, 1.0, 1.0), "c"),
/// ]);
///
/// let region = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 2.0, 2.0));
/// assert_eq!(tree.range_query(&region), vec![&"a", &"c"]);
/// ```
#[derive(Debug, Clone)]
pub struct KdTree<T> {
    points: Vec<Point3<f64>>,
    payloads: Vec<T>,
    /// Insertion index of the point stored in each slot.
    insertion: Vec<usize>,
    nodes: Vec<Node>,
    root: Option<usize>,
    leaf_size: usize,
}

impl<T> KdTree<T> {
    /// Build a tree with [`DEFAULT_LEAF_SIZE`].
    #[must_use]
    pub fn build<I>(items: I) -> Self
    where
        I: IntoIterator<Item = (Point3<f64>, T)>,
    {
        Self::build_with_leaf_size(items, DEFAULT_LEAF_SIZE)
    }

    /// Build a tree with at most `leaf_size` points per leaf (clamped to 1).
    #[must_use]
    pub fn build_with_leaf_size<I>(items: I, leaf_size: usize) -> Self
    where
        I: IntoIterator<Item = (Point3<f64>, T)>,
    {
        let leaf_size = leaf_size.max(1);
        let (points, payloads): (Vec<_>, Vec<_>) = items.into_iter().unzip();

        let mut order: Vec<usize> = (0..points.len()).collect();
        let mut nodes = Vec::new();
        let root = if points.is_empty() {
            None
        } else {
            Some(build_node(&points, &mut order, 0, leaf_size, &mut nodes))
        };

        // Move points and payloads into slot order.
        let mut taken: Vec<Option<T>> = payloads.into_iter().map(Some).collect();
        let payloads: Vec<T> = order.iter().filter_map(|&i| taken[i].take()).collect();
        let points: Vec<Point3<f64>> = order.iter().map(|&i| points[i]).collect();

        let tree = Self {
            points,
            payloads,
            insertion: order,
            nodes,
            root,
            leaf_size,
        };

        debug!(
            points = tree.len(),
            nodes = tree.nodes.len(),
            depth = tree.depth(),
            leaf_size,
            "built k-d tree"
        );

        tree
    }

    /// Number of indexed points.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the tree holds no points.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Maximum points per leaf used at build time.
    #[inline]
    #[must_use]
    pub fn leaf_size(&self) -> usize {
        self.leaf_size
    }

    /// Bounds of all points; empty for an empty tree.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        self.root
            .map_or_else(Aabb::empty, |root| self.nodes[root].bounds)
    }

    /// Number of nodes on the longest root-to-leaf path (0 when empty).
    #[must_use]
    pub fn depth(&self) -> usize {
        let Some(root) = self.root else {
            return 0;
        };

        let mut deepest = 0;
        let mut stack: SmallVec<[(usize, usize); 32]> = SmallVec::new();
        stack.push((root, 1));
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            if let NodeKind::Split { left, right } = self.nodes[node].kind {
                stack.push((left, depth + 1));
                stack.push((right, depth + 1));
            }
        }
        deepest
    }

    /// Iterate over `(point, payload)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Point3<f64>, &T)> + '_ {
        let mut slots: Vec<usize> = (0..self.len()).collect();
        slots.sort_unstable_by_key(|&s| self.insertion[s]);
        slots
            .into_iter()
            .map(move |s| (&self.points[s], &self.payloads[s]))
    }

    /// Payloads whose point lies in `region`, in insertion order.
    #[must_use]
    pub fn query<R: Region + ?Sized>(&self, region: &R) -> Vec<&T> {
        self.query_with_stats(region).0
    }

    /// Payloads whose point lies inside an axis-aligned box, in insertion
    /// order. Box faces are inclusive.
    #[must_use]
    pub fn range_query(&self, bounds: &Aabb) -> Vec<&T> {
        self.query(bounds)
    }

    /// Insertion indices of the points inside `region`, ascending.
    #[must_use]
    pub fn query_indices<R: Region + ?Sized>(&self, region: &R) -> Vec<usize> {
        let mut hits = Vec::new();
        self.visit(region, |slot| hits.push(self.insertion[slot]));
        hits.sort_unstable();
        hits
    }

    /// Like [`Self::query`], also returning traversal counters.
    pub fn query_with_stats<R: Region + ?Sized>(&self, region: &R) -> (Vec<&T>, TraversalStats) {
        let mut slots = Vec::new();
        let stats = self.visit(region, |slot| slots.push(slot));
        slots.sort_unstable_by_key(|&s| self.insertion[s]);
        (slots.into_iter().map(|s| &self.payloads[s]).collect(), stats)
    }

    /// Call `on_hit` with the slot of every point inside `region`.
    ///
    /// Slots are reported in traversal order, not insertion order.
    fn visit<R, F>(&self, region: &R, mut on_hit: F) -> TraversalStats
    where
        R: Region + ?Sized,
        F: FnMut(usize),
    {
        let mut stats = TraversalStats::default();
        let Some(root) = self.root else {
            return stats;
        };

        let mut stack: SmallVec<[usize; 64]> = SmallVec::new();
        stack.push(root);

        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            stats.nodes_visited += 1;

            match region.classify_box(&node.bounds) {
                Containment::Outside => stats.subtrees_pruned += 1,
                Containment::Inside => {
                    stats.subtrees_accepted += 1;
                    (node.start..node.end).for_each(&mut on_hit);
                }
                Containment::Partial => match node.kind {
                    NodeKind::Split { left, right } => {
                        stack.push(right);
                        stack.push(left);
                    }
                    NodeKind::Leaf => {
                        for slot in node.start..node.end {
                            stats.points_tested += 1;
                            if region.contains(&self.points[slot]) {
                                on_hit(slot);
                            }
                        }
                    }
                },
            }
        }

        stats
    }
}

/// Build the subtree over `order` (slots `start..start + order.len()`),
/// returning its node index. Children are pushed before their parent.
fn build_node(
    points: &[Point3<f64>],
    order: &mut [usize],
    start: usize,
    leaf_size: usize,
    nodes: &mut Vec<Node>,
) -> usize {
    let bounds = Aabb::from_points(order.iter().map(|&i| &points[i]));
    let end = start + order.len();

    let kind = if order.len() <= leaf_size {
        order.sort_unstable();
        NodeKind::Leaf
    } else {
        let axis = bounds.longest_axis();
        let mid = order.len() / 2;
        // Ties on the split coordinate fall back to insertion order so the
        // partition is deterministic for coincident points.
        order.select_nth_unstable_by(mid, |&a, &b| {
            points[a][axis]
                .total_cmp(&points[b][axis])
                .then(a.cmp(&b))
        });

        let (lo, hi) = order.split_at_mut(mid);
        let left = build_node(points, lo, start, leaf_size, nodes);
        let right = build_node(points, hi, start + mid, leaf_size, nodes);
        NodeKind::Split { left, right }
    };

    nodes.push(Node {
        bounds,
        start,
        end,
        kind,
    });
    nodes.len() - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lattice(n: usize) -> Vec<(Point3<f64>, usize)> {
        let mut items = Vec::new();
        for i in 0..n {
            for j in 0..n {
                for k in 0..n {
                    items.push((Point3::new(i as f64, j as f64, k as f64), items.len()));
                }
            }
        }
        items
    }

    fn brute_force(items: &[(Point3<f64>, usize)], region: &Aabb) -> Vec<usize> {
        items
            .iter()
            .filter(|(p, _)| region.contains(p))
            .map(|(_, id)| *id)
            .collect()
    }

    #[test]
    fn empty_tree_returns_nothing() {
        let tree: KdTree<u32> = KdTree::build(Vec::new());
        assert!(tree.is_empty());
        assert_eq!(tree.depth(), 0);
        assert!(tree.bounds().is_empty());

        let region = Aabb::new(Point3::new(-1e9, -1e9, -1e9), Point3::new(1e9, 1e9, 1e9));
        assert!(tree.range_query(&region).is_empty());
    }

    #[test]
    fn single_point_tree() {
        let tree = KdTree::build(vec![(Point3::new(1.0, 2.0, 3.0), 7_u32)]);
        assert_eq!(tree.len(), 1);

        let hit = Aabb::from_point(Point3::new(1.0, 2.0, 3.0));
        let miss = Aabb::from_point(Point3::new(1.0, 2.0, 3.5));
        assert_eq!(tree.range_query(&hit), vec![&7]);
        assert!(tree.range_query(&miss).is_empty());
    }

    #[test]
    fn lattice_queries_match_brute_force() {
        let items = lattice(9);
        let tree = KdTree::build_with_leaf_size(items.clone(), 4);

        let regions = [
            Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 2.0, 2.0)),
            Aabb::new(Point3::new(1.5, -3.0, 4.0), Point3::new(6.5, 3.0, 4.0)),
            Aabb::new(Point3::new(-10.0, -10.0, -10.0), Point3::new(20.0, 20.0, 20.0)),
            Aabb::new(Point3::new(8.5, 8.5, 8.5), Point3::new(9.0, 9.0, 9.0)),
        ];

        for region in &regions {
            let got: Vec<usize> = tree.range_query(region).into_iter().copied().collect();
            assert_eq!(got, brute_force(&items, region), "region {region:?}");
            assert_eq!(tree.query_indices(region), brute_force(&items, region));
        }
    }

    #[test]
    fn coincident_points_keep_insertion_order() {
        let p = Point3::new(1.0, 1.0, 1.0);
        let items: Vec<_> = (0..50).map(|i| (p, i)).collect();
        let tree = KdTree::build_with_leaf_size(items, 3);

        let got: Vec<i32> = tree
            .range_query(&Aabb::from_point(p))
            .into_iter()
            .copied()
            .collect();
        assert_eq!(got, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn tree_is_balanced() {
        let tree = KdTree::build_with_leaf_size(lattice(10), 1);
        assert_eq!(tree.len(), 1000);
        // ceil(log2(1000)) + 1 levels
        assert!(tree.depth() <= 11, "depth {}", tree.depth());
    }

    #[test]
    fn whole_subtrees_are_accepted_without_testing_points() {
        let tree = KdTree::build_with_leaf_size(lattice(8), 4);
        let everything = Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(8.0, 8.0, 8.0));

        let (hits, stats) = tree.query_with_stats(&everything);
        assert_eq!(hits.len(), 512);
        assert_eq!(stats.nodes_visited, 1);
        assert_eq!(stats.subtrees_accepted, 1);
        assert_eq!(stats.points_tested, 0);
    }

    #[test]
    fn iter_is_in_insertion_order() {
        let items = vec![
            (Point3::new(3.0, 0.0, 0.0), 'a'),
            (Point3::new(1.0, 0.0, 0.0), 'b'),
            (Point3::new(2.0, 0.0, 0.0), 'c'),
        ];
        let tree = KdTree::build_with_leaf_size(items, 1);
        let order: String = tree.iter().map(|(_, c)| *c).collect();
        assert_eq!(order, "abc");
    }

    #[test]
    fn payloads_need_not_be_clone() {
        struct Opaque(u8);
        let tree = KdTree::build(vec![
            (Point3::origin(), Opaque(1)),
            (Point3::new(9.0, 9.0, 9.0), Opaque(2)),
        ]);
        let hits = tree.range_query(&Aabb::from_point(Point3::origin()));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, 1);
    }
}
