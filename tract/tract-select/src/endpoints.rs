//! Spatial index over streamline endpoints.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Instant;
use tracing::debug;
use tract_index::{ConvexPolytope, KdTree, clip};
use tract_types::{EndpointEntry, Point3, Streamline};

/// A k-d tree holding the start and end point of every streamline.
///
/// Build one over the unfiltered collection and pass it as
/// [`IndexSource::Cached`](crate::IndexSource::Cached) to reuse it across
/// box selections. Indices built over filtered subsets are independent
/// values and never touch a cached one.
///
/// The index remembers a fingerprint of the endpoint coordinates it was
/// built from, so [`Self::covers`] can tell a collection of the same length
/// but different content apart.
///
/// # Example
///
/// ```
/// use tract_select::EndpointIndex;
/// use tract_types::{Point3, Streamline};
///
/// let streamlines = vec![
///     Streamline::new(vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)]).unwrap(),
/// ];
/// let index = EndpointIndex::build(&streamlines, 8);
///
/// assert_eq!(index.streamline_count(), 1);
/// assert_eq!(index.len(), 2);
/// assert!(index.covers(&streamlines));
/// ```
#[derive(Debug, Clone)]
pub struct EndpointIndex {
    tree: KdTree<EndpointEntry>,
    streamline_count: usize,
    fingerprint: u64,
}

impl EndpointIndex {
    /// Index the endpoints of `streamlines`, two entries per streamline.
    #[must_use]
    pub fn build(streamlines: &[Streamline], leaf_size: usize) -> Self {
        let start = Instant::now();
        let tree = KdTree::build_with_leaf_size(EndpointEntry::collect_from(streamlines), leaf_size);

        debug!(
            streamlines = streamlines.len(),
            depth = tree.depth(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "built endpoint index"
        );

        Self {
            tree,
            streamline_count: streamlines.len(),
            fingerprint: endpoint_fingerprint(streamlines),
        }
    }

    /// Whether the index was built over exactly these endpoints.
    ///
    /// Hashes every endpoint of `streamlines`, which is linear but far
    /// cheaper than a rebuild. Interior vertices are not compared.
    #[must_use]
    pub fn covers(&self, streamlines: &[Streamline]) -> bool {
        self.streamline_count == streamlines.len()
            && self.fingerprint == endpoint_fingerprint(streamlines)
    }

    /// Hash of the endpoint coordinates the index was built from.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Number of streamlines the index was built over.
    #[must_use]
    pub fn streamline_count(&self) -> usize {
        self.streamline_count
    }

    /// Number of endpoint entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Whether the index holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// The underlying tree.
    #[must_use]
    pub fn tree(&self) -> &KdTree<EndpointEntry> {
        &self.tree
    }

    /// Streamlines with at least one endpoint inside `polytope`, ascending
    /// and without duplicates.
    #[must_use]
    pub fn streamlines_in(&self, polytope: &ConvexPolytope) -> Vec<usize> {
        let mut hit = vec![false; self.streamline_count];
        for entry in clip(&self.tree, polytope).inside {
            hit[entry.streamline] = true;
        }
        hit.iter()
            .enumerate()
            .filter_map(|(i, &h)| h.then_some(i))
            .collect()
    }
}

/// Order-sensitive hash of every start and end coordinate.
fn endpoint_fingerprint(streamlines: &[Streamline]) -> u64 {
    let mut hasher = DefaultHasher::new();
    streamlines.len().hash(&mut hasher);
    for streamline in streamlines {
        for point in [streamline.start(), streamline.end()] {
            for &c in point.coords.iter() {
                // +0.0 folds -0.0 into 0.0
                (c + 0.0).to_bits().hash(&mut hasher);
            }
        }
    }
    hasher.finish()
}

/// Endpoint coordinates interleaved as `[start0, end0, start1, end1, ...]`
/// for the streamlines at `candidates`.
pub(crate) fn endpoint_points(streamlines: &[Streamline], candidates: &[usize]) -> Vec<Point3<f64>> {
    candidates
        .iter()
        .flat_map(|&i| [streamlines[i].start(), streamlines[i].end()])
        .collect()
}
