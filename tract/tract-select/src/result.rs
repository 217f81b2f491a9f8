//! Selection results.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{SeedableRng, thread_rng};
use std::cmp::Ordering;
use tract_interior::MeshQualityWarning;
use tract_types::Streamline;

/// The streamlines chosen by a selection, as ascending indices into the
/// collection that was searched.
///
/// An empty result is a valid outcome and never means "everything".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionResult {
    indices: Vec<usize>,
    source_len: usize,
    warning: Option<MeshQualityWarning>,
}

impl SelectionResult {
    /// Create a result; `indices` must be ascending and below `source_len`.
    pub(crate) fn new(
        indices: Vec<usize>,
        source_len: usize,
        warning: Option<MeshQualityWarning>,
    ) -> Self {
        debug_assert!(indices.windows(2).all(|w| w[0] < w[1]));
        debug_assert!(indices.last().is_none_or(|&i| i < source_len));
        Self {
            indices,
            source_len,
            warning,
        }
    }

    /// Every streamline of a collection of `source_len`.
    #[must_use]
    pub fn all(source_len: usize) -> Self {
        Self::new((0..source_len).collect(), source_len, None)
    }

    /// Selected indices, ascending.
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Consume the result and return the indices.
    #[must_use]
    pub fn into_indices(self) -> Vec<usize> {
        self.indices
    }

    /// Number of selected streamlines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether nothing was selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Size of the collection the selection was made from.
    #[must_use]
    pub fn source_len(&self) -> usize {
        self.source_len
    }

    /// Set when a mesh with topological gaps took part in the selection.
    #[must_use]
    pub fn warning(&self) -> Option<&MeshQualityWarning> {
        self.warning.as_ref()
    }

    /// Whether streamline `index` was selected.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.indices.binary_search(&index).is_ok()
    }

    /// Borrow the selected streamlines out of the searched collection.
    #[must_use]
    pub fn select_from<'s>(&self, streamlines: &'s [Streamline]) -> Vec<&'s Streamline> {
        self.indices.iter().filter_map(|&i| streamlines.get(i)).collect()
    }

    /// Copy the selected streamlines into a new collection, ready to be
    /// searched again.
    #[must_use]
    pub fn to_streamlines(&self, streamlines: &[Streamline]) -> Vec<Streamline> {
        self.select_from(streamlines).into_iter().cloned().collect()
    }

    /// Map a selection made over [`Self::to_streamlines`] back to indices
    /// of the original collection.
    ///
    /// Indices in `inner` beyond this result are ignored.
    #[must_use]
    pub fn refine(&self, inner: &Self) -> Self {
        let indices = inner
            .indices
            .iter()
            .filter_map(|&i| self.indices.get(i).copied())
            .collect();
        Self::new(indices, self.source_len, self.warning.or(inner.warning))
    }

    /// Streamlines selected by both results.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        let (a, b) = (&self.indices, &other.indices);
        let mut indices = Vec::with_capacity(a.len().min(b.len()));
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    indices.push(a[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
        Self::new(
            indices,
            self.source_len.max(other.source_len),
            self.warning.or(other.warning),
        )
    }

    /// Streamlines of the source collection not in this result.
    #[must_use]
    pub fn complement(&self) -> Self {
        let indices = (0..self.source_len).filter(|&i| !self.contains(i)).collect();
        Self::new(indices, self.source_len, self.warning)
    }

    /// The selected indices in random display order.
    ///
    /// A seed makes the order reproducible. Index identity is unaffected;
    /// only the order of presentation changes.
    #[must_use]
    pub fn shuffled(&self, seed: Option<u64>) -> Vec<usize> {
        let mut order = self.indices.clone();
        match seed {
            Some(seed) => order.shuffle(&mut StdRng::seed_from_u64(seed)),
            None => order.shuffle(&mut thread_rng()),
        }
        order
    }
}
