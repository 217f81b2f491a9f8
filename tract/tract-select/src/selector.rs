//! Endpoint-based streamline selection.

use crate::config::SelectionConfig;
use crate::endpoints::{EndpointIndex, endpoint_points};
use crate::error::{SelectError, SelectResult};
use crate::region::{IndexSource, Membership, SelectionRegion};
use crate::result::SelectionResult;
use rayon::ThreadPool;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};
use tract_index::SelectionBox;
use tract_interior::{InteriorTester, RegionMesh};
use tract_types::Streamline;

/// Selects streamlines whose start or end point lies in a region.
///
/// Box selections run through an endpoint k-d tree; mesh selections run
/// parallel interior tests over all endpoints. Results are ascending
/// indices into the input slice, so the output of one selection can be fed
/// into the next.
///
/// The selector is `Send + Sync`; one instance can serve many threads.
///
/// # Example
///
/// ```
/// use tract_index::SelectionBox;
/// use tract_select::{IndexSource, StreamlineSelector};
/// use tract_types::{Point3, Streamline};
///
/// let streamlines = vec![
///     Streamline::new(vec![Point3::new(0.5, 0.5, 0.5), Point3::new(9.0, 9.0, 9.0)]).unwrap(),
///     Streamline::new(vec![Point3::new(7.0, 7.0, 7.0), Point3::new(8.0, 8.0, 8.0)]).unwrap(),
/// ];
/// let selection = SelectionBox::new(
///     Point3::origin(),
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 1.0),
/// );
///
/// let selector = StreamlineSelector::default();
/// let result = selector
///     .select_by_region(&streamlines, &selection, IndexSource::Rebuild)
///     .unwrap();
/// assert_eq!(result.indices(), &[0]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StreamlineSelector {
    config: SelectionConfig,
    pool: Option<Arc<ThreadPool>>,
}

impl StreamlineSelector {
    /// Create a selector that builds a scoped worker pool per mesh
    /// selection.
    #[must_use]
    pub fn new(config: SelectionConfig) -> Self {
        Self { config, pool: None }
    }

    /// Create a selector that runs mesh selections on a long-lived pool
    /// owned by the host.
    #[must_use]
    pub fn with_pool(config: SelectionConfig, pool: Arc<ThreadPool>) -> Self {
        Self {
            config,
            pool: Some(pool),
        }
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    /// Build an endpoint index suitable for [`IndexSource::Cached`].
    #[must_use]
    pub fn build_index(&self, streamlines: &[Streamline]) -> EndpointIndex {
        EndpointIndex::build(streamlines, self.config.leaf_size)
    }

    /// Select streamlines with at least one endpoint inside `selection`.
    ///
    /// Boundaries are inclusive; a zero-volume box acts as a plane.
    ///
    /// # Errors
    ///
    /// Returns [`SelectError::StaleIndex`] if a cached index was built over
    /// a different number of streamlines, and [`SelectError::ForeignIndex`]
    /// if it was built over different endpoints.
    pub fn select_by_region(
        &self,
        streamlines: &[Streamline],
        selection: &SelectionBox,
        source: IndexSource<'_>,
    ) -> SelectResult<SelectionResult> {
        let start = Instant::now();

        let rebuilt;
        let index = match source {
            IndexSource::Cached(index) => {
                if index.streamline_count() != streamlines.len() {
                    return Err(SelectError::stale_index(
                        index.streamline_count(),
                        streamlines.len(),
                    ));
                }
                if !index.covers(streamlines) {
                    return Err(SelectError::foreign_index(streamlines.len()));
                }
                index
            }
            IndexSource::Rebuild => {
                rebuilt = self.build_index(streamlines);
                &rebuilt
            }
        };

        if selection.is_degenerate() {
            debug!(
                min = ?selection.local_min,
                max = ?selection.local_max,
                "selection box has zero volume; selecting on its boundary"
            );
        }

        let indices = index.streamlines_in(&selection.to_polytope());
        info!(
            mode = "box",
            streamlines = streamlines.len(),
            selected = indices.len(),
            cached_index = matches!(source, IndexSource::Cached(_)),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "streamline selection"
        );

        Ok(SelectionResult::new(indices, streamlines.len(), None))
    }

    /// Select streamlines by endpoint membership in a closed mesh.
    ///
    /// With [`Membership::Include`] a streamline is kept when either
    /// endpoint is inside; with [`Membership::Exclude`] when neither is.
    /// Boundary points count as inside.
    ///
    /// # Errors
    ///
    /// Returns [`SelectError::Interior`] if the worker pool cannot be
    /// created.
    pub fn select_by_mesh(
        &self,
        streamlines: &[Streamline],
        mesh: &RegionMesh,
        membership: Membership,
    ) -> SelectResult<SelectionResult> {
        let all: Vec<usize> = (0..streamlines.len()).collect();
        let (indices, warning) = self.mesh_pass(streamlines, &all, mesh, membership)?;
        Ok(SelectionResult::new(indices, streamlines.len(), warning))
    }

    /// Apply mesh selection once per mesh, each pass over the survivors of
    /// the previous one.
    ///
    /// An empty mesh list selects everything.
    ///
    /// # Errors
    ///
    /// Same as [`Self::select_by_mesh`].
    pub fn select_by_meshes(
        &self,
        streamlines: &[Streamline],
        meshes: &[RegionMesh],
        membership: Membership,
    ) -> SelectResult<SelectionResult> {
        let mut current: Vec<usize> = (0..streamlines.len()).collect();
        let mut warning = None;

        for mesh in meshes {
            if current.is_empty() {
                break;
            }
            let (kept, pass_warning) = self.mesh_pass(streamlines, &current, mesh, membership)?;
            current = kept;
            warning = warning.or(pass_warning);
        }

        Ok(SelectionResult::new(current, streamlines.len(), warning))
    }

    /// Select against any [`SelectionRegion`].
    ///
    /// `source` is only consulted for box regions.
    ///
    /// # Errors
    ///
    /// See [`Self::select_by_region`] and [`Self::select_by_mesh`].
    pub fn select(
        &self,
        streamlines: &[Streamline],
        region: &SelectionRegion,
        source: IndexSource<'_>,
    ) -> SelectResult<SelectionResult> {
        match region {
            SelectionRegion::Box(selection) => self.select_by_region(streamlines, selection, source),
            SelectionRegion::Mesh { mesh, membership } => {
                self.select_by_mesh(streamlines, mesh, *membership)
            }
        }
    }

    /// Classify the endpoints of `candidates` and keep those matching
    /// `membership`, in candidate order.
    fn mesh_pass(
        &self,
        streamlines: &[Streamline],
        candidates: &[usize],
        mesh: &RegionMesh,
        membership: Membership,
    ) -> SelectResult<(Vec<usize>, Option<tract_interior::MeshQualityWarning>)> {
        let start = Instant::now();
        let points = endpoint_points(streamlines, candidates);
        let tester = InteriorTester::with_config(mesh, self.config.interior.clone());

        let classification = match &self.pool {
            Some(pool) => tester.classify_points_in(pool, &points),
            None => tester.classify_points(&points)?,
        };

        // endpoints 2k and 2k + 1 belong to candidate k
        let kept: Vec<usize> = candidates
            .iter()
            .enumerate()
            .filter(|&(k, _)| {
                let hit = classification.is_inside(2 * k) || classification.is_inside(2 * k + 1);
                membership.keeps(hit)
            })
            .map(|(_, &i)| i)
            .collect();

        info!(
            mode = "mesh",
            ?membership,
            streamlines = candidates.len(),
            selected = kept.len(),
            inside_endpoints = classification.len(),
            watertight = classification.warning.is_none(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "streamline selection"
        );

        Ok((kept, classification.warning))
    }
}

/// Box selection with the default configuration and a fresh index.
///
/// # Example
///
/// ```
/// use tract_index::SelectionBox;
/// use tract_select::select_by_region;
/// use tract_types::Point3;
///
/// let selection = SelectionBox::new(Point3::origin(), Point3::origin(), Point3::new(1.0, 1.0, 1.0));
/// assert!(select_by_region(&[], &selection).is_empty());
/// ```
#[must_use]
pub fn select_by_region(streamlines: &[Streamline], selection: &SelectionBox) -> SelectionResult {
    let index = EndpointIndex::build(streamlines, SelectionConfig::default().leaf_size);
    SelectionResult::new(
        index.streamlines_in(&selection.to_polytope()),
        streamlines.len(),
        None,
    )
}

/// Mesh selection with the default configuration; `inclusion` picks
/// [`Membership::Include`] or [`Membership::Exclude`].
///
/// # Errors
///
/// Returns [`SelectError::Interior`] if the worker pool cannot be created.
pub fn select_by_mesh(
    streamlines: &[Streamline],
    mesh: &RegionMesh,
    inclusion: bool,
) -> SelectResult<SelectionResult> {
    StreamlineSelector::default().select_by_mesh(streamlines, mesh, inclusion.into())
}
