//! Point-in-solid classification by ray parity.

use crate::adjacency::{MeshQuality, MeshQualityWarning};
use crate::bvh::Bvh;
use crate::config::InteriorConfig;
use crate::error::{InteriorError, InteriorResult};
use crate::intersect::{RayCrossing, point_triangle_distance, ray_triangle_crossing};
use crate::mesh::RegionMesh;
use hashbrown::HashSet;
use nalgebra::Vector3;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::time::Instant;
use tracing::{debug, info, warn};
use tract_types::Point3;

/// Parity ray directions, tried in order. All are off every axis and
/// diagonal, and no two are parallel, so a point whose ray passes through
/// an edge or vertex along one of them gets a clean ray along another.
pub const RAY_DIRECTIONS: [[f64; 3]; 5] = [
    [1.0, 1.237e-4, 3.179e-4],
    [-0.2317, 1.0, 0.4129],
    [0.3719, -0.5813, 1.0],
    [-1.0, -0.6173, -0.2791],
    [0.5407, 0.8861, -0.7243],
];

/// Outcome of a single point test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointInMeshResult {
    /// Whether the point is classified inside.
    pub inside: bool,
    /// Whether the point was within the boundary tolerance of the surface.
    pub on_boundary: bool,
    /// Number of ray crossings counted along the deciding ray (0 for
    /// boundary points).
    pub crossings: usize,
    /// Number of rays cast (0 for boundary points). More than one means
    /// earlier rays passed through an edge or vertex.
    pub rays: usize,
}

/// Per-worker scratch buffers for interior tests.
///
/// Each worker owns one; nothing in it is shared between threads.
#[derive(Debug, Default)]
pub struct QueryScratch {
    candidates: Vec<u32>,
}

/// Indices of the points classified inside, plus the mesh quality warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Inside indices, ascending.
    pub inside: Vec<usize>,
    /// Number of points that were classified.
    pub point_count: usize,
    /// Set when the mesh is not watertight.
    pub warning: Option<MeshQualityWarning>,
}

impl Classification {
    /// Whether point `index` was classified inside.
    #[must_use]
    pub fn is_inside(&self, index: usize) -> bool {
        self.inside.binary_search(&index).is_ok()
    }

    /// Number of inside points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inside.len()
    }

    /// Whether no point was inside.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inside.is_empty()
    }

    /// The inside indices as a hash set.
    #[must_use]
    pub fn to_set(&self) -> HashSet<usize> {
        self.inside.iter().copied().collect()
    }
}

/// Interior tester bound to one immutable mesh.
///
/// Construction builds the BVH and the quality report once; afterwards the
/// tester is read-only and can be shared across threads.
///
/// # Example
///
/// ```
/// use tract_interior::{InteriorTester, RegionMesh};
/// use tract_types::Point3;
///
/// let mesh = RegionMesh::unit_cube();
/// let tester = InteriorTester::new(&mesh);
///
/// assert!(tester.contains(&Point3::new(0.0, 0.0, 0.0)));
/// assert!(!tester.contains(&Point3::new(10.0, 10.0, 10.0)));
/// ```
#[derive(Debug)]
pub struct InteriorTester<'m> {
    mesh: &'m RegionMesh,
    bvh: Bvh,
    config: InteriorConfig,
    quality: MeshQuality,
}

impl<'m> InteriorTester<'m> {
    /// Create a tester with [`InteriorConfig::default`].
    #[must_use]
    pub fn new(mesh: &'m RegionMesh) -> Self {
        Self::with_config(mesh, InteriorConfig::default())
    }

    /// Create a tester with a custom configuration.
    #[must_use]
    pub fn with_config(mesh: &'m RegionMesh, config: InteriorConfig) -> Self {
        let bvh = Bvh::build(mesh, config.bvh_leaf_size);
        let quality = MeshQuality::analyze(mesh);

        if let Some(warning) = quality.warning() {
            warn!(
                boundary_edges = warning.boundary_edges,
                non_manifold_edges = warning.non_manifold_edges,
                "selection mesh is not watertight; interior results near gaps are unreliable"
            );
        }
        if quality.degenerate_faces > 0 {
            debug!(
                degenerate_faces = quality.degenerate_faces,
                "degenerate triangles will be skipped"
            );
        }

        Self {
            mesh,
            bvh,
            config,
            quality,
        }
    }

    /// The mesh under test.
    #[must_use]
    pub fn mesh(&self) -> &RegionMesh {
        self.mesh
    }

    /// Topological quality of the mesh.
    #[must_use]
    pub fn quality(&self) -> &MeshQuality {
        &self.quality
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &InteriorConfig {
        &self.config
    }

    /// Whether `point` is inside the mesh. Boundary points are inside.
    #[must_use]
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        self.test_point(point, &mut QueryScratch::default()).inside
    }

    /// Classify one point, reusing the caller's scratch buffers.
    ///
    /// Rays are cast along a fixed list of directions until one crosses
    /// no edge or vertex, so the result is the same on every call and
    /// every worker.
    pub fn test_point(&self, point: &Point3<f64>, scratch: &mut QueryScratch) -> PointInMeshResult {
        let tolerance = self.config.boundary_tolerance;
        self.bvh
            .point_candidates(point, tolerance, &mut scratch.candidates);
        let on_boundary = scratch
            .candidates
            .iter()
            .any(|&f| point_triangle_distance(point, &self.mesh.triangle(f as usize)) <= tolerance);
        if on_boundary {
            return PointInMeshResult {
                inside: true,
                on_boundary: true,
                crossings: 0,
                rays: 0,
            };
        }

        let mut result = PointInMeshResult {
            inside: false,
            on_boundary: false,
            crossings: 0,
            rays: 0,
        };
        for raw in RAY_DIRECTIONS {
            let (crossings, grazing) = self.cast(point, &Vector3::from(raw), scratch);
            result.rays += 1;
            result.crossings = crossings;
            result.inside = crossings % 2 == 1;
            if !grazing {
                return result;
            }
        }

        debug!(
            x = point.x,
            y = point.y,
            z = point.z,
            rays = result.rays,
            "every parity ray touched an edge; keeping the last count"
        );
        result
    }

    /// Count crossings along one ray. Grazing hits are counted too, and
    /// reported so the caller can discard the ray.
    fn cast(
        &self,
        point: &Point3<f64>,
        direction: &Vector3<f64>,
        scratch: &mut QueryScratch,
    ) -> (usize, bool) {
        self.bvh.ray_candidates(
            point,
            direction,
            self.config.epsilon,
            &mut scratch.candidates,
        );

        let mut crossings = 0;
        let mut grazing = false;
        for &f in &scratch.candidates {
            match ray_triangle_crossing(
                point,
                direction,
                &self.mesh.triangle(f as usize),
                self.config.parallel_tolerance,
                self.config.edge_tolerance,
            ) {
                RayCrossing::Miss => {}
                RayCrossing::Hit(_) => crossings += 1,
                RayCrossing::Grazing => {
                    crossings += 1;
                    grazing = true;
                }
            }
        }
        (crossings, grazing)
    }

    /// Classify a batch of points on a worker pool created for this call.
    ///
    /// The pool has `worker_count` threads and is torn down before
    /// returning. Batches below `parallel_threshold` run on the calling
    /// thread instead.
    ///
    /// # Errors
    ///
    /// Returns [`InteriorError::WorkerPool`] if the pool cannot be created.
    pub fn classify_points(&self, points: &[Point3<f64>]) -> InteriorResult<Classification> {
        if points.len() < self.config.parallel_threshold || self.config.worker_count <= 1 {
            return Ok(self.classify_sequential(points));
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(self.config.worker_count)
            .thread_name(|i| format!("tract-interior-{i}"))
            .build()
            .map_err(InteriorError::worker_pool)?;

        Ok(self.classify_points_in(&pool, points))
    }

    /// Classify a batch of points on a caller-owned pool.
    ///
    /// The result does not depend on the pool size or scheduling.
    #[must_use]
    pub fn classify_points_in(&self, pool: &ThreadPool, points: &[Point3<f64>]) -> Classification {
        let start = Instant::now();
        let inside: Vec<usize> = pool.install(|| {
            points
                .par_iter()
                .enumerate()
                .map_init(QueryScratch::default, |scratch, (i, p)| {
                    self.test_point(p, scratch).inside.then_some(i)
                })
                .flatten()
                .collect()
        });

        self.finish(inside, points.len(), pool.current_num_threads(), start)
    }

    fn classify_sequential(&self, points: &[Point3<f64>]) -> Classification {
        let start = Instant::now();
        let mut scratch = QueryScratch::default();
        let inside = points
            .iter()
            .enumerate()
            .filter(|(_, p)| self.test_point(p, &mut scratch).inside)
            .map(|(i, _)| i)
            .collect();

        self.finish(inside, points.len(), 1, start)
    }

    fn finish(
        &self,
        inside: Vec<usize>,
        point_count: usize,
        workers: usize,
        start: Instant,
    ) -> Classification {
        info!(
            points = point_count,
            inside = inside.len(),
            workers,
            triangles = self.mesh.face_count(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "classified points against selection mesh"
        );

        Classification {
            inside,
            point_count,
            warning: self.quality.warning(),
        }
    }
}

/// Classify `points` against `mesh` with the given configuration.
///
/// Builds a tester and a scoped worker pool for this call only.
///
/// # Errors
///
/// Returns [`InteriorError::WorkerPool`] if the pool cannot be created.
pub fn classify_points(
    mesh: &RegionMesh,
    points: &[Point3<f64>],
    config: &InteriorConfig,
) -> InteriorResult<Classification> {
    InteriorTester::with_config(mesh, config.clone()).classify_points(points)
}
