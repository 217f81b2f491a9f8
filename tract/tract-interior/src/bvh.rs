//! Bounding Volume Hierarchy over mesh triangles.
//!
//! Gathers candidate triangles for ray casts and boundary probes so that
//! each interior test touches `O(log n + k)` triangles instead of all of
//! them. The hierarchy is built once per mesh and shared read-only between
//! workers.

use crate::mesh::RegionMesh;
use nalgebra::Vector3;
use smallvec::SmallVec;
use tract_types::{Aabb, Point3};

/// BVH node containing either leaf triangles or child nodes.
#[derive(Debug, Clone)]
pub enum BvhNode {
    /// Leaf node containing triangle indices.
    Leaf {
        /// Bounds of all triangles in this leaf.
        bbox: Aabb,
        /// Triangle indices stored in this leaf.
        triangles: SmallVec<[u32; 8]>,
    },
    /// Internal node with two children.
    Internal {
        /// Bounds of all triangles in this subtree.
        bbox: Aabb,
        /// Left child node.
        left: Box<Self>,
        /// Right child node.
        right: Box<Self>,
    },
}

impl BvhNode {
    /// Bounding box of this node.
    #[must_use]
    pub fn bbox(&self) -> &Aabb {
        match self {
            Self::Leaf { bbox, .. } | Self::Internal { bbox, .. } => bbox,
        }
    }
}

/// Bounding Volume Hierarchy for a [`RegionMesh`].
#[derive(Debug, Clone)]
pub struct Bvh {
    root: Option<BvhNode>,
    triangle_count: usize,
}

impl Bvh {
    /// Build a BVH with at most `max_leaf_size` triangles per leaf.
    ///
    /// Splits at the median triangle centre along the longest axis.
    #[must_use]
    pub fn build(mesh: &RegionMesh, max_leaf_size: usize) -> Self {
        let triangles: Vec<(u32, Aabb)> = (0..mesh.face_count())
            .map(|f| {
                let corners = mesh.triangle(f);
                (f as u32, Aabb::from_points(corners.iter()))
            })
            .collect();

        if triangles.is_empty() {
            return Self {
                root: None,
                triangle_count: 0,
            };
        }

        let indices: Vec<usize> = (0..triangles.len()).collect();
        let root = Self::build_recursive(&triangles, indices, max_leaf_size.max(1));

        Self {
            root: Some(root),
            triangle_count: triangles.len(),
        }
    }

    fn build_recursive(
        triangles: &[(u32, Aabb)],
        indices: Vec<usize>,
        max_leaf_size: usize,
    ) -> BvhNode {
        let mut bbox = Aabb::empty();
        for &i in &indices {
            bbox.merge(&triangles[i].1);
        }

        if indices.len() <= max_leaf_size {
            return BvhNode::Leaf {
                bbox,
                triangles: indices.iter().map(|&i| triangles[i].0).collect(),
            };
        }

        let axis = bbox.longest_axis();
        let mut sorted = indices;
        sorted.sort_by(|&a, &b| {
            triangles[a].1.center()[axis].total_cmp(&triangles[b].1.center()[axis])
        });

        let right_indices = sorted.split_off(sorted.len() / 2);
        let left = Self::build_recursive(triangles, sorted, max_leaf_size);
        let right = Self::build_recursive(triangles, right_indices, max_leaf_size);

        BvhNode::Internal {
            bbox,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Append to `out` every triangle whose padded bounds the ray
    /// `origin + t * direction, t >= 0` passes through.
    ///
    /// `out` is cleared first so that callers can reuse one buffer per worker.
    pub fn ray_candidates(
        &self,
        origin: &Point3<f64>,
        direction: &Vector3<f64>,
        padding: f64,
        out: &mut Vec<u32>,
    ) {
        out.clear();
        let inv = direction.map(|d| 1.0 / d);
        self.collect(out, |bbox| ray_hits_box(origin, direction, &inv, &bbox.expanded(padding)));
    }

    /// Append to `out` every triangle whose bounds lie within `padding` of
    /// `point`. `out` is cleared first.
    pub fn point_candidates(&self, point: &Point3<f64>, padding: f64, out: &mut Vec<u32>) {
        out.clear();
        self.collect(out, |bbox| bbox.expanded(padding).contains(point));
    }

    fn collect<F>(&self, out: &mut Vec<u32>, mut visit: F)
    where
        F: FnMut(&Aabb) -> bool,
    {
        let Some(root) = &self.root else {
            return;
        };

        let mut stack: SmallVec<[&BvhNode; 32]> = SmallVec::new();
        stack.push(root);
        while let Some(node) = stack.pop() {
            if !visit(node.bbox()) {
                continue;
            }
            match node {
                BvhNode::Leaf { triangles, .. } => out.extend(triangles.iter().copied()),
                BvhNode::Internal { left, right, .. } => {
                    stack.push(&**right);
                    stack.push(&**left);
                }
            }
        }
    }

    /// Number of triangles in the hierarchy.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangle_count
    }

    /// Whether the hierarchy holds no triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Bounds of the whole mesh.
    #[must_use]
    pub fn root_bbox(&self) -> Option<&Aabb> {
        self.root.as_ref().map(BvhNode::bbox)
    }
}

/// Slab test for a ray starting at `origin` with `t >= 0`.
fn ray_hits_box(
    origin: &Point3<f64>,
    direction: &Vector3<f64>,
    inv: &Vector3<f64>,
    bbox: &Aabb,
) -> bool {
    let mut t_min = 0.0_f64;
    let mut t_max = f64::INFINITY;

    for axis in 0..3 {
        let o = origin[axis];
        let (lo, hi) = (bbox.min[axis], bbox.max[axis]);
        if direction[axis] == 0.0 {
            if o < lo || o > hi {
                return false;
            }
            continue;
        }

        let t1 = (lo - o) * inv[axis];
        let t2 = (hi - o) * inv[axis];
        t_min = t_min.max(t1.min(t2));
        t_max = t_max.min(t1.max(t2));
        if t_min > t_max {
            return false;
        }
    }

    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sorted(mut v: Vec<u32>) -> Vec<u32> {
        v.sort_unstable();
        v
    }

    #[test]
    fn build_counts_triangles() {
        let mesh = RegionMesh::unit_cube();
        let bvh = Bvh::build(&mesh, 2);
        assert_eq!(bvh.triangle_count(), 12);
        assert!(!bvh.is_empty());

        let root = bvh.root_bbox().unwrap();
        assert_eq!(root.min, Point3::new(-0.5, -0.5, -0.5));
        assert_eq!(root.max, Point3::new(0.5, 0.5, 0.5));
    }

    #[test]
    fn every_triangle_is_in_some_leaf() {
        let mesh = RegionMesh::unit_cube();
        let bvh = Bvh::build(&mesh, 1);
        let mut out = Vec::new();
        bvh.point_candidates(&Point3::origin(), 10.0, &mut out);
        assert_eq!(sorted(out), (0..12).collect::<Vec<_>>());
    }

    #[test]
    fn ray_candidates_skip_far_triangles() {
        let mesh = RegionMesh::unit_cube();
        let bvh = Bvh::build(&mesh, 1);
        let mut out = Vec::new();

        // Straight up the z axis from far below: only the z faces.
        bvh.ray_candidates(
            &Point3::new(0.1, 0.1, -10.0),
            &Vector3::z(),
            1e-9,
            &mut out,
        );
        let candidates = sorted(out.clone());
        assert!(candidates.contains(&0) && candidates.contains(&1));
        assert!(candidates.contains(&2) && candidates.contains(&3));

        // Pointing away from the mesh.
        bvh.ray_candidates(&Point3::new(5.0, 5.0, 5.0), &Vector3::x(), 1e-9, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn slab_test_handles_axis_parallel_rays() {
        let bbox = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let d = Vector3::x();
        let inv = d.map(|c| 1.0 / c);

        assert!(ray_hits_box(&Point3::new(-5.0, 0.5, 0.5), &d, &inv, &bbox));
        assert!(!ray_hits_box(&Point3::new(-5.0, 1.5, 0.5), &d, &inv, &bbox));
        assert!(!ray_hits_box(&Point3::new(5.0, 0.5, 0.5), &d, &inv, &bbox));
        // origin inside the box
        assert!(ray_hits_box(&Point3::new(0.5, 0.5, 0.5), &d, &inv, &bbox));
    }
}
