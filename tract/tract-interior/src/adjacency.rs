//! Edge adjacency and watertightness checks.

use crate::intersect::is_degenerate;
use crate::mesh::RegionMesh;
use hashbrown::HashMap;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Topological quality of a selection mesh.
///
/// Ray-parity classification is only reliable on watertight meshes;
/// boundary or non-manifold edges are reported so callers can treat
/// results near those gaps as lower confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MeshQuality {
    /// Number of distinct undirected edges.
    pub edge_count: usize,
    /// Edges used by exactly one triangle (holes).
    pub boundary_edges: usize,
    /// Edges used by more than two triangles.
    pub non_manifold_edges: usize,
    /// Triangles with zero area or repeated vertex indices. Faces with
    /// repeated indices are left out of the edge counts.
    pub degenerate_faces: usize,
}

impl MeshQuality {
    /// Analyze a mesh.
    ///
    /// # Example
    ///
    /// ```
    /// use tract_interior::{MeshQuality, RegionMesh};
    ///
    /// let quality = MeshQuality::analyze(&RegionMesh::unit_cube());
    /// assert!(quality.is_watertight());
    /// assert_eq!(quality.edge_count, 18);
    /// ```
    #[must_use]
    pub fn analyze(mesh: &RegionMesh) -> Self {
        let mut edge_faces: HashMap<(u32, u32), u32> = HashMap::new();
        let mut degenerate_faces = 0;

        for (face, &[a, b, c]) in mesh.faces().iter().enumerate() {
            // Collapsed faces have no area and close no edges
            if a == b || b == c || c == a {
                degenerate_faces += 1;
                continue;
            }
            if is_degenerate(&mesh.triangle(face)) {
                degenerate_faces += 1;
            }
            for edge in [normalize_edge(a, b), normalize_edge(b, c), normalize_edge(c, a)] {
                *edge_faces.entry(edge).or_default() += 1;
            }
        }

        Self {
            edge_count: edge_faces.len(),
            boundary_edges: edge_faces.values().filter(|&&n| n == 1).count(),
            non_manifold_edges: edge_faces.values().filter(|&&n| n > 2).count(),
            degenerate_faces,
        }
    }

    /// No boundary edges and no non-manifold edges.
    #[must_use]
    pub fn is_watertight(&self) -> bool {
        self.boundary_edges == 0 && self.non_manifold_edges == 0
    }

    /// The warning to attach to results computed against this mesh, if any.
    #[must_use]
    pub fn warning(&self) -> Option<MeshQualityWarning> {
        (!self.is_watertight()).then_some(MeshQualityWarning {
            boundary_edges: self.boundary_edges,
            non_manifold_edges: self.non_manifold_edges,
        })
    }
}

/// Soft warning: the mesh has topological gaps, so points near them may be
/// misclassified. Never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MeshQualityWarning {
    /// Edges used by exactly one triangle.
    pub boundary_edges: usize,
    /// Edges used by more than two triangles.
    pub non_manifold_edges: usize,
}

impl fmt::Display for MeshQualityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "selection mesh is not watertight ({} boundary edges, {} non-manifold edges); \
             points near the gaps may be misclassified",
            self.boundary_edges, self.non_manifold_edges
        )
    }
}

fn normalize_edge(a: u32, b: u32) -> (u32, u32) {
    if a < b { (a, b) } else { (b, a) }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tract_types::Point3;

    #[test]
    fn closed_cube_is_watertight() {
        let quality = MeshQuality::analyze(&RegionMesh::unit_cube());
        assert_eq!(quality.boundary_edges, 0);
        assert_eq!(quality.non_manifold_edges, 0);
        assert_eq!(quality.degenerate_faces, 0);
        assert!(quality.warning().is_none());
    }

    #[test]
    fn open_cube_reports_boundary() {
        let cube = RegionMesh::unit_cube();
        let open = RegionMesh::new(cube.vertices().to_vec(), cube.faces()[2..].to_vec()).unwrap();

        let quality = MeshQuality::analyze(&open);
        assert_eq!(quality.boundary_edges, 4);
        assert!(!quality.is_watertight());

        let warning = quality.warning().unwrap();
        assert_eq!(warning.boundary_edges, 4);
        assert!(warning.to_string().contains("not watertight"));
    }

    #[test]
    fn fin_is_non_manifold() {
        let cube = RegionMesh::unit_cube();
        let mut vertices = cube.vertices().to_vec();
        vertices.push(Point3::new(0.0, 0.0, 2.0));
        let mut faces = cube.faces().to_vec();
        // extra triangle on the top edge 4-5
        faces.push([4, 5, 8]);

        let quality = MeshQuality::analyze(&RegionMesh::new(vertices, faces).unwrap());
        assert_eq!(quality.non_manifold_edges, 1);
        assert!(quality.boundary_edges > 0);
    }

    #[test]
    fn repeated_indices_are_degenerate() {
        let mesh = RegionMesh::new(
            vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)],
            vec![[0, 1, 2], [0, 0, 1]],
        )
        .unwrap();
        assert_eq!(MeshQuality::analyze(&mesh).degenerate_faces, 1);
    }

    #[test]
    fn collapsed_face_keeps_closed_mesh_watertight() {
        let cube = RegionMesh::unit_cube();
        for collapsed in [[0, 0, 1], [6, 2, 6], [3, 3, 3]] {
            let mut faces = cube.faces().to_vec();
            faces.push(collapsed);
            let quality = MeshQuality::analyze(&RegionMesh::new(cube.vertices().to_vec(), faces).unwrap());

            assert_eq!(quality.degenerate_faces, 1, "face = {collapsed:?}");
            assert_eq!(quality.edge_count, 18);
            assert!(quality.is_watertight(), "face = {collapsed:?}");
            assert!(quality.warning().is_none());
        }
    }

    #[test]
    fn collinear_face_still_closes_edges() {
        // A zero-area sliver with distinct indices is part of the topology
        let vertices = vec![
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        let quality = MeshQuality::analyze(&RegionMesh::new(vertices, vec![[0, 1, 2]]).unwrap());
        assert_eq!(quality.degenerate_faces, 1);
        assert_eq!(quality.boundary_edges, 3);
    }
}
