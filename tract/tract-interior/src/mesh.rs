//! Closed triangle meshes used as selection regions.

use crate::error::{InteriorError, InteriorResult};
use nalgebra::Matrix4;
use tract_types::{Aabb, Point3, transform_point};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A validated triangle mesh describing a selection volume.
///
/// Every face index is in range, every coordinate is finite and there is at
/// least one triangle. The geometry is immutable; use [`Self::transformed`]
/// to obtain a moved copy.
///
/// Face winding is counter-clockwise when viewed from outside. Interior
/// classification only relies on crossing parity, so inconsistent winding
/// does not affect it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RegionMesh {
    vertices: Vec<Point3<f64>>,
    faces: Vec<[u32; 3]>,
}

impl RegionMesh {
    /// Create a mesh from vertex positions and triangle indices.
    ///
    /// # Errors
    ///
    /// - [`InteriorError::EmptyMesh`] if `faces` is empty
    /// - [`InteriorError::NonFiniteVertex`] for NaN/infinite coordinates
    /// - [`InteriorError::InvalidFaceIndex`] for out-of-range indices
    pub fn new(vertices: Vec<Point3<f64>>, faces: Vec<[u32; 3]>) -> InteriorResult<Self> {
        if faces.is_empty() {
            return Err(InteriorError::EmptyMesh);
        }

        if let Some(vertex) = vertices
            .iter()
            .position(|v| !(v.x.is_finite() && v.y.is_finite() && v.z.is_finite()))
        {
            return Err(InteriorError::NonFiniteVertex { vertex });
        }

        let vertex_count = vertices.len();
        for (face, indices) in faces.iter().enumerate() {
            if let Some(&vertex) = indices.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(InteriorError::InvalidFaceIndex {
                    face,
                    vertex,
                    vertex_count,
                });
            }
        }

        Ok(Self { vertices, faces })
    }

    /// Create a mesh from a flat `xyz` vertex buffer and a flat triangle
    /// index buffer.
    ///
    /// # Errors
    ///
    /// Returns [`InteriorError::MalformedBuffer`] when either buffer length
    /// is not a multiple of three, otherwise the errors of [`Self::new`].
    ///
    /// # Example
    ///
    /// ```
    /// use tract_interior::RegionMesh;
    ///
    /// let mesh = RegionMesh::from_raw(
    ///     &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
    ///     &[0, 1, 2],
    /// )
    /// .unwrap();
    /// assert_eq!(mesh.face_count(), 1);
    ///
    /// assert!(RegionMesh::from_raw(&[0.0, 0.0, 0.0], &[]).is_err());
    /// ```
    pub fn from_raw(vertices: &[f64], indices: &[u32]) -> InteriorResult<Self> {
        let vertices = split_triplets(vertices, "vertex")?
            .map(|c| Point3::new(c[0], c[1], c[2]))
            .collect();
        Self::new(vertices, faces_from_raw(indices)?)
    }

    /// Like [`Self::from_raw`] for single-precision vertex buffers, as
    /// delivered by most mesh readers.
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_raw`].
    pub fn from_raw_f32(vertices: &[f32], indices: &[u32]) -> InteriorResult<Self> {
        let vertices = split_triplets(vertices, "vertex")?
            .map(|c| Point3::new(f64::from(c[0]), f64::from(c[1]), f64::from(c[2])))
            .collect();
        Self::new(vertices, faces_from_raw(indices)?)
    }

    /// Closed box with outward-facing triangles.
    #[must_use]
    pub fn cuboid(min: Point3<f64>, max: Point3<f64>) -> Self {
        let b = Aabb::new(min, max);
        let (lo, hi) = (b.min, b.max);
        let vertices = vec![
            Point3::new(lo.x, lo.y, lo.z),
            Point3::new(hi.x, lo.y, lo.z),
            Point3::new(hi.x, hi.y, lo.z),
            Point3::new(lo.x, hi.y, lo.z),
            Point3::new(lo.x, lo.y, hi.z),
            Point3::new(hi.x, lo.y, hi.z),
            Point3::new(hi.x, hi.y, hi.z),
            Point3::new(lo.x, hi.y, hi.z),
        ];
        let faces = vec![
            [0, 2, 1],
            [0, 3, 2],
            [4, 5, 6],
            [4, 6, 7],
            [0, 1, 5],
            [0, 5, 4],
            [3, 7, 6],
            [3, 6, 2],
            [0, 4, 7],
            [0, 7, 3],
            [1, 2, 6],
            [1, 6, 5],
        ];
        Self { vertices, faces }
    }

    /// Axis-aligned cube of edge length 1 centred at the origin.
    #[must_use]
    pub fn unit_cube() -> Self {
        Self::cuboid(Point3::new(-0.5, -0.5, -0.5), Point3::new(0.5, 0.5, 0.5))
    }

    /// Return a copy with every vertex mapped through `matrix`.
    ///
    /// The receiver is untouched, so one mesh can serve several selections
    /// under different placements.
    #[must_use]
    pub fn transformed(&self, matrix: &Matrix4<f64>) -> Self {
        Self {
            vertices: self
                .vertices
                .iter()
                .map(|v| transform_point(matrix, v))
                .collect(),
            faces: self.faces.clone(),
        }
    }

    /// Vertex positions.
    #[inline]
    #[must_use]
    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    /// Triangle indices.
    #[inline]
    #[must_use]
    pub fn faces(&self) -> &[[u32; 3]] {
        &self.faces
    }

    /// Number of vertices.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles (always at least one).
    #[inline]
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Corner positions of triangle `face`.
    #[inline]
    #[must_use]
    pub fn triangle(&self, face: usize) -> [Point3<f64>; 3] {
        let [a, b, c] = self.faces[face];
        [
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
        ]
    }

    /// Bounding box of the referenced geometry.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.vertices.iter())
    }

    /// Signed enclosed volume; positive for outward winding.
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        (0..self.faces.len())
            .map(|f| {
                let [a, b, c] = self.triangle(f);
                a.coords.dot(&b.coords.cross(&c.coords))
            })
            .sum::<f64>()
            / 6.0
    }
}

fn split_triplets<'a, T>(
    buffer: &'a [T],
    name: &'static str,
) -> InteriorResult<std::slice::ChunksExact<'a, T>> {
    if buffer.len() % 3 == 0 {
        Ok(buffer.chunks_exact(3))
    } else {
        Err(InteriorError::MalformedBuffer {
            buffer: name,
            len: buffer.len(),
        })
    }
}

fn faces_from_raw(indices: &[u32]) -> InteriorResult<Vec<[u32; 3]>> {
    Ok(split_triplets(indices, "index")?
        .map(|c| [c[0], c[1], c[2]])
        .collect())
}
