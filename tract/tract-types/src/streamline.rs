//! Streamlines and tractograms.

use crate::{Aabb, AffineReport, TractError, TractResult, transform_point};
use nalgebra::{Matrix4, Point3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Minimum number of vertices in a valid streamline.
pub const MIN_STREAMLINE_VERTICES: usize = 2;

/// Vertices closer than this to the origin are treated as reader padding
/// and dropped by [`Tractogram::from_raw_lines`].
pub const PADDING_VERTEX_NORM: f64 = 0.001;

/// One fiber tract: an ordered polyline with at least two vertices.
///
/// A streamline has no identity of its own; it is identified by its
/// position in the owning collection. The vertex data is never mutated
/// after construction.
///
/// # Example
///
/// ```
/// use tract_types::{Point3, Streamline};
///
/// let line = Streamline::from_flat(&[0.0, 0.0, 0.0, 3.0, 4.0, 0.0]).unwrap();
/// assert_eq!(line.len(), 2);
/// assert_eq!(line.end(), Point3::new(3.0, 4.0, 0.0));
///
/// assert!(Streamline::new(vec![Point3::origin()]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Streamline {
    vertices: Vec<Point3<f64>>,
}

impl Streamline {
    /// Create a streamline from its vertices.
    ///
    /// # Errors
    ///
    /// Returns [`TractError::InsufficientVertices`] for fewer than two
    /// vertices and [`TractError::NonFiniteVertex`] for NaN/infinite
    /// coordinates.
    pub fn new(vertices: Vec<Point3<f64>>) -> TractResult<Self> {
        if vertices.len() < MIN_STREAMLINE_VERTICES {
            return Err(TractError::insufficient_vertices(
                MIN_STREAMLINE_VERTICES,
                vertices.len(),
            ));
        }

        if let Some(vertex) = vertices
            .iter()
            .position(|v| !(v.x.is_finite() && v.y.is_finite() && v.z.is_finite()))
        {
            return Err(TractError::NonFiniteVertex { vertex });
        }

        Ok(Self { vertices })
    }

    /// Create a streamline from an interleaved `[x0, y0, z0, x1, ...]` buffer.
    ///
    /// # Errors
    ///
    /// Returns [`TractError::MalformedBuffer`] if the length is not a
    /// multiple of three, otherwise the same errors as [`Self::new`].
    pub fn from_flat(coords: &[f64]) -> TractResult<Self> {
        if coords.len() % 3 != 0 {
            return Err(TractError::MalformedBuffer { len: coords.len() });
        }

        let vertices = coords
            .chunks_exact(3)
            .map(|c| Point3::new(c[0], c[1], c[2]))
            .collect();

        Self::new(vertices)
    }

    /// The vertices in order.
    #[inline]
    #[must_use]
    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    /// Number of vertices (always at least two).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// First vertex.
    #[inline]
    #[must_use]
    pub fn start(&self) -> Point3<f64> {
        self.vertices[0]
    }

    /// Last vertex.
    #[inline]
    #[must_use]
    pub fn end(&self) -> Point3<f64> {
        self.vertices[self.vertices.len() - 1]
    }

    /// The endpoint with the given role.
    #[inline]
    #[must_use]
    pub fn endpoint(&self, role: EndpointRole) -> Point3<f64> {
        match role {
            EndpointRole::Start => self.start(),
            EndpointRole::End => self.end(),
        }
    }

    /// Sum of Euclidean distances between consecutive vertices.
    #[must_use]
    pub fn polyline_length(&self) -> f64 {
        self.vertices.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
    }

    /// Bounding box of all vertices.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.vertices.iter())
    }

    /// Return a copy with every vertex mapped through an affine matrix.
    #[must_use]
    pub fn transformed(&self, matrix: &Matrix4<f64>) -> Self {
        Self {
            vertices: self
                .vertices
                .iter()
                .map(|v| transform_point(matrix, v))
                .collect(),
        }
    }
}

/// Which end of a streamline an index entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EndpointRole {
    /// The first vertex.
    Start,
    /// The last vertex.
    End,
}

impl EndpointRole {
    /// Both roles, start first.
    pub const BOTH: [Self; 2] = [Self::Start, Self::End];
}

/// Payload stored in an endpoint spatial index.
///
/// Every streamline contributes exactly two entries, one per role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EndpointEntry {
    /// Position of the streamline in its collection.
    pub streamline: usize,
    /// Which endpoint this entry stands for.
    pub role: EndpointRole,
}

impl EndpointEntry {
    /// Create an entry.
    #[inline]
    #[must_use]
    pub const fn new(streamline: usize, role: EndpointRole) -> Self {
        Self { streamline, role }
    }

    /// Iterate over the `(position, entry)` pairs of a streamline slice,
    /// start before end for each streamline.
    pub fn collect_from(
        streamlines: &[Streamline],
    ) -> impl Iterator<Item = (Point3<f64>, Self)> + '_ {
        streamlines.iter().enumerate().flat_map(|(index, line)| {
            EndpointRole::BOTH
                .into_iter()
                .map(move |role| (line.endpoint(role), Self::new(index, role)))
        })
    }
}

/// An ordered collection of streamlines plus the affine that maps its raw
/// coordinates into the shared rendering space.
///
/// Index identity is stable: streamline `i` here is streamline `i` in every
/// selection result computed against this collection.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Tractogram {
    streamlines: Vec<Streamline>,
    voxel_to_world: Matrix4<f64>,
}

impl Default for Tractogram {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Tractogram {
    /// Create a tractogram with an identity affine.
    #[must_use]
    pub fn new(streamlines: Vec<Streamline>) -> Self {
        Self {
            streamlines,
            voxel_to_world: Matrix4::identity(),
        }
    }

    /// Attach a voxel-to-world affine.
    #[must_use]
    pub fn with_transform(mut self, voxel_to_world: Matrix4<f64>) -> Self {
        self.voxel_to_world = voxel_to_world;
        self
    }

    /// Build a tractogram from raw vertex lists as delivered by a reader.
    ///
    /// Vertices within [`PADDING_VERTEX_NORM`] of the origin are reader
    /// padding and are dropped before validation.
    ///
    /// # Errors
    ///
    /// Returns [`TractError::InvalidStreamline`] naming the first line that
    /// is left with fewer than two vertices or has non-finite coordinates.
    pub fn from_raw_lines<I>(lines: I) -> TractResult<Self>
    where
        I: IntoIterator<Item = Vec<Point3<f64>>>,
    {
        let streamlines = lines
            .into_iter()
            .enumerate()
            .map(|(index, mut vertices)| {
                vertices.retain(|v| v.coords.norm() > PADDING_VERTEX_NORM);
                Streamline::new(vertices).map_err(|e| e.in_streamline(index))
            })
            .collect::<TractResult<Vec<_>>>()?;

        Ok(Self::new(streamlines))
    }

    /// The streamlines in order.
    #[inline]
    #[must_use]
    pub fn streamlines(&self) -> &[Streamline] {
        &self.streamlines
    }

    /// Consume the tractogram, returning its streamlines.
    #[must_use]
    pub fn into_streamlines(self) -> Vec<Streamline> {
        self.streamlines
    }

    /// The streamline at `index`, if any.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Streamline> {
        self.streamlines.get(index)
    }

    /// Number of streamlines.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.streamlines.len()
    }

    /// Whether the tractogram holds no streamlines.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.streamlines.is_empty()
    }

    /// The voxel-to-world affine.
    #[inline]
    #[must_use]
    pub fn voxel_to_world(&self) -> &Matrix4<f64> {
        &self.voxel_to_world
    }

    /// Check the affine for invertibility and shear.
    #[must_use]
    pub fn affine_report(&self) -> AffineReport {
        AffineReport::analyze(&self.voxel_to_world)
    }

    /// Return a new tractogram with the affine baked into the vertices.
    ///
    /// The result carries an identity affine. The original is untouched.
    #[must_use]
    pub fn to_world(&self) -> Self {
        Self {
            streamlines: self
                .streamlines
                .iter()
                .map(|s| s.transformed(&self.voxel_to_world))
                .collect(),
            voxel_to_world: Matrix4::identity(),
        }
    }

    /// Bounding box of every vertex of every streamline.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        let mut aabb = Aabb::empty();
        for line in &self.streamlines {
            aabb.merge(&line.bounds());
        }
        aabb
    }
}

impl AsRef<[Streamline]> for Tractogram {
    fn as_ref(&self) -> &[Streamline] {
        &self.streamlines
    }
}

impl FromIterator<Streamline> for Tractogram {
    fn from_iter<T: IntoIterator<Item = Streamline>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn line(points: &[[f64; 3]]) -> Streamline {
        Streamline::new(points.iter().map(|p| Point3::new(p[0], p[1], p[2])).collect()).unwrap()
    }

    #[test]
    fn rejects_short_streamlines() {
        assert!(matches!(
            Streamline::new(Vec::new()),
            Err(TractError::InsufficientVertices { actual: 0, .. })
        ));
        assert!(matches!(
            Streamline::new(vec![Point3::origin()]),
            Err(TractError::InsufficientVertices { actual: 1, .. })
        ));
    }

    #[test]
    fn rejects_non_finite_vertices() {
        let err = Streamline::new(vec![Point3::origin(), Point3::new(f64::NAN, 0.0, 0.0)]);
        assert_eq!(err, Err(TractError::NonFiniteVertex { vertex: 1 }));
    }

    #[test]
    fn from_flat_checks_triplets() {
        assert!(matches!(
            Streamline::from_flat(&[0.0, 1.0, 2.0, 3.0]),
            Err(TractError::MalformedBuffer { len: 4 })
        ));

        let line = Streamline::from_flat(&[0.0, 0.0, 0.0, 1.0, 2.0, 3.0]).unwrap();
        assert_eq!(line.start(), Point3::origin());
        assert_eq!(line.endpoint(EndpointRole::End), Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn polyline_length_sums_segments() {
        let l = line(&[[0.0, 0.0, 0.0], [3.0, 4.0, 0.0], [3.0, 4.0, 2.0]]);
        assert_relative_eq!(l.polyline_length(), 7.0, epsilon = 1e-12);
    }

    #[test]
    fn endpoint_entries_come_in_pairs() {
        let lines = vec![
            line(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]),
            line(&[[5.0, 5.0, 5.0], [6.0, 6.0, 6.0], [7.0, 7.0, 7.0]]),
        ];

        let entries: Vec<_> = EndpointEntry::collect_from(&lines).collect();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].1, EndpointEntry::new(0, EndpointRole::Start));
        assert_eq!(entries[1].1, EndpointEntry::new(0, EndpointRole::End));
        assert_eq!(entries[3].0, Point3::new(7.0, 7.0, 7.0));
    }

    #[test]
    fn raw_lines_drop_padding_vertices() {
        let raw = vec![
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
            ],
            vec![Point3::new(4.0, 4.0, 4.0), Point3::new(5.0, 5.0, 5.0)],
        ];

        let tractogram = Tractogram::from_raw_lines(raw).unwrap();
        assert_eq!(tractogram.len(), 2);
        assert_eq!(tractogram.streamlines()[0].len(), 2);
        assert_eq!(tractogram.streamlines()[0].start(), Point3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn raw_lines_report_failing_index() {
        let raw = vec![
            vec![Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0)],
            vec![Point3::origin(), Point3::new(3.0, 0.0, 0.0)],
        ];

        let err = Tractogram::from_raw_lines(raw).unwrap_err();
        assert!(matches!(err, TractError::InvalidStreamline { index: 1, .. }));
        assert_eq!(err.streamline_index(), Some(1));
    }

    #[test]
    fn to_world_bakes_affine_without_mutating_source() {
        let tractogram = Tractogram::new(vec![line(&[[1.0, 0.0, 0.0], [2.0, 0.0, 0.0]])])
            .with_transform(Matrix4::new_translation(&Vector3::new(10.0, 0.0, 0.0)));

        let world = tractogram.to_world();
        assert_eq!(world.streamlines()[0].start(), Point3::new(11.0, 0.0, 0.0));
        assert_eq!(*world.voxel_to_world(), Matrix4::identity());
        assert_eq!(tractogram.streamlines()[0].start(), Point3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn tractogram_bounds_cover_all_vertices() {
        let tractogram: Tractogram = vec![
            line(&[[0.0, 0.0, 0.0], [1.0, 2.0, 3.0]]),
            line(&[[-1.0, 5.0, 0.5], [0.0, 0.0, 0.0]]),
        ]
        .into_iter()
        .collect();

        let bounds = tractogram.bounds();
        assert_eq!(bounds.min, Point3::new(-1.0, 0.0, 0.0));
        assert_eq!(bounds.max, Point3::new(1.0, 5.0, 3.0));
    }
}
