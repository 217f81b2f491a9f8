//! Affine sanity checks for tractogram transforms.

use nalgebra::{Matrix3, Matrix4, Point3, Vector3, Vector4};
use tracing::{debug, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Largest element-wise difference accepted when recomposing an affine
/// from its translation, rotation and scale.
pub const DEFAULT_AFFINE_TOLERANCE: f64 = 0.015;

/// Map a point through a 4x4 affine.
///
/// A non-unit homogeneous `w` is divided out; `w == 0` leaves the
/// coordinates as they are.
#[must_use]
pub fn transform_point(matrix: &Matrix4<f64>, point: &Point3<f64>) -> Point3<f64> {
    let p = matrix * Vector4::new(point.x, point.y, point.z, 1.0);
    if p.w == 0.0 || p.w == 1.0 {
        Point3::new(p.x, p.y, p.z)
    } else {
        Point3::new(p.x / p.w, p.y / p.w, p.z / p.w)
    }
}

/// Result of checking a voxel-to-world affine.
///
/// Rendering pipelines that apply translation, rotation and scale as
/// separate components silently drop any shear. This report tells the
/// caller whether that loss stays within tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AffineReport {
    /// Inverse of the affine, if it exists.
    pub inverse: Option<Matrix4<f64>>,
    /// Largest element of `|M * M^-1 - I|`, or infinity when singular.
    pub inverse_residual: f64,
    /// Per-axis scale (column norms of the linear part).
    pub scale: Vector3<f64>,
    /// Translation column.
    pub translation: Vector3<f64>,
    /// Largest element-wise difference between the affine and its
    /// translation * rotation * scale recomposition.
    pub decomposition_residual: f64,
    /// Tolerance the residuals were compared against.
    pub tolerance: f64,
}

impl AffineReport {
    /// Analyze an affine with [`DEFAULT_AFFINE_TOLERANCE`].
    #[must_use]
    pub fn analyze(matrix: &Matrix4<f64>) -> Self {
        Self::analyze_with_tolerance(matrix, DEFAULT_AFFINE_TOLERANCE)
    }

    /// Analyze an affine against a custom tolerance.
    #[must_use]
    pub fn analyze_with_tolerance(matrix: &Matrix4<f64>, tolerance: f64) -> Self {
        let inverse = matrix.try_inverse();
        let inverse_residual = inverse.map_or(f64::INFINITY, |inv| {
            (matrix * inv - Matrix4::identity()).abs().max()
        });

        let linear: Matrix3<f64> = matrix.fixed_view::<3, 3>(0, 0).into_owned();
        let translation = Vector3::new(matrix[(0, 3)], matrix[(1, 3)], matrix[(2, 3)]);
        let scale = Vector3::new(
            linear.column(0).norm(),
            linear.column(1).norm(),
            linear.column(2).norm(),
        );

        let decomposition_residual = recomposition_residual(matrix, &linear, &scale);

        let report = Self {
            inverse,
            inverse_residual,
            scale,
            translation,
            decomposition_residual,
            tolerance,
        };

        if !report.is_invertible() {
            warn!(
                inverse_residual,
                tolerance, "tractogram affine is not invertible within tolerance"
            );
        } else if !report.is_shear_free() {
            warn!(
                decomposition_residual,
                tolerance, "tractogram affine has a shear component that cannot be neglected"
            );
        } else {
            debug!(?scale, ?translation, "tractogram affine decomposes cleanly");
        }

        report
    }

    /// Whether the inverse exists and reproduces the identity within tolerance.
    #[must_use]
    pub fn is_invertible(&self) -> bool {
        self.inverse.is_some() && self.inverse_residual <= self.tolerance
    }

    /// Whether dropping shear changes the affine by at most the tolerance.
    #[must_use]
    pub fn is_shear_free(&self) -> bool {
        self.decomposition_residual <= self.tolerance
    }
}

/// Recompose `T * R * S` with `R` the nearest orthogonal matrix to the
/// column-normalized linear part and report the largest deviation.
fn recomposition_residual(
    matrix: &Matrix4<f64>,
    linear: &Matrix3<f64>,
    scale: &Vector3<f64>,
) -> f64 {
    if scale.iter().any(|s| *s <= f64::EPSILON) {
        return f64::INFINITY;
    }

    let normalized = Matrix3::from_columns(&[
        linear.column(0) / scale.x,
        linear.column(1) / scale.y,
        linear.column(2) / scale.z,
    ]);

    let svd = normalized.svd(true, true);
    let (Some(u), Some(v_t)) = (svd.u, svd.v_t) else {
        return f64::INFINITY;
    };
    let rotation = u * v_t;

    let mut recomposed = Matrix4::identity();
    recomposed
        .fixed_view_mut::<3, 3>(0, 0)
        .copy_from(&(rotation * Matrix3::from_diagonal(scale)));
    recomposed[(0, 3)] = matrix[(0, 3)];
    recomposed[(1, 3)] = matrix[(1, 3)];
    recomposed[(2, 3)] = matrix[(2, 3)];

    (matrix - recomposed).abs().max()
}
