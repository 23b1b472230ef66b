//! Fixed-dimension matrix helpers for the scene pass.
//!
//! The transforms used by the offscreen cube pass are built here so the
//! renderer itself only deals with ready-made matrices. Everything is
//! statically sized via `cgmath`, so a "wrong shaped matrix" cannot be
//! constructed; the one remaining runtime failure is a singular model-view
//! matrix handed to [`normal_matrix`], which is a caller bug and is
//! reported as an error instead of silently producing broken normals.

use anyhow::{Result, bail};
use cgmath::{Deg, Matrix, Matrix3, Matrix4, SquareMatrix, Vector3, perspective};

/// Rotation step applied once per tick, in degrees.
pub const DEGREES_PER_TICK: f32 = 1.0;

/// Advance the cube rotation by one tick, wrapped into `[0, 360)`.
pub fn advance_angle(angle: f32) -> f32 {
    (angle + DEGREES_PER_TICK).rem_euclid(360.0)
}

/// Perspective projection for the offscreen target (45° fov, near 0.1, far 100).
pub fn projection(width: u32, height: u32) -> Matrix4<f32> {
    let aspect = width.max(1) as f32 / height.max(1) as f32;
    perspective(Deg(45.0), aspect, 0.1, 100.0)
}

/// Model-view for the cube: pushed back 6 units, spun around Y by `angle` degrees.
pub fn model_view(angle: f32) -> Matrix4<f32> {
    Matrix4::from_translation(Vector3::new(0.0, 0.0, -6.0)) * Matrix4::from_angle_y(Deg(angle))
}

/// Upper-left 3x3 of the inverse-transpose of `model_view`.
///
/// Keeps normals correct under any future non-uniform scaling. Fails on a
/// singular input since that always indicates a caller bug, not a runtime
/// condition.
pub fn normal_matrix(model_view: &Matrix4<f32>) -> Result<Matrix3<f32>> {
    let Some(inverse) = model_view.invert() else {
        bail!("normal matrix requested for a singular model-view transform");
    };
    let it = inverse.transpose();
    Ok(Matrix3::from_cols(
        it.x.truncate(),
        it.y.truncate(),
        it.z.truncate(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Zero;

    const EPS: f32 = 1e-5;

    fn assert_mat3_eq(a: Matrix3<f32>, b: Matrix3<f32>) {
        for col in 0..3 {
            for row in 0..3 {
                assert!(
                    (a[col][row] - b[col][row]).abs() < EPS,
                    "mismatch at [{col}][{row}]: {:?} vs {:?}",
                    a,
                    b
                );
            }
        }
    }

    #[test]
    fn angle_advances_by_one_degree() {
        assert!((advance_angle(41.5) - 42.5).abs() < EPS);
    }

    #[test]
    fn angle_wraps_back_to_zero_after_full_turn() {
        let mut angle = 0.0;
        for _ in 0..360 {
            angle = advance_angle(angle);
        }
        assert!(angle.abs() < 1e-3, "got {angle}");
        angle = advance_angle(angle);
        assert!((angle - 1.0).abs() < 1e-3, "got {angle}");
    }

    #[test]
    fn angle_stays_in_range() {
        let mut angle = 359.25;
        for _ in 0..1000 {
            angle = advance_angle(angle);
            assert!((0.0..360.0).contains(&angle), "left range: {angle}");
        }
    }

    #[test]
    fn normal_matrix_of_rigid_transform_is_its_rotation() {
        // Rotation + translation has an inverse-transpose whose upper-left
        // 3x3 equals the rotation itself.
        let mv = model_view(33.0);
        let n = normal_matrix(&mv).unwrap();
        let rot: Matrix3<f32> = Matrix3::from_angle_y(Deg(33.0));
        assert_mat3_eq(n, rot);
    }

    #[test]
    fn normal_matrix_rejects_singular_input() {
        let singular = Matrix4::from_cols(
            cgmath::Vector4::zero(),
            cgmath::Vector4::zero(),
            cgmath::Vector4::zero(),
            cgmath::Vector4::zero(),
        );
        assert!(normal_matrix(&singular).is_err());
    }

    #[test]
    fn projection_handles_degenerate_sizes() {
        // A zero-sized surface must not divide by zero.
        let m = projection(0, 0);
        assert!(m.x.x.is_finite());
    }
}
