use crate::angle::wrap_pi;
use nalgebra::{Matrix2, Matrix3, Vector2};
use serde::{Deserialize, Serialize};

/// Rigid 2D transform about a fixed centre.
///
/// Maps fixed-image coordinates `p` to moving-image coordinates
/// `p' = R(θ)(p − c) + c + t`. The centre is not optimised; only
/// `(θ, tx, ty)` are free parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RigidTransform {
    /// Rotation in radians, wrapped to `(−π, π]`.
    pub angle: f64,
    pub translation: Vector2<f64>,
    pub center: Vector2<f64>,
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::identity(Vector2::zeros())
    }
}

impl RigidTransform {
    pub fn identity(center: Vector2<f64>) -> Self {
        Self {
            angle: 0.0,
            translation: Vector2::zeros(),
            center,
        }
    }

    pub fn new(angle: f64, translation: Vector2<f64>, center: Vector2<f64>) -> Self {
        Self {
            angle: wrap_pi(angle),
            translation,
            center,
        }
    }

    pub fn rotation(&self) -> Matrix2<f64> {
        let (s, c) = self.angle.sin_cos();
        Matrix2::new(c, -s, s, c)
    }

    /// Homogeneous 3×3 matrix of the mapping.
    pub fn matrix(&self) -> Matrix3<f64> {
        let r = self.rotation();
        let offset = self.center + self.translation - r * self.center;
        Matrix3::new(
            r[(0, 0)],
            r[(0, 1)],
            offset.x,
            r[(1, 0)],
            r[(1, 1)],
            offset.y,
            0.0,
            0.0,
            1.0,
        )
    }

    #[inline]
    pub fn apply(&self, p: Vector2<f64>) -> Vector2<f64> {
        self.rotation() * (p - self.center) + self.center + self.translation
    }

    /// Inverse mapping, expressed about the image of the centre.
    pub fn inverse(&self) -> Self {
        Self {
            angle: wrap_pi(-self.angle),
            translation: -self.translation,
            center: self.center + self.translation,
        }
    }

    /// Free parameters `[θ, tx, ty]`.
    pub fn parameters(&self) -> [f64; 3] {
        [self.angle, self.translation.x, self.translation.y]
    }

    pub fn with_parameters(&self, params: &[f64]) -> Self {
        Self::new(
            params[0],
            Vector2::new(params[1], params[2]),
            self.center,
        )
    }

    /// Same transform expressed in coordinates scaled by `factor`, e.g. when
    /// moving between pyramid levels.
    pub fn rescaled(&self, factor: f64) -> Self {
        Self {
            angle: self.angle,
            translation: self.translation * factor,
            center: self.center * factor,
        }
    }
}
