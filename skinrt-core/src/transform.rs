//! Rigid bind transforms

use nalgebra::{Isometry3, Matrix3, Matrix4, Point3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// A rotation, translation and uniform scale, as stored on scene nodes and
/// in skin bind data.
///
/// Applied to a point as `scale * rotation * p + translation`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidTransform {
    #[serde(with = "rows")]
    pub rotation: Matrix3<f32>,
    pub translation: Vector3<f32>,
    pub scale: f32,
}

impl RigidTransform {
    /// Create an identity transformation
    pub fn identity() -> Self {
        Self {
            rotation: Matrix3::identity(),
            translation: Vector3::zeros(),
            scale: 1.0,
        }
    }

    pub fn new(rotation: Matrix3<f32>, translation: Vector3<f32>, scale: f32) -> Self {
        Self {
            rotation,
            translation,
            scale,
        }
    }

    /// Create a translation transformation
    pub fn from_translation(translation: Vector3<f32>) -> Self {
        Self {
            translation,
            ..Self::identity()
        }
    }

    /// Create a rotation transformation from a quaternion
    pub fn from_rotation(rotation: UnitQuaternion<f32>) -> Self {
        Self {
            rotation: rotation.to_rotation_matrix().into_inner(),
            ..Self::identity()
        }
    }

    /// Create a transformation from translation and rotation
    pub fn from_translation_rotation(
        translation: Vector3<f32>,
        rotation: UnitQuaternion<f32>,
    ) -> Self {
        Self::from(Isometry3::from_parts(translation.into(), rotation))
    }

    /// Apply the transformation to a point
    pub fn transform_point(&self, point: &Point3<f32>) -> Point3<f32> {
        Point3::from(self.rotation * point.coords * self.scale + self.translation)
    }

    /// Apply the transformation to a vector (translation is ignored)
    pub fn transform_vector(&self, vector: &Vector3<f32>) -> Vector3<f32> {
        self.rotation * vector * self.scale
    }

    /// Compose with a child transform: the result maps child space straight
    /// into this transform's parent space.
    pub fn compose(&self, child: &Self) -> Self {
        Self {
            rotation: self.rotation * child.rotation,
            translation: self.rotation * child.translation * self.scale + self.translation,
            scale: self.scale * child.scale,
        }
    }

    /// Get the inverse transformation.
    ///
    /// The rotation is assumed orthonormal, so its inverse is its transpose.
    /// Returns `None` for a zero scale.
    pub fn inverse(&self) -> Option<Self> {
        if self.scale == 0.0 {
            return None;
        }
        let rotation = self.rotation.transpose();
        let scale = 1.0 / self.scale;
        Some(Self {
            rotation,
            translation: -(rotation * self.translation) * scale,
            scale,
        })
    }

    /// Homogeneous 4x4 matrix of this transform
    pub fn to_homogeneous(&self) -> Matrix4<f32> {
        let mut matrix = (self.rotation * self.scale).to_homogeneous();
        matrix.fixed_view_mut::<3, 1>(0, 3).copy_from(&self.translation);
        matrix
    }

    /// Check if this is approximately the identity transformation
    pub fn is_identity(&self, epsilon: f32) -> bool {
        (self.rotation - Matrix3::identity()).amax() < epsilon
            && self.translation.amax() < epsilon
            && (self.scale - 1.0).abs() < epsilon
    }
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::ops::Mul for RigidTransform {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        self.compose(&rhs)
    }
}

impl From<Isometry3<f32>> for RigidTransform {
    fn from(isometry: Isometry3<f32>) -> Self {
        Self {
            rotation: isometry.rotation.to_rotation_matrix().into_inner(),
            translation: isometry.translation.vector,
            scale: 1.0,
        }
    }
}

/// Rotation matrices are stored row by row, the way the asset format lays
/// them out, rather than in nalgebra's column-major order.
mod rows {
    use nalgebra::Matrix3;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(
        matrix: &Matrix3<f32>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let rows: [[f32; 3]; 3] =
            std::array::from_fn(|r| std::array::from_fn(|c| matrix[(r, c)]));
        rows.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Matrix3<f32>, D::Error> {
        let rows = <[[f32; 3]; 3]>::deserialize(deserializer)?;
        Ok(Matrix3::from_fn(|r, c| rows[r][c]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample() -> RigidTransform {
        RigidTransform {
            rotation: UnitQuaternion::from_euler_angles(0.3, -0.2, 1.1)
                .to_rotation_matrix()
                .into_inner(),
            translation: Vector3::new(1.0, -2.0, 0.5),
            scale: 1.5,
        }
    }

    #[test]
    fn test_compose_matches_homogeneous_product() {
        let parent = sample();
        let child = RigidTransform::from_translation_rotation(
            Vector3::new(0.0, 3.0, 0.0),
            UnitQuaternion::from_euler_angles(0.0, 0.4, 0.0),
        );
        let composed = parent.compose(&child).to_homogeneous();
        let expected = parent.to_homogeneous() * child.to_homogeneous();
        assert_relative_eq!(composed, expected, epsilon = 1e-5);
    }

    #[test]
    fn test_inverse_round_trip() {
        let t = sample();
        let inv = t.inverse().unwrap();
        assert!(t.compose(&inv).is_identity(1e-5));
        assert!(inv.compose(&t).is_identity(1e-5));

        let p = Point3::new(0.25, 4.0, -1.0);
        assert_relative_eq!(inv.transform_point(&t.transform_point(&p)), p, epsilon = 1e-5);
    }

    #[test]
    fn test_zero_scale_has_no_inverse() {
        let t = RigidTransform {
            scale: 0.0,
            ..RigidTransform::identity()
        };
        assert!(t.inverse().is_none());
    }

    #[test]
    fn test_rotation_serializes_row_major() {
        let mut t = RigidTransform::identity();
        t.rotation[(0, 1)] = 7.0;
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["rotation"][0][1], 7.0);
        assert_eq!(json["rotation"][1][0], 0.0);

        let back: RigidTransform = serde_json::from_value(json).unwrap();
        assert_eq!(back, t);
    }
}
