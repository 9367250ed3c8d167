use nalgebra::{Matrix3, Rotation3, UnitQuaternion, Vector3};
use sophus::lie::Isometry3F64;

use crate::RealScalar;

/// Rigid-body change between two consecutive camera frames.
///
/// `rotation` and `translation` describe the camera frame at t+1 as seen from
/// the frame at t. A point known in the frame at t is expressed in the frame
/// at t+1 with `rotation⁻¹ · (point - translation)`.
#[derive(Clone, Debug, PartialEq)]
pub struct RigidMotion<T: RealScalar> {
    pub rotation: UnitQuaternion<T>,
    pub translation: Vector3<T>,
}

impl<T: RealScalar> RigidMotion<T> {
    pub fn new(rotation: UnitQuaternion<T>, translation: Vector3<T>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    pub fn identity() -> Self {
        Self::new(UnitQuaternion::identity(), Vector3::zeros())
    }

    pub fn from_rotation_matrix(rotation: &Rotation3<T>, translation: Vector3<T>) -> Self {
        Self::new(UnitQuaternion::from_rotation_matrix(rotation), translation)
    }

    pub fn inverse_rotation_matrix(&self) -> Matrix3<T> {
        self.rotation.inverse().to_rotation_matrix().into_inner()
    }

    pub fn transform_to_previous_frame(&self, point: &Vector3<T>) -> Vector3<T> {
        inverse_transform(&self.inverse_rotation_matrix(), &self.translation, point)
    }

    /// Directions are only rotated.
    pub fn transform_direction(&self, direction: &Vector3<T>) -> Vector3<T> {
        self.rotation.inverse_transform_vector(direction)
    }
}

/// `inverse_rotation · (point - translation)`
pub fn inverse_transform<T: RealScalar>(
    inverse_rotation: &Matrix3<T>,
    translation: &Vector3<T>,
    point: &Vector3<T>,
) -> Vector3<T> {
    inverse_rotation * (point - translation)
}

impl From<&Isometry3F64> for RigidMotion<f64> {
    fn from(pose: &Isometry3F64) -> Self {
        let matrix = pose.matrix();
        let rotation =
            Rotation3::from_matrix_unchecked(matrix.fixed_view::<3, 3>(0, 0).into_owned());
        Self::from_rotation_matrix(&rotation, matrix.fixed_view::<3, 1>(0, 3).into_owned())
    }
}
