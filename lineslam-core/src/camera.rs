use nalgebra::{Vector2, Vector3};

use crate::{RealScalar, Result, RigidMotion};

/// Pixel coordinates of one physical point seen by a rectified stereo pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StereoObservation<T: RealScalar> {
    pub left_x: T,
    pub right_x: T,
    pub left_y: T,
}

impl<T: RealScalar> StereoObservation<T> {
    pub fn new(left_x: T, right_x: T, left_y: T) -> Self {
        Self {
            left_x,
            right_x,
            left_y,
        }
    }
}

pub trait StereoCamera<T: RealScalar> {
    /// Horizontal and depth coordinates `(x, z)` in the left camera frame.
    fn triangulate_xz(&self, left_x: T, right_x: T) -> Result<Vector2<T>>;

    fn triangulate(&self, left_x: T, right_x: T, left_y: T) -> Result<Vector3<T>>;

    fn triangulate_observation(&self, observation: &StereoObservation<T>) -> Result<Vector3<T>> {
        self.triangulate(observation.left_x, observation.right_x, observation.left_y)
    }

    fn transform_to_previous_frame(
        &self,
        motion: &RigidMotion<T>,
        point: &Vector3<T>,
    ) -> Vector3<T> {
        motion.transform_to_previous_frame(point)
    }
}
