use lineslam_core::{RealScalar, Result, RigidMotion};
use nalgebra::{Matrix3, Matrix4, Vector3, Vector4};

use crate::line_state::LineState;

/// Central difference approximation of the prediction Jacobian around `x`.
///
/// Every perturbed state must stay predictable; a horizontal line within
/// `step` of `x` is reported as degenerate.
pub fn numerical_jacobian<T: RealScalar>(
    x: &Vector4<T>,
    motion: &RigidMotion<T>,
    step: T,
) -> Result<Matrix4<T>> {
    let inverse_rotation = motion.inverse_rotation_matrix();
    let mut jacobian = Matrix4::zeros();
    for i in 0..4 {
        let mut forward = *x;
        forward[i] += step;
        let mut backward = *x;
        backward[i] -= step;

        let difference = predicted_x(&forward, &inverse_rotation, &motion.translation)?
            - predicted_x(&backward, &inverse_rotation, &motion.translation)?;
        jacobian.set_column(i, &(difference / (step + step)));
    }
    Ok(jacobian)
}

fn predicted_x<T: RealScalar>(
    x: &Vector4<T>,
    inverse_rotation: &Matrix3<T>,
    translation: &Vector3<T>,
) -> Result<Vector4<T>> {
    let mut line = LineState::from_x(x, 0);
    line.predict_with_inverse_rotation(inverse_rotation, translation)?;
    Ok(line.x())
}
