use lineslam_core::{RealScalar, Result};
use nalgebra::{Matrix3, Matrix4, Matrix4x3, Vector3};

use crate::line_state::ensure_not_horizontal;

/// Point a prediction was linearized at: the inverse rotation it used and the
/// transformed anchor `p` and direction `d` before rescaling.
#[derive(Clone, Debug, PartialEq)]
pub struct Linearization<T: RealScalar> {
    pub inverse_rotation: Matrix3<T>,
    pub p: Vector3<T>,
    pub d: Vector3<T>,
}

impl<T: RealScalar> Linearization<T> {
    /// Jacobian of the predicted state with respect to the state before prediction.
    pub fn jacobian(&self) -> Result<Matrix4<T>> {
        transition_jacobian(&self.inverse_rotation, &self.p, &self.d)
    }
}

/// `∂x_new / ∂x_old` of the line prediction.
///
/// `p` and `d` are the anchor and direction after the inverse rotation, as
/// returned in [`Linearization`].
pub fn transition_jacobian<T: RealScalar>(
    inverse_rotation: &Matrix3<T>,
    p: &Vector3<T>,
    d: &Vector3<T>,
) -> Result<Matrix4<T>> {
    ensure_not_horizontal(d)?;

    let zero = T::zero();
    let one = T::one();
    let inv_dy = one / d.y;
    let s = -p.y * inv_dy;
    let ds_ddy = p.y * inv_dy * inv_dy;

    // rows: position.x, position.y, direction.x, direction.y
    #[rustfmt::skip]
    let wrt_p = Matrix4x3::new(
        one, -d.x * inv_dy, zero,
        zero, -d.z * inv_dy, one,
        zero, zero, zero,
        zero, zero, zero,
    );
    #[rustfmt::skip]
    let wrt_d = Matrix4x3::new(
        s, d.x * ds_ddy, zero,
        zero, d.z * ds_ddy, s,
        inv_dy, -d.x * inv_dy * inv_dy, zero,
        zero, -d.z * inv_dy * inv_dy, inv_dy,
    );

    // the old anchor (x, z) and direction (x, z) enter p and d through the
    // first and third columns of the inverse rotation
    let x_axis = inverse_rotation.column(0);
    let z_axis = inverse_rotation.column(2);

    let mut f = Matrix4::zeros();
    f.set_column(0, &(wrt_p * x_axis));
    f.set_column(1, &(wrt_p * z_axis));
    f.set_column(2, &(wrt_d * x_axis));
    f.set_column(3, &(wrt_d * z_axis));
    Ok(f)
}
