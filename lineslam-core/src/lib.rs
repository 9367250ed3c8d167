mod camera;
pub use camera::*;
mod error;
pub use error::*;
mod motion;
pub use motion::*;

use nalgebra::RealField;

/// Floating point type the geometry is generic over (`f32` or `f64`).
pub trait RealScalar: RealField + Copy {}

impl<T: RealField + Copy> RealScalar for T {}

pub type Real = f64;

/// `true` when `value` vanishes relative to `scale`, i.e. `|value| <= sqrt(eps) * scale`.
pub fn is_near_zero<T: RealScalar>(value: T, scale: T) -> bool {
    value.abs() <= T::default_epsilon().sqrt() * scale
}

/// Widens a scalar to `f64` for error reporting.
pub fn to_f64<T: RealScalar>(value: T) -> f64 {
    nalgebra::try_convert::<T, f64>(value).unwrap_or(f64::NAN)
}
