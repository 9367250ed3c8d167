use lineslam_core::{
    inverse_transform, is_near_zero, to_f64, Degeneracy, RealScalar, Result, RigidMotion,
    StereoCamera, StereoObservation,
};
use nalgebra::{Matrix3, Vector2, Vector3, Vector4};

use crate::jacobian::Linearization;

/// A tracked 3D line in the current camera frame.
///
/// The line passes through `(position.x, 0, position.y)` and has direction
/// `(direction.x, 1, direction.y)`, i.e. it is parameterized by travel along
/// the vertical axis. Lines without a vertical component have no such form.
#[derive(Clone, Debug, PartialEq)]
pub struct LineState<T: RealScalar> {
    position: Vector2<T>,
    direction: Vector2<T>,
    id: usize,
}

impl<T: RealScalar> LineState<T> {
    pub fn new(position: Vector2<T>, direction: Vector2<T>, id: usize) -> Self {
        Self {
            position,
            direction,
            id,
        }
    }

    /// From the flat state `[position.x, position.y, direction.x, direction.y]`.
    pub fn from_x(x: &Vector4<T>, id: usize) -> Self {
        Self::new(Vector2::new(x[0], x[1]), Vector2::new(x[2], x[3]), id)
    }

    /// Line through two 3D points, e.g. the triangulated ends of a pole.
    pub fn from_points(a: &Vector3<T>, b: &Vector3<T>, id: usize) -> Result<Self> {
        let (position, direction) = canonical_form(a, &(b - a))?;
        Ok(Self::new(position, direction, id))
    }

    pub fn from_observations<C: StereoCamera<T>>(
        camera: &C,
        a: &StereoObservation<T>,
        b: &StereoObservation<T>,
        id: usize,
    ) -> Result<Self> {
        let a = camera.triangulate_observation(a)?;
        let b = camera.triangulate_observation(b)?;
        Self::from_points(&a, &b, id)
    }

    pub fn position(&self) -> &Vector2<T> {
        &self.position
    }

    pub fn direction(&self) -> &Vector2<T> {
        &self.direction
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn x(&self) -> Vector4<T> {
        Vector4::new(
            self.position.x,
            self.position.y,
            self.direction.x,
            self.direction.y,
        )
    }

    /// Point where the line crosses the `y = 0` plane.
    pub fn anchor(&self) -> Vector3<T> {
        Vector3::new(self.position.x, T::zero(), self.position.y)
    }

    pub fn direction3(&self) -> Vector3<T> {
        Vector3::new(self.direction.x, T::one(), self.direction.y)
    }

    pub fn point_at(&self, y: T) -> Vector3<T> {
        self.anchor() + self.direction3() * y
    }

    /// Carries the line into the next camera frame.
    ///
    /// Returns the transformed anchor and direction, which the Jacobian is
    /// evaluated at. A line that becomes horizontal leaves `self` untouched.
    pub fn predict(&mut self, motion: &RigidMotion<T>) -> Result<Linearization<T>> {
        self.predict_with_inverse_rotation(&motion.inverse_rotation_matrix(), &motion.translation)
    }

    pub fn predict_with_inverse_rotation(
        &mut self,
        inverse_rotation: &Matrix3<T>,
        translation: &Vector3<T>,
    ) -> Result<Linearization<T>> {
        let p = inverse_transform(inverse_rotation, translation, &self.anchor());
        let d = inverse_rotation * self.direction3();
        let (position, direction) = canonical_form(&p, &d)?;

        self.position = position;
        self.direction = direction;
        Ok(Linearization {
            inverse_rotation: *inverse_rotation,
            p,
            d,
        })
    }
}

/// Position and direction of the line through `p` along `d`, scaled to a unit
/// vertical step.
fn canonical_form<T: RealScalar>(
    p: &Vector3<T>,
    d: &Vector3<T>,
) -> Result<(Vector2<T>, Vector2<T>)> {
    ensure_not_horizontal(d)?;
    let s = -p.y / d.y;
    Ok((
        Vector2::new(p.x + s * d.x, p.z + s * d.z),
        Vector2::new(d.x / d.y, d.z / d.y),
    ))
}

/// Rejects directions whose vertical component vanishes relative to their
/// length, `|d.y| <= sqrt(eps)·|d|`.
///
/// This only catches near-exact singularity. A vertical component of `1e-6·|d|`
/// passes and rescales the line to coordinates around `1e6`, so callers that
/// need well-conditioned states must gate on `d.y` themselves.
pub(crate) fn ensure_not_horizontal<T: RealScalar>(d: &Vector3<T>) -> Result<()> {
    if is_near_zero(d.y, d.norm()) {
        log::debug!("horizontal line direction {:?}", d);
        return Err(Degeneracy::HorizontalLine {
            vertical_component: to_f64(d.y),
        }
        .into());
    }
    Ok(())
}
