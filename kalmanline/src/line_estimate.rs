use lineslam_core::{RealScalar, Result, RigidMotion};
use nalgebra::Matrix4;

use crate::line_state::LineState;

/// Line state with its uncertainty, the prediction half of the line filter.
#[derive(Clone, Debug, PartialEq)]
pub struct LineEstimate<T: RealScalar> {
    pub state: LineState<T>,
    pub covariance: Matrix4<T>,
}

impl<T: RealScalar> LineEstimate<T> {
    pub fn new(state: LineState<T>, covariance: Matrix4<T>) -> Self {
        Self { state, covariance }
    }

    /// Advances state and covariance, `P' = F·P·Fᵀ + Q`, with `F` taken at
    /// the state before prediction. Returns `F`.
    ///
    /// Nothing is modified when the prediction is degenerate.
    pub fn predict(
        &mut self,
        motion: &RigidMotion<T>,
        process_noise: &Matrix4<T>,
    ) -> Result<Matrix4<T>> {
        let mut state = self.state.clone();
        let f = state.predict(motion)?.jacobian()?;

        self.covariance = f * self.covariance * f.transpose() + process_noise;
        self.state = state;
        Ok(f)
    }
}
