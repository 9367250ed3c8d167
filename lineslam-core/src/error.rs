use thiserror::Error;

pub type Result<T, E = GeometryError> = std::result::Result<T, E>;

/// Singular configurations detected while converting between observations,
/// points and lines.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum Degeneracy {
    /// The offset-corrected disparity denominator vanished.
    #[error("zero disparity (denominator {denominator})")]
    ZeroDisparity { denominator: f64 },

    #[error("triangulated point is not finite")]
    NonFiniteTriangulation,

    /// The point lies in the image plane of the left camera and has no projection.
    #[error("point has no depth (z = {depth})")]
    ZeroDepth { depth: f64 },

    /// The line direction has no vertical component, so it cannot be written
    /// with a unit vertical step.
    #[error("line is horizontal (vertical component {vertical_component})")]
    HorizontalLine { vertical_component: f64 },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(Degeneracy),

    #[error("invalid calibration: {parameter} = {value}")]
    InvalidCalibration { parameter: &'static str, value: f64 },
}

impl From<Degeneracy> for GeometryError {
    fn from(degeneracy: Degeneracy) -> Self {
        GeometryError::DegenerateGeometry(degeneracy)
    }
}

impl GeometryError {
    pub fn is_degenerate(&self) -> bool {
        matches!(self, GeometryError::DegenerateGeometry(_))
    }
}
