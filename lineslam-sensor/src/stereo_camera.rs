use lineslam_core::{
    is_near_zero, to_f64, Degeneracy, GeometryError, RealScalar, Result, StereoCamera,
    StereoObservation,
};
use nalgebra::{Vector2, Vector3};
use sophus::sensor::camera_enum::perspective_camera::PinholeCameraF64;

/// Focal lengths and principal point of one camera of the rig, in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraIntrinsics<T: RealScalar> {
    pub fx: T,
    pub cx: T,
    pub fy: T,
    pub cy: T,
}

impl<T: RealScalar> CameraIntrinsics<T> {
    pub fn new(fx: T, cx: T, fy: T, cy: T) -> Self {
        Self { fx, cx, fy, cy }
    }

    fn validate(&self, names: [&'static str; 4]) -> Result<()> {
        check_focal_length(names[0], self.fx)?;
        check_finite(names[1], self.cx)?;
        check_focal_length(names[2], self.fy)?;
        check_finite(names[3], self.cy)
    }
}

const LEFT_NAMES: [&str; 4] = ["left.fx", "left.cx", "left.fy", "left.cy"];
const RIGHT_NAMES: [&str; 4] = ["right.fx", "right.cx", "right.fy", "right.cy"];

fn check_finite<T: RealScalar>(parameter: &'static str, value: T) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(GeometryError::InvalidCalibration {
            parameter,
            value: to_f64(value),
        })
    }
}

fn check_focal_length<T: RealScalar>(parameter: &'static str, value: T) -> Result<()> {
    check_finite(parameter, value)?;
    if value == T::zero() {
        return Err(GeometryError::InvalidCalibration {
            parameter,
            value: to_f64(value),
        });
    }
    Ok(())
}

/// Rectified stereo pair. The right camera sits at `+baseline` along the
/// horizontal axis of the left camera, whose frame all points are given in.
#[derive(Clone, Debug, PartialEq)]
pub struct StereoCameraModel<T: RealScalar> {
    baseline: T,
    left: CameraIntrinsics<T>,
    right: CameraIntrinsics<T>,
}

impl<T: RealScalar> StereoCameraModel<T> {
    pub fn new(baseline: T, left: CameraIntrinsics<T>, right: CameraIntrinsics<T>) -> Result<Self> {
        validate(baseline, &left, &right)?;
        Ok(Self {
            baseline,
            left,
            right,
        })
    }

    /// Replaces the calibration. On error the previous calibration is kept.
    pub fn set_params(
        &mut self,
        baseline: T,
        left: CameraIntrinsics<T>,
        right: CameraIntrinsics<T>,
    ) -> Result<()> {
        validate(baseline, &left, &right)?;
        self.baseline = baseline;
        self.left = left;
        self.right = right;
        Ok(())
    }

    pub fn baseline(&self) -> T {
        self.baseline
    }

    pub fn left(&self) -> &CameraIntrinsics<T> {
        &self.left
    }

    pub fn right(&self) -> &CameraIntrinsics<T> {
        &self.right
    }

    pub fn left_center_y(&self) -> T {
        self.left.cy
    }

    pub fn right_center_y(&self) -> T {
        self.right.cy
    }

    /// Pixel coordinates of `point` (left camera frame) in both images.
    pub fn project(&self, point: &Vector3<T>) -> Result<StereoObservation<T>> {
        if is_near_zero(point.z, point.norm()) {
            return Err(Degeneracy::ZeroDepth {
                depth: to_f64(point.z),
            }
            .into());
        }
        Ok(StereoObservation::new(
            self.left.fx * point.x / point.z + self.left.cx,
            self.right.fx * (point.x - self.baseline) / point.z + self.right.cx,
            self.left.fy * point.y / point.z + self.left.cy,
        ))
    }

    fn horizontal_and_depth(&self, left_x: T, right_x: T) -> Result<(T, T)> {
        let lx = left_x - self.left.cx;
        let rx = right_x - self.right.cx;
        let left_term = lx * self.right.fx;
        let right_term = rx * self.left.fx;
        let denominator = left_term - right_term;
        if is_near_zero(denominator, left_term.abs() + right_term.abs()) {
            log::debug!(
                "zero disparity: left {}, right {}",
                to_f64(left_x),
                to_f64(right_x)
            );
            return Err(Degeneracy::ZeroDisparity {
                denominator: to_f64(denominator),
            }
            .into());
        }

        let x = self.baseline * left_term / denominator;
        // same as x * lfx / lx, but defined on the optical axis
        let z = self.baseline * self.left.fx * self.right.fx / denominator;
        if !x.is_finite() || !z.is_finite() {
            return Err(Degeneracy::NonFiniteTriangulation.into());
        }
        Ok((x, z))
    }
}

impl StereoCameraModel<f64> {
    /// Builds the rig from two rectified pinhole models and the baseline in meters.
    pub fn from_pinhole_pair(
        left: &PinholeCameraF64,
        right: &PinholeCameraF64,
        baseline: f64,
    ) -> Result<Self> {
        let intrinsics = |camera: &PinholeCameraF64| {
            let params = camera.params();
            CameraIntrinsics::new(params[0], params[2], params[1], params[3])
        };
        Self::new(baseline, intrinsics(left), intrinsics(right))
    }
}

fn validate<T: RealScalar>(
    baseline: T,
    left: &CameraIntrinsics<T>,
    right: &CameraIntrinsics<T>,
) -> Result<()> {
    check_focal_length("baseline", baseline)?;
    left.validate(LEFT_NAMES)?;
    right.validate(RIGHT_NAMES)
}

impl<T: RealScalar> StereoCamera<T> for StereoCameraModel<T> {
    fn triangulate_xz(&self, left_x: T, right_x: T) -> Result<Vector2<T>> {
        let (x, z) = self.horizontal_and_depth(left_x, right_x)?;
        Ok(Vector2::new(x, z))
    }

    fn triangulate(&self, left_x: T, right_x: T, left_y: T) -> Result<Vector3<T>> {
        let (x, z) = self.horizontal_and_depth(left_x, right_x)?;
        let y = (left_y - self.left.cy) / self.left.fy * z;
        if !y.is_finite() {
            log::debug!("non-finite height from left y {}", to_f64(left_y));
            return Err(Degeneracy::NonFiniteTriangulation.into());
        }
        Ok(Vector3::new(x, y, z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use lineslam_core::RigidMotion;
    use nalgebra::UnitQuaternion;
    use sophus::{core::linalg::VecF64, image::ImageSize};

    fn kitti_like() -> StereoCameraModel<f64> {
        StereoCameraModel::new(
            0.54,
            CameraIntrinsics::new(718.856, 607.1928, 718.856, 185.2157),
            CameraIntrinsics::new(718.856, 607.1928, 718.856, 185.2157),
        )
        .unwrap()
    }

    fn asymmetric() -> StereoCameraModel<f64> {
        StereoCameraModel::new(
            0.12,
            CameraIntrinsics::new(450.0, 320.5, 452.0, 240.25),
            CameraIntrinsics::new(460.0, 318.0, 461.0, 238.0),
        )
        .unwrap()
    }

    #[test]
    fn test_triangulation_round_trip() {
        for camera in [kitti_like(), asymmetric()] {
            for point in [
                Vector3::new(1.5, -0.7, 12.0),
                Vector3::new(-3.0, 1.2, 4.5),
                Vector3::new(0.0, 0.0, 30.0),
                Vector3::new(0.25, 2.0, 0.8),
            ] {
                let observation = camera.project(&point).unwrap();
                let triangulated = camera.triangulate_observation(&observation).unwrap();
                assert_relative_eq!(triangulated, point, epsilon = 1e-9, max_relative = 1e-9);

                let xz = camera
                    .triangulate_xz(observation.left_x, observation.right_x)
                    .unwrap();
                assert_relative_eq!(
                    xz,
                    Vector2::new(point.x, point.z),
                    epsilon = 1e-9,
                    max_relative = 1e-9
                );
            }
        }
    }

    #[test]
    fn test_triangulation_formula() {
        let camera = asymmetric();
        let (left_x, right_x, left_y) = (400.0, 380.0, 260.0);
        let lx: f64 = left_x - 320.5;
        let rx: f64 = right_x - 318.0;
        let x = 0.12 * lx * 460.0 / (lx * 460.0 - rx * 450.0);
        let z = x * 450.0 / lx;
        let y = (left_y - 240.25) / 452.0 * z;

        let point = camera.triangulate(left_x, right_x, left_y).unwrap();
        assert_relative_eq!(point, Vector3::new(x, y, z), max_relative = 1e-12);
    }

    #[test]
    fn test_zero_disparity_is_degenerate() {
        let camera = kitti_like();
        let err = camera.triangulate_xz(700.0, 700.0).unwrap_err();
        assert!(matches!(
            err,
            GeometryError::DegenerateGeometry(Degeneracy::ZeroDisparity { .. })
        ));

        // both pixels on the principal point
        let err = camera.triangulate(607.1928, 607.1928, 100.0).unwrap_err();
        assert!(err.is_degenerate());
    }

    #[test]
    fn test_non_finite_height_is_degenerate() {
        let camera = kitti_like();
        for left_y in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert_eq!(
                camera.triangulate(700.0, 650.0, left_y).unwrap_err(),
                GeometryError::DegenerateGeometry(Degeneracy::NonFiniteTriangulation)
            );
        }
        let observation = StereoObservation::new(700.0, 650.0, f64::NAN);
        assert!(camera.triangulate_observation(&observation).is_err());

        // the horizontal pair alone is still well defined
        assert!(camera.triangulate_xz(700.0, 650.0).is_ok());
    }

    #[test]
    fn test_project_without_depth() {
        let camera = kitti_like();
        let err = camera.project(&Vector3::new(1.0, 1.0, 0.0)).unwrap_err();
        assert!(matches!(
            err,
            GeometryError::DegenerateGeometry(Degeneracy::ZeroDepth { .. })
        ));
    }

    #[test]
    fn test_invalid_calibration() {
        let good = CameraIntrinsics::new(500.0, 320.0, 500.0, 240.0);
        let zero_fx = CameraIntrinsics::new(0.0, 320.0, 500.0, 240.0);
        let nan_fy = CameraIntrinsics::new(500.0, 320.0, f64::NAN, 240.0);
        let inf_cx = CameraIntrinsics::new(500.0, f64::INFINITY, 500.0, 240.0);

        assert_eq!(
            StereoCameraModel::new(0.1, zero_fx, good).unwrap_err(),
            GeometryError::InvalidCalibration {
                parameter: "left.fx",
                value: 0.0
            }
        );
        assert!(matches!(
            StereoCameraModel::new(0.1, good, nan_fy),
            Err(GeometryError::InvalidCalibration {
                parameter: "right.fy",
                ..
            })
        ));
        assert!(matches!(
            StereoCameraModel::new(0.1, inf_cx, good),
            Err(GeometryError::InvalidCalibration {
                parameter: "left.cx",
                ..
            })
        ));
        assert!(matches!(
            StereoCameraModel::new(0.0, good, good),
            Err(GeometryError::InvalidCalibration {
                parameter: "baseline",
                ..
            })
        ));
    }

    #[test]
    fn test_set_params_keeps_old_calibration_on_error() {
        let mut camera = kitti_like();
        let before = camera.clone();
        let bad = CameraIntrinsics::new(0.0, 1.0, 1.0, 1.0);
        assert!(camera.set_params(0.3, bad, bad).is_err());
        assert_eq!(camera, before);

        let left = CameraIntrinsics::new(400.0, 300.0, 410.0, 200.0);
        let right = CameraIntrinsics::new(405.0, 310.0, 415.0, 205.0);
        camera.set_params(0.3, left, right).unwrap();
        assert_eq!(camera.baseline(), 0.3);
        assert_eq!(camera.left_center_y(), 200.0);
        assert_eq!(camera.right_center_y(), 205.0);
        assert_eq!(camera.left(), &left);
        assert_eq!(camera.right(), &right);
    }

    #[test]
    fn test_single_precision() {
        let camera = StereoCameraModel::<f32>::new(
            0.54,
            CameraIntrinsics::new(718.856, 607.1928, 718.856, 185.2157),
            CameraIntrinsics::new(718.856, 607.1928, 718.856, 185.2157),
        )
        .unwrap();
        let point = Vector3::new(2.0f32, -1.0, 15.0);
        let observation = camera.project(&point).unwrap();
        let triangulated = camera.triangulate_observation(&observation).unwrap();
        assert_relative_eq!(triangulated, point, max_relative = 1e-3);
    }

    #[test]
    fn test_transform_to_previous_frame() {
        let camera = kitti_like();
        let rotation = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), std::f64::consts::PI);
        let motion = RigidMotion::new(rotation, Vector3::new(0.0, 0.0, 2.0));
        let point = camera.transform_to_previous_frame(&motion, &Vector3::new(1.0, 2.0, 5.0));
        assert_relative_eq!(point, Vector3::new(-1.0, -2.0, 3.0), epsilon = 1e-12);
    }

    #[test]
    fn test_from_pinhole_pair() {
        let left = PinholeCameraF64::from_params_and_size(
            &VecF64::<4>::new(718.856, 718.856, 607.1928, 185.2157),
            ImageSize::new(1241, 376),
        );
        let right = left.clone();
        let camera = StereoCameraModel::from_pinhole_pair(&left, &right, 0.54).unwrap();
        assert_eq!(camera, kitti_like());
    }
}
