use lineslam_core::{Real, RealScalar, Result};
use serde::Deserialize;

use crate::stereo_camera::{CameraIntrinsics, StereoCameraModel};

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct IntrinsicsCfg {
    pub fx: Real,
    pub cx: Real,
    pub fy: Real,
    pub cy: Real,
}

impl IntrinsicsCfg {
    fn finalize<T: RealScalar>(self) -> CameraIntrinsics<T> {
        CameraIntrinsics::new(
            nalgebra::convert(self.fx),
            nalgebra::convert(self.cx),
            nalgebra::convert(self.fy),
            nalgebra::convert(self.cy),
        )
    }
}

/// Calibration of a rectified stereo rig, as read from configuration.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct StereoCameraCfg {
    // meters
    pub baseline: Real,
    pub left: IntrinsicsCfg,
    pub right: IntrinsicsCfg,
}

impl Default for StereoCameraCfg {
    fn default() -> Self {
        // KITTI odometry, sequences 00-02
        let intrinsics = IntrinsicsCfg {
            fx: 718.856,
            cx: 607.1928,
            fy: 718.856,
            cy: 185.2157,
        };
        Self {
            baseline: 0.5372,
            left: intrinsics,
            right: intrinsics,
        }
    }
}

impl StereoCameraCfg {
    pub fn finalize<T: RealScalar>(self) -> Result<StereoCameraModel<T>> {
        let model = StereoCameraModel::new(
            nalgebra::convert(self.baseline),
            self.left.finalize(),
            self.right.finalize(),
        )?;
        log::debug!(
            "stereo camera configured: baseline {} m, left {:?}, right {:?}",
            self.baseline,
            self.left,
            self.right
        );
        Ok(model)
    }
}
