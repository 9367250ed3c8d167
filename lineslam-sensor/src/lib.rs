pub mod config;
pub mod stereo_camera;

pub use config::StereoCameraCfg;
pub use stereo_camera::{CameraIntrinsics, StereoCameraModel};
