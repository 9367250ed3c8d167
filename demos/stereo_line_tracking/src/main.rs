use anyhow::{Context, Result};
use kalmanline::{line_estimate::LineEstimate, line_state::LineState};
use lineslam_core::{Real, RigidMotion, StereoCamera};
use lineslam_sensor::{StereoCameraCfg, StereoCameraModel};
use nalgebra::{Matrix4, UnitQuaternion, Vector3, Vector4};

const NUMBER_OF_FRAMES: usize = 20;

/// Top and bottom of a pole in the first camera frame.
struct Pole {
    top: Vector3<Real>,
    bottom: Vector3<Real>,
}

fn load_config() -> Result<StereoCameraCfg> {
    match std::env::args().nth(1) {
        Some(path) => {
            let file = std::fs::File::open(&path)
                .with_context(|| format!("failed to open calibration file {path}"))?;
            serde_json::from_reader(std::io::BufReader::new(file))
                .with_context(|| format!("failed to parse calibration file {path}"))
        }
        None => Ok(StereoCameraCfg::default()),
    }
}

fn observe(camera: &StereoCameraModel<Real>, pole: &Pole, id: usize) -> Result<LineState<Real>> {
    let top = camera.project(&pole.top)?;
    let bottom = camera.project(&pole.bottom)?;
    Ok(LineState::from_observations(camera, &top, &bottom, id)?)
}

fn main() -> Result<()> {
    env_logger::init();

    let camera: StereoCameraModel<Real> = load_config()?.finalize()?;
    log::debug!("camera: {:?}", camera);

    let mut poles = vec![
        Pole {
            top: Vector3::new(-3.0, -2.5, 18.0),
            bottom: Vector3::new(-3.0, 1.6, 18.0),
        },
        Pole {
            top: Vector3::new(2.5, -3.0, 25.0),
            bottom: Vector3::new(2.7, 1.6, 24.6),
        },
        Pole {
            top: Vector3::new(4.0, -1.0, 12.0),
            bottom: Vector3::new(3.2, 1.6, 12.5),
        },
    ];

    let initial_covariance = Matrix4::from_diagonal(&Vector4::new(0.05, 0.2, 0.01, 0.01));
    let process_noise = Matrix4::from_diagonal(&Vector4::new(1e-3, 4e-3, 1e-4, 1e-4));

    let mut tracks = Vec::new();
    for (id, pole) in poles.iter().enumerate() {
        let line = observe(&camera, pole, id)?;
        log::info!("track {id} initialized at {:?}", line.x().as_slice());
        tracks.push(LineEstimate::new(line, initial_covariance));
    }

    // drive forward while turning slightly left
    let motion = RigidMotion::new(
        UnitQuaternion::from_euler_angles(0.0, -0.01, 0.0),
        Vector3::new(0.0, 0.0, 0.5),
    );

    for frame in 1..NUMBER_OF_FRAMES {
        for pole in poles.iter_mut() {
            pole.top = camera.transform_to_previous_frame(&motion, &pole.top);
            pole.bottom = camera.transform_to_previous_frame(&motion, &pole.bottom);
        }

        tracks.retain_mut(|track| match track.predict(&motion, &process_noise) {
            Ok(_) => true,
            Err(err) => {
                log::warn!("dropping track {}: {err}", track.state.id());
                false
            }
        });

        for track in &tracks {
            let id = track.state.id();
            let pole = &poles[id];
            if pole.top.z <= 0.0 || pole.bottom.z <= 0.0 {
                log::info!("frame {frame}: pole {id} is behind the rig");
                continue;
            }
            let observed = observe(&camera, pole, id)?;
            let error = (track.state.x() - observed.x()).norm();
            log::info!(
                "frame {frame}: track {id} position {:?} error {error:.3e} covariance trace {:.4}",
                track.state.position().as_slice(),
                track.covariance.trace()
            );
        }
    }

    Ok(())
}
