//! Test-suite bookkeeping: camera id parsing and not-yet-mandated tests.

use tracing::debug;

/// Separates a logical camera id from a hidden physical sub-camera id.
pub const SUB_CAMERA_SEPARATOR: char = '.';

/// Tests that only become mandatory after a first API level, per scene.
///
/// A test is not yet mandated for devices whose first API level is at or
/// below the listed level.
pub const NOT_YET_MANDATED: &[(&str, &[(&str, u32)])] = &[
    ("scene0", &[("test_test_patterns", 30), ("test_tonemap_curve", 30)]),
    ("scene1_1", &[("test_ae_precapture_trigger", 28)]),
    ("scene1_2", &[]),
    ("scene2_a", &[("test_jpeg_quality", 30)]),
    ("scene2_b", &[("test_auto_per_frame_control", NOT_YET_MANDATED_ALL)]),
    ("scene2_c", &[]),
    ("scene2_d", &[("test_num_faces", 30)]),
    ("scene2_e", &[("test_num_faces", 30), ("test_continuous_picture", 30)]),
    ("scene2_f", &[("test_num_faces", 30)]),
    ("scene3", &[]),
    ("scene4", &[]),
    ("scene5", &[]),
    ("scene6", &[("test_zoom", 30)]),
    ("sensor_fusion", &[]),
    ("scene_hdr", &[]),
    ("scene_night", &[]),
];

/// Level above any real API level: the test is not mandated anywhere yet.
pub const NOT_YET_MANDATED_ALL: u32 = 100;

/// Tests of `scene` whose failure is tolerated on a device with `first_api_level`.
pub fn not_yet_mandated(scene: &str, first_api_level: u32) -> Vec<&'static str> {
    NOT_YET_MANDATED
        .iter()
        .find(|(name, _)| *name == scene)
        .map(|(_, tests)| {
            tests
                .iter()
                .filter(|(test, level)| {
                    debug!("First API level {} NOT MANDATED: {}", test, level);
                    first_api_level <= *level
                })
                .map(|(test, _)| *test)
                .collect()
        })
        .unwrap_or_default()
}

/// Camera under test, optionally addressing a hidden physical camera.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraId {
    pub logical: String,
    pub hidden_physical: Option<String>,
}

impl CameraId {
    /// Parses `"<id>"` or `"<id>.<physical id>"`.
    pub fn parse(text: &str) -> Self {
        match text.split_once(SUB_CAMERA_SEPARATOR) {
            Some((logical, physical)) => Self {
                logical: logical.to_string(),
                hidden_physical: Some(physical.to_string()),
            },
            None => Self {
                logical: text.to_string(),
                hidden_physical: None,
            },
        }
    }
}
