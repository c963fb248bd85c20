use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::its::common::error::{CheckError, Result};
use crate::its::config::FrameSyncConfig;
use crate::its::frame_sync::angles::{
    AnglePair, angular_diff_threshold, assert_angular_difference, assert_camera_movement,
    mask_angles_near_extremes, max_frame_to_frame_shift, remove_frames_without_angles,
};

/// Timestamp source of a logical multi-camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncCalibration {
    Approximate,
    Calibrated,
}

#[derive(Debug, Clone)]
pub struct FrameSyncReport {
    /// Pairs that survived angle detection and masking
    pub pairs: Vec<(f64, f64)>,
    pub min_angle: f64,
    pub max_angle: f64,
    pub frame_to_frame_max: f64,
    pub threshold: f64,
    pub max_diff: f64,
}

pub struct FrameSyncCheck {
    config: FrameSyncConfig,
}

impl FrameSyncCheck {
    pub fn new(config: FrameSyncConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FrameSyncConfig {
        &self.config
    }

    /// Runs the full angle-pair validation.
    ///
    /// Pairs missing an angle and pairs near 0/90 degrees are discarded
    /// before the minimum frame count is enforced.
    #[instrument(skip(self, pairs), fields(frames = pairs.len()))]
    pub fn run(
        &self,
        pairs: &[AnglePair],
        first_api_level: u32,
        sync: SyncCalibration,
    ) -> Result<FrameSyncReport> {
        debug!(
            "sync: {}",
            match sync {
                SyncCalibration::Calibrated => "CALIBRATED",
                SyncCalibration::Approximate => "APPROXIMATE",
            }
        );

        let detected = remove_frames_without_angles(pairs);
        let masked = mask_angles_near_extremes(&detected, self.config.angle_mask)?;

        let min_frames = self.config.frames_with_squares_min;
        debug!("Using {} image pairs to compute angular difference.", masked.len());
        if masked.len() < min_frames {
            return Err(CheckError::NotEnoughFrames {
                found: masked.len(),
                threshold: min_frames,
            });
        }

        let (min_angle, max_angle) =
            assert_camera_movement(&masked, self.config.angular_movement_thresh)?;

        let frame_to_frame_max = max_frame_to_frame_shift(&masked, self.config.angle_jump_90);
        let threshold =
            angular_diff_threshold(&self.config, first_api_level, sync, frame_to_frame_max);

        let mut max_diff: f64 = 0.0;
        for &(angle_1, angle_2) in &masked {
            let diff = assert_angular_difference(angle_1, angle_2, threshold)?;
            max_diff = max_diff.max(diff);
        }

        info!(
            pairs = masked.len(),
            threshold, max_diff, "Frame sync check passed"
        );
        Ok(FrameSyncReport {
            pairs: masked,
            min_angle,
            max_angle,
            frame_to_frame_max,
            threshold,
            max_diff,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(min_frames: usize) -> FrameSyncCheck {
        FrameSyncCheck::new(
            FrameSyncConfig::builder()
                .frames_with_squares_min(min_frames)
                .build(),
        )
    }

    fn detected(pairs: &[(f64, f64)]) -> Vec<AnglePair> {
        pairs.iter().map(|&(a, b)| (Some(a), Some(b))).collect()
    }

    #[test]
    fn test_legacy_device_passes_and_fails() {
        let mut pairs = detected(&[(10.0, 11.0), (50.0, 49.0), (80.0, 79.0)]);
        let report = check(3).run(&pairs, 30, SyncCalibration::Approximate).unwrap();
        assert_eq!(report.threshold, 10.0);
        assert_eq!(report.max_diff, 1.0);

        pairs.push((Some(10.0), Some(40.0)));
        let err = check(3).run(&pairs, 30, SyncCalibration::Approximate).unwrap_err();
        assert!(matches!(
            err,
            CheckError::AngularDifferenceOverThreshold { diff, .. } if diff == 30.0
        ));
    }

    #[test]
    fn test_masked_pairs_do_not_count_toward_minimum() {
        let mut pairs = detected(&[(10.0, 11.0), (50.0, 49.0), (80.0, 79.0)]);
        pairs.push((Some(5.0), Some(85.0)));
        pairs.push((Some(30.0), None));

        let err = check(4).run(&pairs, 30, SyncCalibration::Calibrated).unwrap_err();
        assert_eq!(err, CheckError::NotEnoughFrames { found: 3, threshold: 4 });
    }

    #[test]
    fn test_not_enough_movement() {
        let pairs = detected(&[(40.0, 40.2), (40.5, 40.4), (41.0, 41.0)]);
        let err = check(3).run(&pairs, 33, SyncCalibration::Calibrated).unwrap_err();
        assert!(matches!(err, CheckError::NotEnoughMovement { .. }));
    }

    #[test]
    fn test_calibrated_sync_uses_tight_bound() {
        let pairs = detected(&[(10.0, 11.0), (30.0, 30.5), (50.0, 50.0)]);
        let report = check(3).run(&pairs, 31, SyncCalibration::Calibrated).unwrap();
        assert_eq!(report.threshold, 1.8);

        let loose = detected(&[(10.0, 12.0), (30.0, 30.5), (50.0, 50.0)]);
        assert!(check(3).run(&loose, 31, SyncCalibration::Calibrated).is_err());
    }

    #[test]
    fn test_approximate_sync_uses_frame_to_frame_shift() {
        let pairs = detected(&[(10.0, 15.0), (30.0, 34.0), (50.0, 52.0)]);
        let report = check(3).run(&pairs, 34, SyncCalibration::Approximate).unwrap();
        assert_eq!(report.frame_to_frame_max, 20.0);
        assert_eq!(report.threshold, 20.0);
        assert_eq!(report.max_diff, 5.0);
    }

    #[test]
    fn test_default_minimum_frames() {
        let pairs = detected(&[(10.0, 11.0), (50.0, 49.0), (80.0, 79.0)]);
        let err = FrameSyncCheck::new(FrameSyncConfig::default())
            .run(&pairs, 30, SyncCalibration::Approximate)
            .unwrap_err();
        assert_eq!(err, CheckError::NotEnoughFrames { found: 3, threshold: 20 });
    }
}
