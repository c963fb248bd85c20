use tracing::debug;

use crate::its::common::error::{CheckError, Result};
use crate::its::config::FrameSyncConfig;
use crate::its::frame_sync::SyncCalibration;

/// Chart angle in degrees for each camera; `None` when no squares were found.
pub type AnglePair = (Option<f64>, Option<f64>);

/// Keeps only pairs where both cameras produced an angle.
pub fn remove_frames_without_angles(pairs: &[AnglePair]) -> Vec<(f64, f64)> {
    let kept: Vec<(f64, f64)> = pairs
        .iter()
        .filter_map(|&(a, b)| Some((a?, b?)))
        .collect();
    debug!("{} of {} frame pairs have angles", kept.len(), pairs.len());
    kept
}

/// Drops pairs where either angle lies within `band` degrees of 0 or 90,
/// where a rotated square grid is ambiguous.
pub fn mask_angles_near_extremes(pairs: &[(f64, f64)], band: f64) -> Result<Vec<(f64, f64)>> {
    let in_range = |angle: f64| {
        let a = angle.abs();
        band <= a && a <= 90.0 - band
    };
    let masked: Vec<(f64, f64)> = pairs
        .iter()
        .copied()
        .filter(|&(a, b)| in_range(a) && in_range(b))
        .collect();
    if masked.is_empty() {
        return Err(CheckError::AllAnglesMasked);
    }
    Ok(masked)
}

/// Range of camera 0's angles must cover at least `threshold` degrees.
///
/// Returns `(min, max)` of the angles on success.
pub fn assert_camera_movement(pairs: &[(f64, f64)], threshold: f64) -> Result<(f64, f64)> {
    let (min, max) = pairs
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(a, _)| {
            (lo.min(a), hi.max(a))
        });
    debug!("Camera movement. min angle: {:.2}, max: {:.2}", min, max);
    if max - min < threshold {
        return Err(CheckError::NotEnoughMovement { min, max, threshold });
    }
    Ok((min, max))
}

/// Largest consecutive-frame change on either camera, ignoring jumps of
/// `jump_90` or more (90 degree wraps of the square grid).
pub fn max_frame_to_frame_shift(pairs: &[(f64, f64)], jump_90: f64) -> f64 {
    let mut shift_max = 0.0;
    for w in pairs.windows(2) {
        let (prev, cur) = (w[0], w[1]);
        for (cam, diff) in [(0, (cur.0 - prev.0).abs()), (1, (cur.1 - prev.1).abs())] {
            if jump_90 > diff && diff > shift_max {
                shift_max = diff;
            }
            debug!("cam: {} frame_to_frame_diff: {:.2}", cam, diff);
        }
    }
    debug!("frame_to_frame_diff_max: {:.2}", shift_max);
    shift_max
}

/// Tolerance for the inter-camera angle difference.
///
/// Devices launched before `api_level_sync_source` use the legacy bound.
/// Later devices use the calibrated bound, or the measured frame-to-frame
/// shift when their timestamps are only approximately synchronized.
pub fn angular_diff_threshold(
    config: &FrameSyncConfig,
    first_api_level: u32,
    sync: SyncCalibration,
    frame_to_frame_max: f64,
) -> f64 {
    let threshold = if first_api_level < config.api_level_sync_source {
        debug!("first API level < {}", config.api_level_sync_source);
        config.angular_diff_thresh_legacy
    } else {
        match sync {
            SyncCalibration::Calibrated => config.angular_diff_thresh_calibrated,
            SyncCalibration::Approximate => frame_to_frame_max,
        }
    };
    debug!("angular diff threshold: {:.2}", threshold);
    threshold
}

/// Returns the absolute difference when it is within `threshold`.
pub fn assert_angular_difference(angle_1: f64, angle_2: f64, threshold: f64) -> Result<f64> {
    let diff = (angle_2 - angle_1).abs();
    if diff > threshold {
        return Err(CheckError::AngularDifferenceOverThreshold {
            angle_1,
            angle_2,
            diff,
            threshold,
        });
    }
    Ok(diff)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairs_within_threshold() {
        let mut pairs = vec![(10.0, 11.0), (50.0, 49.0), (80.0, 79.0)];
        for &(a, b) in &pairs {
            assert!(assert_angular_difference(a, b, 5.0).is_ok());
        }

        pairs.push((10.0, 40.0));
        let err = pairs
            .iter()
            .map(|&(a, b)| assert_angular_difference(a, b, 5.0))
            .find_map(|r| r.err())
            .unwrap();
        match err {
            CheckError::AngularDifferenceOverThreshold { diff, .. } => assert_eq!(diff, 30.0),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_missing_angles_removed() {
        let pairs = vec![(Some(20.0), None), (Some(30.0), Some(31.0)), (None, Some(5.0))];
        assert_eq!(remove_frames_without_angles(&pairs), vec![(30.0, 31.0)]);
    }

    #[test]
    fn test_mask_band_is_inclusive() {
        let pairs = vec![(5.0, 85.0), (10.0, 80.0), (45.0, 89.0), (-30.0, -31.0)];
        let masked = mask_angles_near_extremes(&pairs, 10.0).unwrap();
        assert_eq!(masked, vec![(10.0, 80.0), (-30.0, -31.0)]);
    }

    #[test]
    fn test_everything_masked() {
        let pairs = vec![(5.0, 85.0), (0.0, 90.0)];
        assert_eq!(
            mask_angles_near_extremes(&pairs, 10.0),
            Err(CheckError::AllAnglesMasked)
        );
    }

    #[test]
    fn test_small_sweep_is_not_movement() {
        let pairs = vec![(40.0, 40.0), (40.5, 40.5), (41.0, 41.0)];
        let err = assert_camera_movement(&pairs, 35.0).unwrap_err();
        assert_eq!(
            err,
            CheckError::NotEnoughMovement {
                min: 40.0,
                max: 41.0,
                threshold: 35.0,
            }
        );
        assert_eq!(assert_camera_movement(&[(10.0, 0.0), (60.0, 0.0)], 35.0), Ok((10.0, 60.0)));
    }

    #[test]
    fn test_frame_to_frame_ignores_wraps() {
        let pairs = vec![(20.0, 21.0), (25.0, 28.0), (75.0, 74.0), (70.0, 70.0)];
        assert_eq!(max_frame_to_frame_shift(&pairs, 60.0), 50.0);
        let wrapped = vec![(15.0, 15.0), (80.0, 16.0), (78.0, 18.0)];
        assert_eq!(max_frame_to_frame_shift(&wrapped, 60.0), 2.0);
    }

    #[test]
    fn test_threshold_selection() {
        let config = FrameSyncConfig::default();
        assert_eq!(angular_diff_threshold(&config, 30, SyncCalibration::Calibrated, 7.0), 10.0);
        assert_eq!(angular_diff_threshold(&config, 31, SyncCalibration::Calibrated, 7.0), 1.8);
        assert_eq!(angular_diff_threshold(&config, 33, SyncCalibration::Approximate, 7.0), 7.0);
    }
}
