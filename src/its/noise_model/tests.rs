use proptest::prelude::*;

use crate::its::capture::{BayerChannel, CaptureMetadata, CfaPattern, RawCapture};
use crate::its::common::error::CheckError;
use crate::its::config::{ClippingPolicy, NoiseModelConfig};
use crate::its::noise_model::{
    NoiseModelCheck, NoiseProfile, exposure_for_sensitivity, sensitivity_steps,
};
use crate::its::stats::Patch;

/// Every Bayer plane alternates between `lo` and `hi` in a checkerboard.
fn checker_raw(cfa: CfaPattern, lo: u16, hi: u16) -> RawCapture {
    let (w, h) = (40, 40);
    let mut data = Vec::with_capacity(w * h);
    for y in 0..h {
        for x in 0..w {
            data.push(if (x / 2 + y / 2) % 2 == 0 { lo } else { hi });
        }
    }
    RawCapture {
        width: w,
        height: h,
        data,
        cfa,
        black_levels: [0; 4],
        white_level: 1000,
        wb_coeffs: [1.0; 4],
    }
}

fn full_plane_check(clipping: ClippingPolicy) -> NoiseModelCheck {
    NoiseModelCheck::new(
        NoiseModelConfig::builder()
            .patch(Patch::new(0.0, 0.0, 1.0, 1.0))
            .clipping(clipping)
            .build(),
    )
}

#[test]
fn test_matching_model_passes() {
    // mean 0.5, variance 0.01 on every channel
    let raw = checker_raw(CfaPattern::Rggb, 400, 600);
    let profile = vec![NoiseProfile::new(0.02, 0.0); 4];

    let samples = full_plane_check(ClippingPolicy::Fail)
        .check_capture(&raw, &profile)
        .unwrap();

    assert_eq!(samples.len(), 4);
    for sample in &samples {
        assert!((sample.mean - 0.5).abs() < 1e-6);
        assert!((sample.measured - 0.01).abs() < 1e-6);
        assert!(sample.diff <= sample.threshold);
        assert!((sample.threshold - 0.002).abs() < 1e-6);
    }
}

#[test]
fn test_underestimated_model_fails() {
    let raw = checker_raw(CfaPattern::Rggb, 400, 600);
    let profile = vec![NoiseProfile::new(0.002, 0.0); 4];

    let err = full_plane_check(ClippingPolicy::Fail)
        .check_capture(&raw, &profile)
        .unwrap_err();

    match err {
        CheckError::VarianceOverThreshold { channel, diff, threshold } => {
            assert_eq!(channel, "R");
            assert!((diff - 0.009).abs() < 1e-6);
            assert_eq!(threshold, 0.0012);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_profile_is_indexed_by_cfa_position() {
    // Red sits at the bottom-right of a BGGR tile.
    let raw = checker_raw(CfaPattern::Bggr, 400, 600);
    let mut profile = vec![NoiseProfile::new(0.02, 0.0); 4];
    // model 0.025 vs measured 0.01, still clear of zero at 3 sigma
    profile[3] = NoiseProfile::new(0.05, 0.0);

    let err = full_plane_check(ClippingPolicy::Fail)
        .check_capture(&raw, &profile)
        .unwrap_err();
    match err {
        CheckError::VarianceOverThreshold { channel, diff, threshold } => {
            assert_eq!(channel, "R");
            assert!((diff - 0.015).abs() < 1e-6);
            assert!((threshold - 0.005).abs() < 1e-9);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_dark_patch_crosses_zero() {
    // mean 0.03, model variance 0.0006, 3 sigma ~ 0.073
    let raw = checker_raw(CfaPattern::Rggb, 20, 40);
    let profile = vec![NoiseProfile::new(0.02, 0.0); 4];

    let err = full_plane_check(ClippingPolicy::Fail)
        .check_capture(&raw, &profile)
        .unwrap_err();
    match err {
        CheckError::DistributionCrossesZero { mean, mean_minus_3sigma, .. } => {
            assert!((mean - 0.03).abs() < 1e-6);
            assert!(mean_minus_3sigma < 0.0);
        }
        other => panic!("unexpected {:?}", other),
    }

    let skipped = full_plane_check(ClippingPolicy::Skip)
        .check_capture(&raw, &profile)
        .unwrap();
    assert!(skipped.is_empty());
}

#[test]
fn test_zero_model_variance() {
    let raw = checker_raw(CfaPattern::Rggb, 400, 600);
    let profile = vec![NoiseProfile::new(0.0, 0.0); 4];
    let err = full_plane_check(ClippingPolicy::Fail)
        .check_capture(&raw, &profile)
        .unwrap_err();
    assert!(matches!(err, CheckError::ModelVarianceNearZero { .. }));
}

#[test]
fn test_noise_profile_wrong_length() {
    let raw = checker_raw(CfaPattern::Rggb, 400, 600);
    let err = full_plane_check(ClippingPolicy::Fail)
        .check_capture(&raw, &[NoiseProfile::new(0.02, 0.0); 3])
        .unwrap_err();
    assert_eq!(
        err,
        CheckError::MetadataLength {
            field: "noise_profile",
            expected: 4,
            actual: 3,
        }
    );
}

#[test]
fn test_black_level_is_removed() {
    // 64 black, so 464/664 normalize to 0.4/0.6 of the 1000-64 range
    let mut raw = checker_raw(CfaPattern::Rggb, 64 + 374, 64 + 562);
    raw.black_levels = [64; 4];
    let check = full_plane_check(ClippingPolicy::Fail);
    let profile = vec![NoiseProfile::new(0.02, 0.0); 4];

    let samples = check.check_capture(&raw, &profile).unwrap();
    let expected_mean = (374.0 + 562.0) / 2.0 / 936.0;
    assert!((samples[0].mean - expected_mean).abs() < 1e-5);
}

#[test]
fn test_sweep_keeps_sensitivity_order() {
    let raw = checker_raw(CfaPattern::Grbg, 400, 600);
    let metadata = |sensitivity| CaptureMetadata {
        sensitivity,
        exposure_ns: 10_000_000,
        timestamp_ns: 0,
        noise_profile: vec![NoiseProfile::new(0.02, 0.0); 4],
    };
    let captures = vec![(raw.clone(), metadata(100)), (raw, metadata(400))];

    let report = full_plane_check(ClippingPolicy::Fail)
        .check_sweep(&captures)
        .unwrap();
    let sens: Vec<i32> = report.points.iter().map(|p| p.sensitivity).collect();
    assert_eq!(sens, vec![100, 400]);
}

#[test]
fn test_sweep_plan_follows_configured_steps() {
    let check = NoiseModelCheck::new(NoiseModelConfig::default());
    let plan = check.plan_sweep(100, 800, 100 * 20_000_000);
    assert_eq!(
        plan,
        vec![
            (100, 20_000_000),
            (275, 7_272_727),
            (450, 4_444_444),
            (625, 3_200_000),
            (800, 2_500_000),
        ]
    );

    let coarse = NoiseModelCheck::new(NoiseModelConfig::builder().num_steps(1).build());
    let sens: Vec<i32> = coarse.plan_sweep(100, 800, 1).iter().map(|&(s, _)| s).collect();
    assert_eq!(sens, vec![100, 800]);
}

#[test]
fn test_sensitivity_steps() {
    assert_eq!(sensitivity_steps(100, 800, 4), vec![100, 275, 450, 625, 800]);
    assert_eq!(sensitivity_steps(100, 102, 4), vec![100]);
    assert_eq!(exposure_for_sensitivity(100 * 20_000_000, 400), 5_000_000);
}

proptest! {
    #[test]
    fn test_measurement_equal_to_model_passes(model in 0.0f64..1.0) {
        let check = NoiseModelCheck::new(NoiseModelConfig::default());
        let (diff, threshold) = check.compare(BayerChannel::Gb, model, model).unwrap();
        prop_assert_eq!(diff, 0.0);
        prop_assert!(threshold >= 0.0);
    }
}
