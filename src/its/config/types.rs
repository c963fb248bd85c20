use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::its::common::error::CaptureError;
use crate::its::stats::Patch;

/// What the noise-model check does when `mean - 3 sigma` falls below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClippingPolicy {
    /// Raise `DistributionCrossesZero`.
    Fail,
    /// Drop the sample and keep going.
    Skip,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NoiseModelConfig {
    /// Absolute variance delta threshold
    pub var_atol: f64,
    /// Relative variance delta threshold, as a fraction of the model variance
    pub var_rtol: f64,
    pub patch: Patch,
    pub clipping: ClippingPolicy,
    /// Number of sensitivity steps between min and max analog sensitivity
    pub num_steps: u32,
}

impl Default for NoiseModelConfig {
    fn default() -> Self {
        Self {
            var_atol: 0.0012,
            var_rtol: 0.2,
            patch: Patch::centered(0.02, 0.02),
            clipping: ClippingPolicy::Fail,
            num_steps: 4,
        }
    }
}

impl NoiseModelConfig {
    pub fn builder() -> NoiseModelConfigBuilder {
        NoiseModelConfigBuilder::default()
    }
}

#[derive(Default)]
pub struct NoiseModelConfigBuilder {
    var_atol: Option<f64>,
    var_rtol: Option<f64>,
    patch: Option<Patch>,
    clipping: Option<ClippingPolicy>,
    num_steps: Option<u32>,
}

impl NoiseModelConfigBuilder {
    pub fn var_atol(mut self, atol: f64) -> Self {
        self.var_atol = Some(atol);
        self
    }

    pub fn var_rtol(mut self, rtol: f64) -> Self {
        self.var_rtol = Some(rtol);
        self
    }

    pub fn patch(mut self, patch: Patch) -> Self {
        self.patch = Some(patch);
        self
    }

    pub fn clipping(mut self, policy: ClippingPolicy) -> Self {
        self.clipping = Some(policy);
        self
    }

    pub fn num_steps(mut self, steps: u32) -> Self {
        self.num_steps = Some(steps);
        self
    }

    pub fn build(self) -> NoiseModelConfig {
        let default = NoiseModelConfig::default();
        NoiseModelConfig {
            var_atol: self.var_atol.unwrap_or(default.var_atol),
            var_rtol: self.var_rtol.unwrap_or(default.var_rtol),
            patch: self.patch.unwrap_or(default.patch),
            clipping: self.clipping.unwrap_or(default.clipping),
            num_steps: self.num_steps.unwrap_or(default.num_steps),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BurstConfig {
    /// Manual burst patch
    pub patch: Patch,
    /// Locked burst patch, anchored at the center instead of centered on it
    pub locked_patch: Patch,
    pub spread_thresh: f64,
    /// Locked burst on devices with manual sensor control
    pub spread_thresh_manual_sensor: f64,
    /// Manual burst on devices launched at `api_level_tight` or later
    pub spread_thresh_api_tight: f64,
    pub api_level_tight: u32,
    /// Minimum center patch mean for locked bursts
    pub value_thresh: f64,
}

impl Default for BurstConfig {
    fn default() -> Self {
        Self {
            patch: Patch::centered(0.1, 0.1),
            locked_patch: Patch::new(0.4, 0.4, 0.1, 0.1),
            spread_thresh: 0.03,
            spread_thresh_manual_sensor: 0.01,
            spread_thresh_api_tight: 0.02,
            api_level_tight: 30,
            value_thresh: 0.1,
        }
    }
}

impl BurstConfig {
    pub fn builder() -> BurstConfigBuilder {
        BurstConfigBuilder::default()
    }
}

#[derive(Default)]
pub struct BurstConfigBuilder {
    patch: Option<Patch>,
    locked_patch: Option<Patch>,
    spread_thresh: Option<f64>,
    spread_thresh_manual_sensor: Option<f64>,
    spread_thresh_api_tight: Option<f64>,
    value_thresh: Option<f64>,
}

impl BurstConfigBuilder {
    pub fn patch(mut self, patch: Patch) -> Self {
        self.patch = Some(patch);
        self
    }

    pub fn locked_patch(mut self, patch: Patch) -> Self {
        self.locked_patch = Some(patch);
        self
    }

    pub fn spread_thresh(mut self, thresh: f64) -> Self {
        self.spread_thresh = Some(thresh);
        self
    }

    pub fn spread_thresh_manual_sensor(mut self, thresh: f64) -> Self {
        self.spread_thresh_manual_sensor = Some(thresh);
        self
    }

    pub fn spread_thresh_api_tight(mut self, thresh: f64) -> Self {
        self.spread_thresh_api_tight = Some(thresh);
        self
    }

    pub fn value_thresh(mut self, thresh: f64) -> Self {
        self.value_thresh = Some(thresh);
        self
    }

    pub fn build(self) -> BurstConfig {
        let default = BurstConfig::default();
        BurstConfig {
            patch: self.patch.unwrap_or(default.patch),
            locked_patch: self.locked_patch.unwrap_or(default.locked_patch),
            spread_thresh: self.spread_thresh.unwrap_or(default.spread_thresh),
            spread_thresh_manual_sensor: self
                .spread_thresh_manual_sensor
                .unwrap_or(default.spread_thresh_manual_sensor),
            spread_thresh_api_tight: self
                .spread_thresh_api_tight
                .unwrap_or(default.spread_thresh_api_tight),
            api_level_tight: default.api_level_tight,
            value_thresh: self.value_thresh.unwrap_or(default.value_thresh),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FrameSyncConfig {
    /// Degrees masked around 0 and 90, where rotated squares look alike
    pub angle_mask: f64,
    /// Frame-to-frame jumps at or above this are 90 degree wraps, not motion
    pub angle_jump_90: f64,
    pub angular_diff_thresh_legacy: f64,
    /// 180 deg / 1000 ms * 10 ms
    pub angular_diff_thresh_calibrated: f64,
    pub angular_movement_thresh: f64,
    pub frames_with_squares_min: usize,
    /// First API level where the sync source decides the threshold
    pub api_level_sync_source: u32,
}

impl Default for FrameSyncConfig {
    fn default() -> Self {
        Self {
            angle_mask: 10.0,
            angle_jump_90: 60.0,
            angular_diff_thresh_legacy: 10.0,
            angular_diff_thresh_calibrated: 1.8,
            angular_movement_thresh: 35.0,
            frames_with_squares_min: 20,
            api_level_sync_source: 31,
        }
    }
}

impl FrameSyncConfig {
    pub fn builder() -> FrameSyncConfigBuilder {
        FrameSyncConfigBuilder::default()
    }
}

#[derive(Default)]
pub struct FrameSyncConfigBuilder {
    angle_mask: Option<f64>,
    angular_diff_thresh_legacy: Option<f64>,
    angular_diff_thresh_calibrated: Option<f64>,
    angular_movement_thresh: Option<f64>,
    frames_with_squares_min: Option<usize>,
}

impl FrameSyncConfigBuilder {
    pub fn angle_mask(mut self, degrees: f64) -> Self {
        self.angle_mask = Some(degrees);
        self
    }

    pub fn angular_diff_thresh_legacy(mut self, degrees: f64) -> Self {
        self.angular_diff_thresh_legacy = Some(degrees);
        self
    }

    pub fn angular_diff_thresh_calibrated(mut self, degrees: f64) -> Self {
        self.angular_diff_thresh_calibrated = Some(degrees);
        self
    }

    pub fn angular_movement_thresh(mut self, degrees: f64) -> Self {
        self.angular_movement_thresh = Some(degrees);
        self
    }

    pub fn frames_with_squares_min(mut self, frames: usize) -> Self {
        self.frames_with_squares_min = Some(frames);
        self
    }

    pub fn build(self) -> FrameSyncConfig {
        let default = FrameSyncConfig::default();
        FrameSyncConfig {
            angle_mask: self.angle_mask.unwrap_or(default.angle_mask),
            angle_jump_90: default.angle_jump_90,
            angular_diff_thresh_legacy: self
                .angular_diff_thresh_legacy
                .unwrap_or(default.angular_diff_thresh_legacy),
            angular_diff_thresh_calibrated: self
                .angular_diff_thresh_calibrated
                .unwrap_or(default.angular_diff_thresh_calibrated),
            angular_movement_thresh: self
                .angular_movement_thresh
                .unwrap_or(default.angular_movement_thresh),
            frames_with_squares_min: self
                .frames_with_squares_min
                .unwrap_or(default.frames_with_squares_min),
            api_level_sync_source: default.api_level_sync_source,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OrientationConfig {
    /// Region of both chart patch and template that is compared
    pub compare_region: Patch,
    /// Minimum max-min range of the chart patch
    pub content_thresh: f64,
}

impl Default for OrientationConfig {
    fn default() -> Self {
        Self {
            compare_region: Patch::centered(0.5, 0.5),
            content_thresh: 1.0 / 8.0,
        }
    }
}

/// Every threshold set, as loaded from a JSON override file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ItsConfig {
    pub noise_model: NoiseModelConfig,
    pub burst: BurstConfig,
    pub frame_sync: FrameSyncConfig,
    pub orientation: OrientationConfig,
}

impl ItsConfig {
    pub fn from_json_str(text: &str) -> Result<Self, CaptureError> {
        serde_json::from_str(text).map_err(|e| CaptureError::DecodeError(e.to_string()))
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, CaptureError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| CaptureError::InputReadError(format!("{}: {}", path.display(), e)))?;
        debug!("Loading check configuration from {}", path.display());
        Self::from_json_str(&text)
    }
}
