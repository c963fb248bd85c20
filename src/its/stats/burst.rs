use tracing::{debug, info};

use crate::its::capture::ImageBuffer;
use crate::its::common::error::{CheckError, Result};
use crate::its::config::BurstConfig;
use crate::its::stats::{Patch, channel_means};

/// Spread of one channel's patch mean across a burst.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSpread {
    pub channel: String,
    pub min: f64,
    pub max: f64,
    pub spread: f64,
}

#[derive(Debug, Clone)]
pub struct BurstReport {
    pub threshold: f64,
    pub channels: Vec<ChannelSpread>,
}

/// Checks that a center patch stays the same brightness across a burst.
#[derive(Debug, Clone)]
pub struct BurstConsistency {
    pub patch: Patch,
    pub spread_threshold: f64,
    /// Fail when a channel's darkest frame is at or below this mean
    pub brightness_floor: Option<f64>,
    /// Fail on `spread >= threshold` instead of `spread > threshold`
    pub inclusive: bool,
}

impl BurstConsistency {
    /// AE/AWB-locked auto burst: brightness floor, tighter with manual sensor.
    pub fn locked(config: &BurstConfig, manual_sensor: bool) -> Self {
        let spread_threshold = if manual_sensor {
            config.spread_thresh_manual_sensor
        } else {
            config.spread_thresh
        };
        Self {
            patch: config.locked_patch,
            spread_threshold,
            brightness_floor: Some(config.value_thresh),
            inclusive: true,
        }
    }

    /// Manual-exposure burst: tighter on recent first API levels, no floor.
    pub fn manual(config: &BurstConfig, first_api_level: u32) -> Self {
        let spread_threshold = if first_api_level >= config.api_level_tight {
            config.spread_thresh_api_tight
        } else {
            config.spread_thresh
        };
        Self {
            patch: config.patch,
            spread_threshold,
            brightness_floor: None,
            inclusive: false,
        }
    }

    /// Per-frame, per-channel means of the configured patch.
    pub fn patch_means(&self, frames: &[ImageBuffer]) -> Result<Vec<Vec<f64>>> {
        frames
            .iter()
            .map(|frame| Ok(channel_means(&frame.patch(&self.patch)?)))
            .collect()
    }

    /// Validates already-measured means; `means[frame][channel]`.
    pub fn check_means(&self, channel_names: &[&str], means: &[Vec<f64>]) -> Result<BurstReport> {
        if means.is_empty() || channel_names.is_empty() {
            return Err(CheckError::EmptyBurst {
                frames: means.len(),
                channels: channel_names.len(),
            });
        }

        let mut channels = Vec::with_capacity(channel_names.len());

        for (c, name) in channel_names.iter().enumerate() {
            let mut series = Vec::with_capacity(means.len());
            for frame in means {
                let value = frame.get(c).copied().ok_or(CheckError::ChannelMismatch {
                    expected: channel_names.len(),
                    actual: frame.len(),
                })?;
                series.push(value);
            }

            let (min_frame, min) = series
                .iter()
                .copied()
                .enumerate()
                .fold((0, f64::INFINITY), |best, (i, v)| if v < best.1 { (i, v) } else { best });
            let max = series.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let spread = max - min;
            debug!("{} patch mean spread {:.5}. means = {:?}", name, spread, series);

            if let Some(floor) = self.brightness_floor {
                if min <= floor {
                    return Err(CheckError::TooDark {
                        channel: name.to_string(),
                        frame: min_frame,
                        mean: min,
                        threshold: floor,
                    });
                }
            }

            let over = if self.inclusive {
                spread >= self.spread_threshold
            } else {
                spread > self.spread_threshold
            };
            if over {
                return Err(CheckError::SpreadOverThreshold {
                    channel: name.to_string(),
                    spread,
                    threshold: self.spread_threshold,
                });
            }

            channels.push(ChannelSpread {
                channel: name.to_string(),
                min,
                max,
                spread,
            });
        }

        info!(
            frames = means.len(),
            threshold = self.spread_threshold,
            "Burst consistency passed"
        );
        Ok(BurstReport {
            threshold: self.spread_threshold,
            channels,
        })
    }

    /// Measures and validates a burst of frames.
    pub fn check(&self, channel_names: &[&str], frames: &[ImageBuffer]) -> Result<BurstReport> {
        let means = self.patch_means(frames)?;
        self.check_means(channel_names, &means)
    }
}
