use tracing::{debug, info, info_span, instrument};

use crate::its::capture::{
    BayerChannel, CaptureMetadata, ImageBuffer, RawCapture, black_level_for, split_planes,
};
use crate::its::common::error::{CheckError, Result};
use crate::its::config::{ClippingPolicy, NoiseModelConfig};
use crate::its::noise_model::{NoiseProfile, exposure_for_sensitivity, sensitivity_steps};
use crate::its::stats::{channel_means, channel_variances};

/// One channel's measured vs. modelled variance.
#[derive(Debug, Clone, PartialEq)]
pub struct VarianceSample {
    pub channel: BayerChannel,
    pub mean: f64,
    pub measured: f64,
    pub model: f64,
    pub diff: f64,
    pub threshold: f64,
}

#[derive(Debug, Clone)]
pub struct SweepPoint {
    pub sensitivity: i32,
    pub samples: Vec<VarianceSample>,
}

#[derive(Debug, Clone, Default)]
pub struct NoiseModelReport {
    pub points: Vec<SweepPoint>,
}

pub struct NoiseModelCheck {
    config: NoiseModelConfig,
}

impl NoiseModelCheck {
    pub fn new(config: NoiseModelConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NoiseModelConfig {
        &self.config
    }

    /// `(sensitivity, exposure_ns)` per sweep point, `num_steps` apart, with
    /// the sensitivity-exposure product held at `sens_exp_product`.
    pub fn plan_sweep(
        &self,
        sens_min: i32,
        sens_max_analog: i32,
        sens_exp_product: i64,
    ) -> Vec<(i32, i64)> {
        let plan: Vec<(i32, i64)> =
            sensitivity_steps(sens_min, sens_max_analog, self.config.num_steps)
                .into_iter()
                .map(|s| (s, exposure_for_sensitivity(sens_exp_product, s)))
                .collect();
        debug!("sweep plan: {:?}", plan);
        plan
    }

    /// Allowed deviation for a given model variance.
    pub fn threshold(&self, model_variance: f64) -> f64 {
        self.config.var_atol.max(self.config.var_rtol * model_variance)
    }

    /// Returns `(diff, threshold)` when the measurement is within tolerance.
    pub fn compare(&self, channel: BayerChannel, measured: f64, model: f64) -> Result<(f64, f64)> {
        let diff = (measured - model).abs();
        let threshold = self.threshold(model);
        if diff > threshold {
            return Err(CheckError::VarianceOverThreshold {
                channel: channel.to_string(),
                diff,
                threshold,
            });
        }
        Ok((diff, threshold))
    }

    /// Evaluates a black-level-normalized single-channel patch.
    ///
    /// `Ok(None)` means the sample was dropped by `ClippingPolicy::Skip`.
    pub fn evaluate_patch(
        &self,
        channel: BayerChannel,
        patch: &ImageBuffer,
        profile: &NoiseProfile,
    ) -> Result<Option<VarianceSample>> {
        let mean = channel_means(patch)[0];
        let model = profile.model_variance(mean);

        if model <= 0.0 {
            return Err(CheckError::ModelVarianceNearZero {
                channel: channel.to_string(),
                variance: model,
            });
        }

        let mean_minus_3sigma = mean - 3.0 * model.sqrt();
        if mean_minus_3sigma < 0.0 {
            debug!(
                "{} distribution crosses 0: mean {:.3e}, u-3s {:.3e}",
                channel, mean, mean_minus_3sigma
            );
            return match self.config.clipping {
                ClippingPolicy::Fail => Err(CheckError::DistributionCrossesZero {
                    mean,
                    variance: model,
                    mean_minus_3sigma,
                }),
                ClippingPolicy::Skip => Ok(None),
            };
        }

        let measured = channel_variances(patch)[0];
        debug!(
            "{} mean: {:.3}, var: {:.3e}, var_model: {:.3e}",
            channel, mean, measured, model
        );
        let (diff, threshold) = self.compare(channel, measured, model)?;
        debug!("abs_diff: {:.5}, rel_diff: {:.3}", diff, diff / model);

        Ok(Some(VarianceSample {
            channel,
            mean,
            measured,
            model,
            diff,
            threshold,
        }))
    }

    /// Checks all four Bayer channels of one raw capture.
    ///
    /// `noise_profile` is in CFA pattern order, as reported by the sensor.
    #[instrument(skip_all, fields(width = raw.width, height = raw.height))]
    pub fn check_capture(
        &self,
        raw: &RawCapture,
        noise_profile: &[NoiseProfile],
    ) -> Result<Vec<VarianceSample>> {
        if noise_profile.len() != BayerChannel::ALL.len() {
            return Err(CheckError::MetadataLength {
                field: "noise_profile",
                expected: BayerChannel::ALL.len(),
                actual: noise_profile.len(),
            });
        }

        let planes = {
            let _span = info_span!("split_planes").entered();
            split_planes(raw)?
        };
        let white = f32::from(raw.white_level);

        let mut samples = Vec::with_capacity(planes.len());
        for (plane, &channel) in planes.iter().zip(BayerChannel::ALL.iter()) {
            let black = f32::from(black_level_for(raw, channel));
            let range = (white - black).max(1.0);
            let mut patch = plane.patch(&self.config.patch)?;
            for v in patch.data.iter_mut() {
                *v = (*v * white - black) / range;
            }

            let profile = &noise_profile[raw.cfa.position_of(channel)];
            if let Some(sample) = self.evaluate_patch(channel, &patch, profile)? {
                samples.push(sample);
            }
        }
        Ok(samples)
    }

    /// Checks a sensitivity sweep of raw captures.
    pub fn check_sweep(&self, captures: &[(RawCapture, CaptureMetadata)]) -> Result<NoiseModelReport> {
        let mut report = NoiseModelReport::default();
        for (raw, metadata) in captures {
            debug!("sensitivity: {}", metadata.sensitivity);
            let samples = self.check_capture(raw, &metadata.noise_profile)?;
            report.points.push(SweepPoint {
                sensitivity: metadata.sensitivity,
                samples,
            });
        }
        info!(points = report.points.len(), "Noise model check passed");
        Ok(report)
    }
}
