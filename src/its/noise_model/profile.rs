use serde::Deserialize;

/// Per-channel noise model: `variance = scale * signal + offset`, both in
/// normalized units.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct NoiseProfile {
    pub scale: f64,
    pub offset: f64,
}

impl NoiseProfile {
    pub fn new(scale: f64, offset: f64) -> Self {
        Self { scale, offset }
    }

    #[inline]
    pub fn model_variance(&self, mean: f64) -> f64 {
        self.scale * mean + self.offset
    }
}

/// Sensitivities from `min` to `max_analog` inclusive in `num_steps` equal
/// integer steps.
pub fn sensitivity_steps(min: i32, max_analog: i32, num_steps: u32) -> Vec<i32> {
    if num_steps == 0 || max_analog <= min {
        return vec![min];
    }
    let step = (max_analog - min) / num_steps as i32;
    if step == 0 {
        return vec![min];
    }
    (min..=max_analog).step_by(step as usize).collect()
}

/// Exposure keeping `sensitivity * exposure` constant.
pub fn exposure_for_sensitivity(sens_exp_product: i64, sensitivity: i32) -> i64 {
    if sensitivity <= 0 {
        return 0;
    }
    sens_exp_product / i64::from(sensitivity)
}
