//! Noise-model validation
//!
//! Compares the measured variance of a small, flat raw patch against the
//! linear shot/read noise model the sensor reports in its metadata.

mod check;
mod profile;

#[cfg(test)]
mod tests;

pub use check::{NoiseModelCheck, NoiseModelReport, SweepPoint, VarianceSample};
pub use profile::{NoiseProfile, exposure_for_sensitivity, sensitivity_steps};
