//! Sanity checks on converged 3A (AE, AWB, AF) results.

use serde::Deserialize;
use tracing::debug;

use crate::its::common::error::{CheckError, Result};

const AWB_GAINS_LENGTH: usize = 4;
const AWB_XFORM_LENGTH: usize = 9;

/// Values reported once auto exposure, white balance and focus converge.
#[derive(Debug, Clone, Deserialize)]
pub struct ThreeAResult {
    pub sensitivity: i32,
    pub exposure_ns: i64,
    pub awb_gains: Vec<f64>,
    /// Row-major 3x3 color transform
    pub awb_transform: Vec<f64>,
    pub focus_distance: f64,
}

fn assert_is_number(field: &'static str, value: f64) -> Result<()> {
    if value.is_nan() {
        return Err(CheckError::NotANumber { field, value });
    }
    Ok(())
}

impl ThreeAResult {
    pub fn validate(&self) -> Result<()> {
        debug!(
            "AWB: gains {:?}, xform {:?}",
            self.awb_gains, self.awb_transform
        );
        debug!("AE: sensitivity {}, exposure {}ns", self.sensitivity, self.exposure_ns);
        debug!("AF: distance {:.3}", self.focus_distance);

        if self.awb_gains.len() != AWB_GAINS_LENGTH {
            return Err(CheckError::MetadataLength {
                field: "AWB gains",
                expected: AWB_GAINS_LENGTH,
                actual: self.awb_gains.len(),
            });
        }
        for &g in &self.awb_gains {
            assert_is_number("AWB gain", g)?;
        }
        if self.awb_transform.len() != AWB_XFORM_LENGTH {
            return Err(CheckError::MetadataLength {
                field: "AWB transform",
                expected: AWB_XFORM_LENGTH,
                actual: self.awb_transform.len(),
            });
        }
        for &x in &self.awb_transform {
            assert_is_number("AWB transform", x)?;
        }
        if self.sensitivity <= 0 {
            return Err(CheckError::NonPositive {
                field: "sensitivity",
                value: f64::from(self.sensitivity),
            });
        }
        if self.exposure_ns <= 0 {
            return Err(CheckError::NonPositive {
                field: "exposure",
                value: self.exposure_ns as f64,
            });
        }
        if self.focus_distance < 0.0 {
            return Err(CheckError::NegativeFocusDistance(self.focus_distance));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn converged() -> ThreeAResult {
        ThreeAResult {
            sensitivity: 200,
            exposure_ns: 16_000_000,
            awb_gains: vec![2.0, 1.0, 1.0, 1.6],
            awb_transform: vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
            focus_distance: 0.0,
        }
    }

    #[test]
    fn test_converged_result_is_valid() {
        assert!(converged().validate().is_ok());
    }

    #[test]
    fn test_wrong_gain_count() {
        let mut r = converged();
        r.awb_gains.pop();
        assert_eq!(
            r.validate(),
            Err(CheckError::MetadataLength {
                field: "AWB gains",
                expected: 4,
                actual: 3,
            })
        );
    }

    #[test]
    fn test_nan_transform() {
        let mut r = converged();
        r.awb_transform[4] = f64::NAN;
        assert!(matches!(r.validate(), Err(CheckError::NotANumber { field: "AWB transform", .. })));
    }

    #[test]
    fn test_non_positive_exposure_and_sensitivity() {
        let mut r = converged();
        r.exposure_ns = 0;
        assert!(matches!(r.validate(), Err(CheckError::NonPositive { field: "exposure", .. })));

        let mut r = converged();
        r.sensitivity = -1;
        assert!(matches!(r.validate(), Err(CheckError::NonPositive { field: "sensitivity", .. })));
    }

    #[test]
    fn test_negative_focus() {
        let mut r = converged();
        r.focus_distance = -0.5;
        assert_eq!(r.validate(), Err(CheckError::NegativeFocusDistance(-0.5)));
    }
}
