use std::path::PathBuf;

use tracing::{debug, info, info_span, warn};

use crate::its::capture::{ImageBuffer, TiffImageWriter};
use crate::its::common::error::{CheckError, Result};
use crate::its::config::OrientationConfig;
use crate::its::orientation::{Orientation, match_template};

#[derive(Debug, Clone)]
pub struct OrientationReport {
    /// Correlation per candidate, in `Orientation::ALL` order
    pub scores: [(Orientation, f64); 4],
    pub best: Orientation,
}

impl OrientationReport {
    pub fn score(&self, orientation: Orientation) -> f64 {
        self.scores
            .iter()
            .find(|(o, _)| *o == orientation)
            .map(|(_, s)| *s)
            .unwrap_or(f64::NEG_INFINITY)
    }

    pub fn max_score(&self) -> f64 {
        self.scores.iter().map(|(_, s)| *s).fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Flip/mirror check of a located chart against its template.
pub struct OrientationCheck {
    config: OrientationConfig,
    debug_dir: Option<PathBuf>,
}

impl OrientationCheck {
    pub fn new(config: OrientationConfig) -> Self {
        Self {
            config,
            debug_dir: None,
        }
    }

    /// Dumps the compared patch under every orientation into `dir`.
    pub fn with_debug_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.debug_dir = Some(dir.into());
        self
    }

    /// Converts both inputs to gray, rejects a featureless chart patch and
    /// crops both to the comparison region with matching dimensions.
    pub fn prepare(
        &self,
        chart_patch: &ImageBuffer,
        template: &ImageBuffer,
    ) -> Result<(ImageBuffer, ImageBuffer)> {
        let patch = chart_patch.to_luma()?;
        let template = template.to_luma()?;

        let (lo, hi) = patch.min_max();
        let range = f64::from(hi - lo);
        if range < self.config.content_thresh {
            return Err(CheckError::NoPatchContent {
                range,
                threshold: self.config.content_thresh,
            });
        }

        let region = &self.config.compare_region;
        let template = template.patch(region)?;
        let patch = patch.patch(region)?;
        let patch = patch.truncate(template.width, template.height)?;
        let template = template.truncate(patch.width, patch.height)?;
        Ok((patch, template))
    }

    /// Correlation of every orientation of `patch` against `template`.
    pub fn score(&self, patch: &ImageBuffer, template: &ImageBuffer) -> Result<OrientationReport> {
        let mut scores = [(Orientation::Nominal, 0.0); 4];
        for (slot, orientation) in scores.iter_mut().zip(Orientation::ALL) {
            let candidate = orientation.apply(patch);
            if let Some(dir) = &self.debug_dir {
                let path = dir.join(format!("orientation_{}.tiff", orientation));
                if let Err(e) = TiffImageWriter.write_file(&candidate, &path) {
                    warn!("Could not write {}: {}", path.display(), e);
                }
            }
            let score = match_template(&candidate, template)?.score;
            debug!("{} correlation value: {:.4}", orientation, score);
            *slot = (orientation, score);
        }

        // First maximum in evaluation order
        let best = scores
            .iter()
            .fold(scores[0], |best, &cur| if cur.1 > best.1 { cur } else { best })
            .0;
        Ok(OrientationReport { scores, best })
    }

    /// Fails unless nominal or 180 degree rotation correlates best.
    pub fn check(&self, chart_patch: &ImageBuffer, template: &ImageBuffer) -> Result<OrientationReport> {
        let (patch, template) = {
            let _span = info_span!("prepare_orientation").entered();
            self.prepare(chart_patch, template)?
        };
        let report = {
            let _span = info_span!("match_orientations", width = patch.width, height = patch.height)
                .entered();
            self.score(&patch, &template)?
        };

        let max = report.max_score();
        let upright = report
            .scores
            .iter()
            .any(|&(o, s)| o.is_rotation() && s == max);
        if !upright {
            return Err(CheckError::OrientationMismatch(report.best.to_string()));
        }
        if report.score(Orientation::Rotate) == max {
            warn!("Image is rotated 180 degrees. Tablet might be rotated.");
        }
        info!(best = %report.best, "Orientation check passed");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart(w: usize, h: usize) -> ImageBuffer {
        // Asymmetric under every flip: bright block top-left, ramp along x.
        let data = (0..w * h)
            .map(|i| {
                let (x, y) = (i % w, i / w);
                let block = if x < w / 3 && y < h / 3 { 0.6 } else { 0.0 };
                block + 0.3 * x as f32 / w as f32 + 0.1 * y as f32 / h as f32
            })
            .collect();
        ImageBuffer::gray(w, h, data).unwrap()
    }

    fn check() -> OrientationCheck {
        OrientationCheck::new(OrientationConfig::default())
    }

    #[test]
    fn test_template_against_itself_is_nominal() {
        let template = chart(40, 32);
        let report = check().check(&template, &template).unwrap();
        assert_eq!(report.best, Orientation::Nominal);
        assert!((report.score(Orientation::Nominal) - 1.0).abs() < 1e-9);
        assert_eq!(report.max_score(), report.score(Orientation::Nominal));
    }

    #[test]
    fn test_rotated_capture_passes() {
        let template = chart(40, 32);
        let captured = Orientation::Rotate.apply(&template);
        let report = check().check(&captured, &template).unwrap();
        assert_eq!(report.best, Orientation::Rotate);
    }

    #[test]
    fn test_mirrored_capture_fails() {
        let template = chart(40, 32);
        let captured = Orientation::Mirror.apply(&template);
        let err = check().check(&captured, &template).unwrap_err();
        assert_eq!(err, CheckError::OrientationMismatch("mirror".to_string()));
    }

    #[test]
    fn test_flipped_capture_fails() {
        let template = chart(40, 32);
        let captured = Orientation::Flip.apply(&template);
        let err = check().check(&captured, &template).unwrap_err();
        assert_eq!(err, CheckError::OrientationMismatch("flip".to_string()));
    }

    #[test]
    fn test_featureless_patch_rejected() {
        let template = chart(40, 32);
        let flat = ImageBuffer::filled(40, 32, 1, 0.4).unwrap();
        assert!(matches!(
            check().check(&flat, &template),
            Err(CheckError::NoPatchContent { .. })
        ));
    }

    #[test]
    fn test_rgb_capture_is_converted_to_gray() {
        let template = chart(40, 32);
        let rgb_data = template.data.iter().flat_map(|&v| [v, v, v]).collect();
        let rgb = ImageBuffer::new(40, 32, 3, rgb_data).unwrap();
        let report = check().check(&rgb, &template).unwrap();
        assert_eq!(report.best, Orientation::Nominal);
    }

    #[test]
    fn test_debug_dump_writes_candidates() {
        let dir = tempfile::tempdir().unwrap();
        let template = chart(40, 32);
        check().with_debug_dir(dir.path()).check(&template, &template).unwrap();
        for o in Orientation::ALL {
            assert!(dir.path().join(format!("orientation_{}.tiff", o)).exists());
        }
    }
}
