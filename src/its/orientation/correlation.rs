use crate::its::capture::ImageBuffer;
use crate::its::common::error::{CheckError, Result};

/// Best placement of a template inside an image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemplateMatch {
    pub x: usize,
    pub y: usize,
    /// Zero-mean normalized cross-correlation in [-1, 1]
    pub score: f64,
}

/// Slides `template` over every placement inside `image` and returns the
/// placement with the highest zero-mean normalized cross-correlation.
///
/// Both buffers must be single-channel. A flat window or template scores 0.
pub fn match_template(image: &ImageBuffer, template: &ImageBuffer) -> Result<TemplateMatch> {
    for buf in [image, template] {
        if buf.channels != 1 {
            return Err(CheckError::ChannelMismatch {
                expected: 1,
                actual: buf.channels,
            });
        }
    }
    let (tw, th) = (template.width, template.height);
    if tw > image.width || th > image.height {
        return Err(CheckError::InvalidDimensions(tw, th));
    }

    let n = (tw * th) as f64;
    let t_mean = template.data.iter().map(|&v| f64::from(v)).sum::<f64>() / n;
    let t_dev: Vec<f64> = template.data.iter().map(|&v| f64::from(v) - t_mean).collect();
    let t_energy: f64 = t_dev.iter().map(|d| d * d).sum();

    let mut best = TemplateMatch {
        x: 0,
        y: 0,
        score: f64::NEG_INFINITY,
    };

    for oy in 0..=image.height - th {
        for ox in 0..=image.width - tw {
            let mut sum = 0.0;
            let mut sum_sq = 0.0;
            let mut cross = 0.0;
            for ty in 0..th {
                let row = (oy + ty) * image.width + ox;
                let window = &image.data[row..row + tw];
                let devs = &t_dev[ty * tw..(ty + 1) * tw];
                for (&v, &d) in window.iter().zip(devs) {
                    let v = f64::from(v);
                    sum += v;
                    sum_sq += v * v;
                    cross += v * d;
                }
            }
            // sum(t_dev) == 0, so the window mean drops out of the cross term
            let w_energy = (sum_sq - sum * sum / n).max(0.0);
            let denom = (w_energy * t_energy).sqrt();
            let score = if denom > f64::EPSILON { cross / denom } else { 0.0 };
            if score > best.score {
                best = TemplateMatch { x: ox, y: oy, score };
            }
        }
    }

    Ok(best)
}
