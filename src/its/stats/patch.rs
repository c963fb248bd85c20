use serde::Deserialize;

use crate::its::capture::ImageBuffer;
use crate::its::common::error::{CheckError, Result};

/// Normalized rectangle; all fields are fractions of the full image size.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Patch {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Patch {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle of the given size centered in the image.
    pub fn centered(w: f64, h: f64) -> Self {
        Self::new(0.5 - w / 2.0, 0.5 - h / 2.0, w, h)
    }

    fn validate(&self) -> Result<()> {
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        let ok = in_unit(self.x)
            && in_unit(self.y)
            && self.w > 0.0
            && self.h > 0.0
            && self.x + self.w <= 1.0 + f64::EPSILON
            && self.y + self.h <= 1.0 + f64::EPSILON;
        if ok {
            Ok(())
        } else {
            Err(self.invalid())
        }
    }

    fn invalid(&self) -> CheckError {
        CheckError::InvalidPatch {
            x: self.x,
            y: self.y,
            w: self.w,
            h: self.h,
        }
    }

    /// Pixel window `(x0, y0, width, height)` inside a `full_w` x `full_h` image.
    ///
    /// The origin rounds up and the extent rounds down, so the window never
    /// reaches outside the normalized rectangle.
    pub fn pixel_window(&self, full_w: usize, full_h: usize) -> Result<(usize, usize, usize, usize)> {
        self.validate()?;
        let x0 = (self.x * full_w as f64).ceil() as usize;
        let y0 = (self.y * full_h as f64).ceil() as usize;
        let w = (self.w * full_w as f64).floor() as usize;
        let h = (self.h * full_h as f64).floor() as usize;
        let w = w.min(full_w.saturating_sub(x0));
        let h = h.min(full_h.saturating_sub(y0));
        if w == 0 || h == 0 {
            return Err(self.invalid());
        }
        Ok((x0, y0, w, h))
    }
}

impl ImageBuffer {
    /// Copies the pixels covered by `patch`, all channels.
    pub fn patch(&self, patch: &Patch) -> Result<ImageBuffer> {
        let (x0, y0, w, h) = patch.pixel_window(self.width, self.height)?;
        let mut data = Vec::with_capacity(w * h * self.channels);
        for y in y0..y0 + h {
            let start = (y * self.width + x0) * self.channels;
            data.extend_from_slice(&self.data[start..start + w * self.channels]);
        }
        ImageBuffer::new(w, h, self.channels, data)
    }
}
