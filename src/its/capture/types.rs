//! Capture data types

use crate::its::capture::cfa::CfaPattern;
use crate::its::common::error::{CheckError, Result};
use crate::its::noise_model::NoiseProfile;

/// Interleaved pixel buffer with samples normalized to [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub data: Vec<f32>,
}

impl ImageBuffer {
    pub fn new(width: usize, height: usize, channels: usize, data: Vec<f32>) -> Result<Self> {
        if width == 0 || height == 0 || channels == 0 {
            return Err(CheckError::InvalidDimensions(width, height));
        }
        if data.len() != width * height * channels {
            return Err(CheckError::InvalidDimensions(width, height));
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Single-channel buffer.
    pub fn gray(width: usize, height: usize, data: Vec<f32>) -> Result<Self> {
        Self::new(width, height, 1, data)
    }

    /// Buffer where every sample holds `value`.
    pub fn filled(width: usize, height: usize, channels: usize, value: f32) -> Result<Self> {
        Self::new(width, height, channels, vec![value; width * height * channels])
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, c: usize) -> f32 {
        self.data[(y * self.width + x) * self.channels + c]
    }

    /// BT.601 luma for RGB buffers; single-channel buffers are returned as-is.
    pub fn to_luma(&self) -> Result<ImageBuffer> {
        match self.channels {
            1 => Ok(self.clone()),
            3 => {
                let data = self
                    .data
                    .chunks_exact(3)
                    .map(|px| 0.299 * px[0] + 0.587 * px[1] + 0.114 * px[2])
                    .collect();
                ImageBuffer::gray(self.width, self.height, data)
            }
            n => Err(CheckError::ChannelMismatch {
                expected: 3,
                actual: n,
            }),
        }
    }

    /// Smallest and largest sample over all channels.
    pub fn min_max(&self) -> (f32, f32) {
        self.data
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }

    /// Top-left `width` x `height` window.
    pub fn truncate(&self, width: usize, height: usize) -> Result<ImageBuffer> {
        let width = width.min(self.width);
        let height = height.min(self.height);
        let mut data = Vec::with_capacity(width * height * self.channels);
        for y in 0..height {
            let start = y * self.width * self.channels;
            data.extend_from_slice(&self.data[start..start + width * self.channels]);
        }
        ImageBuffer::new(width, height, self.channels, data)
    }
}

/// Undemosaiced sensor readout.
#[derive(Debug, Clone)]
pub struct RawCapture {
    pub width: usize,
    pub height: usize,
    /// Single channel Bayer mosaic, row-major
    pub data: Vec<u16>,
    pub cfa: CfaPattern,
    /// Black level per 2x2 pattern position (row-major)
    pub black_levels: [u16; 4],
    pub white_level: u16,
    /// White balance coefficients (R, G, B, E)
    pub wb_coeffs: [f32; 4],
}

/// Per-frame capture result metadata.
#[derive(Debug, Clone, Default)]
pub struct CaptureMetadata {
    pub sensitivity: i32,
    pub exposure_ns: i64,
    pub timestamp_ns: i64,
    /// Noise model coefficients in CFA pattern order
    pub noise_profile: Vec<NoiseProfile>,
}

/// A processed frame and the metadata it was captured with.
#[derive(Debug, Clone)]
pub struct Capture {
    pub image: ImageBuffer,
    pub metadata: CaptureMetadata,
}
