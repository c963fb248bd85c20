use std::io::Cursor;

use anyhow::Result;
use bayer::{BayerDepth, CFA, Demosaic, RasterDepth, RasterMut};
use tracing::debug;

use crate::its::capture::cfa::CfaPattern;
use crate::its::capture::types::{ImageBuffer, RawCapture};

/// Linear demosaic on the CPU, producing normalized, white-balanced RGB.
pub struct CpuDebayer;

impl CpuDebayer {
    pub fn new() -> Result<Self> {
        Ok(Self)
    }

    pub fn process(&self, raw: &RawCapture) -> Result<ImageBuffer> {
        let (width, height) = (raw.width, raw.height);
        debug!("Starting CPU debayering for image {}x{}", width, height);

        let cfa = match raw.cfa {
            CfaPattern::Rggb => CFA::RGGB,
            CfaPattern::Grbg => CFA::GRBG,
            CfaPattern::Gbrg => CFA::GBRG,
            CfaPattern::Bggr => CFA::BGGR,
        };

        let bayer_bytes: Vec<u8> = raw.data.iter().flat_map(|&v| v.to_le_bytes()).collect();
        let mut output_buf = vec![0u8; width * height * 3 * 2];

        {
            let mut cursor = Cursor::new(&bayer_bytes[..]);
            let mut output_raster = RasterMut::new(width, height, RasterDepth::Depth16, &mut output_buf);
            bayer::run_demosaic(
                &mut cursor,
                BayerDepth::Depth16LE,
                cfa,
                Demosaic::Linear,
                &mut output_raster,
            )
            .map_err(|e| anyhow::anyhow!("Demosaic failed: {:?}", e))?;
        }

        // Mean black level across the tile; white balance relative to green.
        let black = raw.black_levels.iter().map(|&b| f32::from(b)).sum::<f32>() / 4.0;
        let range = (f32::from(raw.white_level) - black).max(1.0);
        let green = if raw.wb_coeffs[1] > 0.0 { raw.wb_coeffs[1] } else { 1.0 };
        let gains = [
            positive_or_one(raw.wb_coeffs[0] / green),
            1.0,
            positive_or_one(raw.wb_coeffs[2] / green),
        ];

        // bayer writes native-endian samples into a Depth16 raster
        let data: Vec<f32> = output_buf
            .chunks_exact(2)
            .enumerate()
            .map(|(i, bytes)| {
                let v = f32::from(u16::from_ne_bytes([bytes[0], bytes[1]]));
                (((v - black).max(0.0) / range) * gains[i % 3]).clamp(0.0, 1.0)
            })
            .collect();

        Ok(ImageBuffer::new(width, height, 3, data)?)
    }
}

fn positive_or_one(gain: f32) -> f32 {
    if gain.is_finite() && gain > 0.0 { gain } else { 1.0 }
}
