//! Raw capture reader backed by the rawloader library.
//!
//! Any format rawloader can decode (DNG, ARW, CR2, NEF, ...) is accepted as
//! long as it carries a single-channel 2x2 Bayer mosaic.

use std::io::Cursor;

use rawloader::RawImageData as RawloaderImageData;
use tracing::debug;

use crate::its::capture::cfa::CfaPattern;
use crate::its::capture::reader::RawCaptureReader;
use crate::its::capture::types::RawCapture;
use crate::its::common::error::CaptureError;

pub struct RawLoaderReader;

impl RawCaptureReader for RawLoaderReader {
    /// Decodes a raw file into a mosaic plus its sensor levels.
    ///
    /// Float mosaics (normalized 0.0-1.0) are rescaled to the u16 range and
    /// the white level is reported as `u16::MAX` for them.
    fn read_raw(&self, data: &[u8]) -> Result<RawCapture, CaptureError> {
        debug!("Decoding raw capture, {} bytes", data.len());

        let decoded = rawloader::decode(&mut Cursor::new(data))
            .map_err(|e| CaptureError::DecodeError(e.to_string()))?;

        if decoded.cpp != 1 {
            return Err(CaptureError::UnsupportedFormat(format!(
                "{} components per pixel",
                decoded.cpp
            )));
        }

        let colors = [
            decoded.cfa.color_at(0, 0),
            decoded.cfa.color_at(0, 1),
            decoded.cfa.color_at(1, 0),
            decoded.cfa.color_at(1, 1),
        ];
        let cfa = CfaPattern::from_colors(colors).ok_or_else(|| {
            CaptureError::UnsupportedFormat(format!("CFA {}", decoded.cfa.name))
        })?;

        let (data, white_level) = match decoded.data {
            RawloaderImageData::Integer(values) => {
                let white = decoded.whitelevels.iter().max().copied().unwrap_or(u16::MAX);
                (values, white)
            }
            RawloaderImageData::Float(values) => {
                let scaled = values
                    .iter()
                    .map(|&v| (v.clamp(0.0, 1.0) * f32::from(u16::MAX)) as u16)
                    .collect();
                (scaled, u16::MAX)
            }
        };

        if decoded.width == 0 || decoded.height == 0 {
            return Err(CaptureError::InvalidDimensions(decoded.width, decoded.height));
        }

        debug!(
            width = decoded.width,
            height = decoded.height,
            ?cfa,
            white_level,
            "Decoded raw capture"
        );

        Ok(RawCapture {
            width: decoded.width,
            height: decoded.height,
            data,
            cfa,
            black_levels: decoded.blacklevels,
            white_level,
            wb_coeffs: decoded.wb_coeffs,
        })
    }
}
