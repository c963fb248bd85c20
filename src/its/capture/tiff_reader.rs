use std::io::Cursor;

use tiff::ColorType;
use tiff::decoder::{Decoder, DecodingResult};
use tracing::debug;

use crate::its::capture::reader::ImageReader;
use crate::its::capture::types::ImageBuffer;
use crate::its::common::error::CaptureError;

/// Reads 8 or 16 bit gray/RGB TIFF files, such as chart templates.
pub struct TiffImageReader;

impl ImageReader for TiffImageReader {
    fn read_image(&self, data: &[u8]) -> Result<ImageBuffer, CaptureError> {
        let decode_err = |e: tiff::TiffError| CaptureError::DecodeError(e.to_string());

        let mut decoder = Decoder::new(Cursor::new(data)).map_err(decode_err)?;
        let (width, height) = decoder.dimensions().map_err(decode_err)?;
        let channels = match decoder.colortype().map_err(decode_err)? {
            ColorType::Gray(8) | ColorType::Gray(16) => 1,
            ColorType::RGB(8) | ColorType::RGB(16) => 3,
            other => {
                return Err(CaptureError::UnsupportedFormat(format!("{:?}", other)));
            }
        };

        debug!("Decoding TIFF image: {}x{}x{}", width, height, channels);

        let samples: Vec<f32> = match decoder.read_image().map_err(decode_err)? {
            DecodingResult::U8(values) => values.iter().map(|&v| f32::from(v) / 255.0).collect(),
            DecodingResult::U16(values) => {
                values.iter().map(|&v| f32::from(v) / 65535.0).collect()
            }
            _ => {
                return Err(CaptureError::UnsupportedFormat(
                    "sample type other than u8/u16".to_string(),
                ));
            }
        };

        let (width, height) = (width as usize, height as usize);
        ImageBuffer::new(width, height, channels, samples)
            .map_err(|_| CaptureError::InvalidDimensions(width, height))
    }
}
