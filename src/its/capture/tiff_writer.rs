use std::io::Write;
use std::path::Path;

use tiff::encoder::{TiffEncoder, colortype};
use tracing::debug;

use crate::its::capture::types::ImageBuffer;
use crate::its::common::error::CaptureError;

/// Writes normalized buffers as 16 bit TIFF, used for debug dumps.
pub struct TiffImageWriter;

impl TiffImageWriter {
    pub fn write(&self, image: &ImageBuffer, output: &mut dyn Write) -> Result<(), CaptureError> {
        debug!(
            "Encoding TIFF image: {}x{}x{}",
            image.width, image.height, image.channels
        );

        let samples: Vec<u16> = image
            .data
            .iter()
            .map(|&v| (v.clamp(0.0, 1.0) * 65535.0).round() as u16)
            .collect();

        let mut buffer = Vec::new();
        {
            let mut encoder = TiffEncoder::new(std::io::Cursor::new(&mut buffer))
                .map_err(|e| CaptureError::EncodeError(e.to_string()))?;
            let (w, h) = (image.width as u32, image.height as u32);

            let written = match image.channels {
                1 => encoder.write_image::<colortype::Gray16>(w, h, &samples),
                3 => encoder.write_image::<colortype::RGB16>(w, h, &samples),
                n => {
                    return Err(CaptureError::UnsupportedFormat(format!("{} channels", n)));
                }
            };
            written.map_err(|e| CaptureError::EncodeError(e.to_string()))?;
        }

        output.write_all(&buffer)?;
        Ok(())
    }

    pub fn write_file<P: AsRef<Path>>(&self, image: &ImageBuffer, path: P) -> Result<(), CaptureError> {
        let path = path.as_ref();
        let mut file = std::fs::File::create(path)
            .map_err(|e| CaptureError::OutputWriteError(format!("{}: {}", path.display(), e)))?;
        self.write(image, &mut file)
    }
}
