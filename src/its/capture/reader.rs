use std::path::Path;

use crate::its::capture::types::{ImageBuffer, RawCapture};
use crate::its::common::error::CaptureError;

pub trait RawCaptureReader {
    fn read_raw(&self, data: &[u8]) -> Result<RawCapture, CaptureError>;

    fn read_raw_file(&self, path: &Path) -> Result<RawCapture, CaptureError> {
        let data = std::fs::read(path)
            .map_err(|e| CaptureError::InputReadError(format!("{}: {}", path.display(), e)))?;
        self.read_raw(&data)
    }
}

pub trait ImageReader {
    fn read_image(&self, data: &[u8]) -> Result<ImageBuffer, CaptureError>;

    fn read_image_file(&self, path: &Path) -> Result<ImageBuffer, CaptureError> {
        let data = std::fs::read(path)
            .map_err(|e| CaptureError::InputReadError(format!("{}: {}", path.display(), e)))?;
        self.read_image(&data)
    }
}
