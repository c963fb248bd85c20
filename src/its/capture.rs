//! Capture module
//!
//! Image buffers, raw Bayer captures and the readers/writers that move them
//! across the filesystem boundary.

mod cfa;
mod debayer;
mod rawloader_reader;
mod reader;
mod tiff_reader;
mod tiff_writer;
pub mod types;

pub use cfa::{BayerChannel, CfaPattern, black_level_for, split_planes};
pub use debayer::CpuDebayer;
pub use rawloader_reader::RawLoaderReader;
pub use reader::{ImageReader, RawCaptureReader};
pub use tiff_reader::TiffImageReader;
pub use tiff_writer::TiffImageWriter;
pub use types::{Capture, CaptureMetadata, ImageBuffer, RawCapture};
