//! Camera image test checks
//!
//! Numeric pass/fail checks run over captured frames: patch statistics and
//! burst consistency, raw noise-model validation, chart orientation and
//! multi-camera frame synchronization. Device control is left to the caller;
//! every check takes buffers in and returns a report or a `CheckError`.

pub mod capture;
pub mod common;
pub mod config;
pub mod frame_sync;
pub mod noise_model;
pub mod orientation;
pub mod stats;
pub mod suite;
pub mod three_a;

pub use common::{CaptureError, CheckError, Result};

pub use capture::{
    BayerChannel, Capture, CaptureMetadata, CfaPattern, CpuDebayer, ImageBuffer, ImageReader,
    RawCapture, RawCaptureReader, RawLoaderReader, TiffImageReader, TiffImageWriter,
};

pub use config::{
    BurstConfig, ClippingPolicy, FrameSyncConfig, ItsConfig, NoiseModelConfig, OrientationConfig,
};

pub use frame_sync::{AnglePair, FrameSyncCheck, FrameSyncReport, SyncCalibration};
pub use noise_model::{NoiseModelCheck, NoiseModelReport, NoiseProfile};
pub use orientation::{Orientation, OrientationCheck, OrientationReport};
pub use stats::{BurstConsistency, BurstReport, Patch, channel_means, channel_variances};
pub use three_a::ThreeAResult;
