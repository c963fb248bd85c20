use thiserror::Error;

/// Assertion failures raised by the numeric checks.
///
/// Every variant renders the measured value(s) next to the bound that was violated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CheckError {
    #[error("{field} has unexpected # of terms! expected: {expected}, found: {actual}")]
    MetadataLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{field} value {value} is not a number!")]
    NotANumber { field: &'static str, value: f64 },

    #[error("{field} {value} <= 0!")]
    NonPositive { field: &'static str, value: f64 },

    #[error("focus distance {0} < 0!")]
    NegativeFocusDistance(f64),

    #[error("{channel} center patch spread: {spread:.5}, THRESH: {threshold:.2}")]
    SpreadOverThreshold {
        channel: String,
        spread: f64,
        threshold: f64,
    },

    #[error("{channel} frame {frame} too dark! mean: {mean:.5}, THRESH: {threshold}")]
    TooDark {
        channel: String,
        frame: usize,
        mean: f64,
        threshold: f64,
    },

    #[error("Empty burst: {frames} frame(s), {channels} channel(s)")]
    EmptyBurst { frames: usize, channels: usize },

    #[error("{channel} model variance = {variance:.3e}!")]
    ModelVarianceNearZero { channel: String, variance: f64 },

    #[error(
        "Pixel distribution crosses 0. Likely black level over-clips. Linear model is not valid. \
         mean: {mean:.3e}, var: {variance:.3e}, u-3s: {mean_minus_3sigma:.3e}"
    )]
    DistributionCrossesZero {
        mean: f64,
        variance: f64,
        mean_minus_3sigma: f64,
    },

    #[error("{channel} var diff: {diff:.5}, thresh: {threshold:.4}")]
    VarianceOverThreshold {
        channel: String,
        diff: f64,
        threshold: f64,
    },

    #[error("Unable to identify enough frames with detected squares. Found: {found}, THRESH: {threshold}.")]
    NotEnoughFrames { found: usize, threshold: usize },

    #[error("Not enough phone movement! All angle pairs masked out by 0/90 angle removal.")]
    AllAnglesMasked,

    #[error("Not enough phone movement! min angle: {min:.2}, max angle: {max:.2}, THRESH: {threshold} deg")]
    NotEnoughMovement { min: f64, max: f64, threshold: f64 },

    #[error("Optimum orientation is {0}")]
    OrientationMismatch(String),

    #[error("Image patch has no content! range: {range:.4}, THRESH: {threshold:.4}. Check setup.")]
    NoPatchContent { range: f64, threshold: f64 },

    #[error(
        "Too much difference between cameras! Angle 1: {angle_1:.2}, 2: {angle_2:.2}, \
         diff: {diff:.3}, TOL: {threshold}."
    )]
    AngularDifferenceOverThreshold {
        angle_1: f64,
        angle_2: f64,
        diff: f64,
        threshold: f64,
    },

    #[error("Invalid patch: x={x}, y={y}, w={w}, h={h}")]
    InvalidPatch { x: f64, y: f64, w: f64, h: f64 },

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Channel count mismatch: expected {expected}, found {actual}")]
    ChannelMismatch { expected: usize, actual: usize },
}

/// Failures while loading captures or chart templates.
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Failed to read input file: {0}")]
    InputReadError(String),

    #[error("Failed to write output file: {0}")]
    OutputWriteError(String),

    #[error("Failed to decode image: {0}")]
    DecodeError(String),

    #[error("Failed to encode TIFF image: {0}")]
    EncodeError(String),

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CheckError>;
