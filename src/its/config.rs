//! Check configuration
//!
//! Threshold sets for every check, with the suite's constants as defaults.
//! Overrides can be loaded from a JSON file; absent keys keep their default.

mod types;

pub use types::{
    BurstConfig, BurstConfigBuilder, ClippingPolicy, FrameSyncConfig, FrameSyncConfigBuilder,
    ItsConfig, NoiseModelConfig, NoiseModelConfigBuilder, OrientationConfig,
};
