//! Patch statistics
//!
//! Rectangular patch extraction, per-channel moments and burst consistency.

mod burst;
mod moments;
mod patch;

pub use burst::{BurstConsistency, BurstReport, ChannelSpread};
pub use moments::{channel_means, channel_variances};
pub use patch::Patch;
