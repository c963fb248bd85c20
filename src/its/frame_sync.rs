//! Multi-camera frame synchronization
//!
//! Two physical cameras watch the same rotating chart. Per frame pair, the
//! chart angle seen by each camera should agree to within a tolerance that
//! depends on how the device's timestamps are sourced.

mod angles;
mod check;

pub use angles::{
    AnglePair, angular_diff_threshold, assert_angular_difference, assert_camera_movement,
    mask_angles_near_extremes, max_frame_to_frame_shift, remove_frames_without_angles,
};
pub use check::{FrameSyncCheck, FrameSyncReport, SyncCalibration};
