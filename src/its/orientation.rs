//! Orientation detection
//!
//! Decides whether a captured chart is flipped or mirrored by correlating
//! it against the chart template under each candidate transform.

mod correlation;
mod detector;
mod transform;

pub use correlation::{TemplateMatch, match_template};
pub use detector::{OrientationCheck, OrientationReport};
pub use transform::Orientation;
