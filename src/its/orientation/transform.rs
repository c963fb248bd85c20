use std::fmt;

use crate::its::capture::ImageBuffer;

/// Candidate geometric transforms, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Nominal,
    /// Upside down (rows reversed)
    Flip,
    /// Left-right (columns reversed)
    Mirror,
    /// 180 degree rotation
    Rotate,
}

impl Orientation {
    pub const ALL: [Orientation; 4] = [Self::Nominal, Self::Flip, Self::Mirror, Self::Rotate];

    /// Orientations that only differ from nominal by a rigid rotation.
    pub fn is_rotation(self) -> bool {
        matches!(self, Self::Nominal | Self::Rotate)
    }

    pub fn apply(self, image: &ImageBuffer) -> ImageBuffer {
        let (w, h, c) = (image.width, image.height, image.channels);
        let (flip_rows, flip_cols) = match self {
            Self::Nominal => return image.clone(),
            Self::Flip => (true, false),
            Self::Mirror => (false, true),
            Self::Rotate => (true, true),
        };

        let mut data = Vec::with_capacity(image.data.len());
        for y in 0..h {
            let sy = if flip_rows { h - 1 - y } else { y };
            for x in 0..w {
                let sx = if flip_cols { w - 1 - x } else { x };
                let start = (sy * w + sx) * c;
                data.extend_from_slice(&image.data[start..start + c]);
            }
        }
        ImageBuffer {
            width: w,
            height: h,
            channels: c,
            data,
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Nominal => "nominal",
            Self::Flip => "flip",
            Self::Mirror => "mirror",
            Self::Rotate => "rotate",
        };
        f.write_str(name)
    }
}
