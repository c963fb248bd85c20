//! Color filter array layout and Bayer plane extraction.

use std::fmt;

use serde::Deserialize;

use crate::its::capture::types::{ImageBuffer, RawCapture};
use crate::its::common::error::{CheckError, Result};

/// 2x2 Bayer arrangement, named row-major from the top-left pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum CfaPattern {
    Rggb,
    Grbg,
    Gbrg,
    Bggr,
}

/// Canonical raw channel, in the order checks iterate them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BayerChannel {
    R,
    Gr,
    Gb,
    B,
}

impl BayerChannel {
    pub const ALL: [BayerChannel; 4] = [Self::R, Self::Gr, Self::Gb, Self::B];

    pub fn index(self) -> usize {
        match self {
            Self::R => 0,
            Self::Gr => 1,
            Self::Gb => 2,
            Self::B => 3,
        }
    }
}

impl fmt::Display for BayerChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::R => "R",
            Self::Gr => "GR",
            Self::Gb => "GB",
            Self::B => "B",
        };
        f.write_str(name)
    }
}

impl CfaPattern {
    /// Pattern position (row-major within the 2x2 tile) of each canonical
    /// channel R, Gr, Gb, B. Gr is the green sharing a row with red.
    pub fn canonical_order(self) -> [usize; 4] {
        match self {
            Self::Rggb => [0, 1, 2, 3],
            Self::Grbg => [1, 0, 3, 2],
            Self::Gbrg => [2, 3, 0, 1],
            Self::Bggr => [3, 2, 1, 0],
        }
    }

    /// Position of `channel` within the 2x2 tile.
    pub fn position_of(self, channel: BayerChannel) -> usize {
        self.canonical_order()[channel.index()]
    }

    /// Builds a pattern from per-position colors (0 = red, 1 = green, 2 = blue).
    pub fn from_colors(colors: [usize; 4]) -> Option<Self> {
        match colors {
            [0, 1, 1, 2] => Some(Self::Rggb),
            [1, 0, 2, 1] => Some(Self::Grbg),
            [1, 2, 0, 1] => Some(Self::Gbrg),
            [2, 1, 1, 0] => Some(Self::Bggr),
            _ => None,
        }
    }
}

/// Splits a mosaic into four quarter-resolution planes ordered R, Gr, Gb, B.
///
/// Samples are divided by the white level, so a plane multiplied by
/// `white_level` yields raw digital numbers again.
pub fn split_planes(raw: &RawCapture) -> Result<Vec<ImageBuffer>> {
    let pw = raw.width / 2;
    let ph = raw.height / 2;
    if pw == 0 || ph == 0 || raw.data.len() < raw.width * raw.height {
        return Err(CheckError::InvalidDimensions(raw.width, raw.height));
    }
    let white = f32::from(raw.white_level.max(1));

    BayerChannel::ALL
        .iter()
        .map(|&channel| {
            let pos = raw.cfa.position_of(channel);
            let (dy, dx) = (pos / 2, pos % 2);
            let mut data = Vec::with_capacity(pw * ph);
            for y in 0..ph {
                let row = (2 * y + dy) * raw.width;
                for x in 0..pw {
                    data.push(f32::from(raw.data[row + 2 * x + dx]) / white);
                }
            }
            ImageBuffer::gray(pw, ph, data)
        })
        .collect()
}

/// Black level of a canonical channel.
pub fn black_level_for(raw: &RawCapture, channel: BayerChannel) -> u16 {
    raw.black_levels[raw.cfa.position_of(channel)]
}
