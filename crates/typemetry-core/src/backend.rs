//! The rasterization seam.
//!
//! The engine never draws glyphs itself. A [`Rasterizer`] renders text into an RGBA buffer and
//! optionally answers native font-metric queries; everything else is measured from pixels.

use crate::font::FontSpec;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Vertical anchor used to position text, with canvas `textBaseline` semantics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaselineMode {
    #[default]
    Alphabetic,
    /// The anchor is the top of the em box.
    Top,
    /// The anchor is the bottom of the em box.
    Bottom,
}

impl BaselineMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Alphabetic => "alphabetic",
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }
}

impl fmt::Display for BaselineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BaselineMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "alphabetic" => Ok(Self::Alphabetic),
            "top" => Ok(Self::Top),
            "bottom" => Ok(Self::Bottom),
            _ => Err(Error::InvalidOptions {
                message: format!("unrecognized baseline mode {s:?}"),
            }),
        }
    }
}

/// One rendered glyph string: `width * height` RGBA pixels, row-major, alpha in the 4th channel.
#[derive(Clone, PartialEq, Eq)]
pub struct RasterSample {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl RasterSample {
    pub const CHANNELS: usize = 4;

    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = (width as usize) * (height as usize) * Self::CHANNELS;
        if data.len() != expected {
            return Err(Error::backend(format!(
                "pixel buffer has {} bytes, expected {expected} for {width}x{height} RGBA",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A fully transparent buffer.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width as usize) * (height as usize) * Self::CHANNELS],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn alpha_at(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * Self::CHANNELS;
        self.data.get(i + 3).copied()
    }

    /// The fixed reference row all texts are drawn at (`height / 2`).
    pub fn anchor_y(&self) -> f64 {
        f64::from(self.height) / 2.0
    }
}

impl fmt::Debug for RasterSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterSample")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Font bounding box reported by the backend itself, in pixels relative to the alphabetic
/// baseline (positive above, negative below).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NativeBBox {
    pub top: f64,
    pub bottom: f64,
}

impl NativeBBox {
    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }
}

/// A text rasterization backend.
///
/// `rasterize` must draw `text` horizontally centred at `width / 2` with its `baseline` anchor
/// on row `height / 2`, filling ink with nonzero alpha on an otherwise transparent canvas.
/// Implementations must be deterministic for identical inputs.
pub trait Rasterizer {
    fn rasterize(
        &self,
        text: &str,
        font: &FontSpec,
        baseline: BaselineMode,
        width: u32,
        height: u32,
    ) -> Result<RasterSample>;

    /// Ascent/descent of the font's own bounding box at `font.size`, if the backend exposes it.
    fn native_font_bounding_box(&self, _font: &FontSpec) -> Result<Option<NativeBBox>> {
        Ok(None)
    }

    /// Natural (`line-height: normal`) line-box height in pixels at `reference_size`.
    fn native_line_height(&self, _font: &FontSpec, _reference_size: f64) -> Result<Option<f64>> {
        Ok(None)
    }
}
