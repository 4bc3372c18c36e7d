use crate::backend::RasterSample;
use serde::{Deserialize, Serialize};

/// Tight box around the ink pixels of a raster. Coordinates are inclusive pixel indices with
/// y growing downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelBBox {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

impl PixelBBox {
    pub fn width(&self) -> u32 {
        self.right - self.left + 1
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top + 1
    }

    /// The y coordinate of the lower edge of the bottom ink row.
    pub fn bottom_edge(&self) -> u32 {
        self.bottom + 1
    }
}

/// Returns the bounding box of every pixel with nonzero alpha, or `None` when the raster holds
/// no ink at all.
///
/// Any anti-aliasing coverage counts as ink. The whole buffer is always visited so that disjoint
/// ink regions (the tittle of an `i`) all contribute to the envelope.
pub fn scan(sample: &RasterSample) -> Option<PixelBBox> {
    let width = sample.width() as usize;
    if width == 0 || sample.height() == 0 {
        return None;
    }

    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0u32;
    let mut max_y = 0u32;
    let mut seen = false;

    let row_len = width * RasterSample::CHANNELS;
    for (y, row) in sample.data().chunks_exact(row_len).enumerate() {
        for (x, px) in row.chunks_exact(RasterSample::CHANNELS).enumerate() {
            if px[3] == 0 {
                continue;
            }
            let (x, y) = (x as u32, y as u32);
            seen = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    seen.then_some(PixelBBox {
        top: min_y,
        bottom: max_y,
        left: min_x,
        right: max_x,
    })
}
