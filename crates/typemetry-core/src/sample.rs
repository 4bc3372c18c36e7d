//! Glyph sampling: size the offscreen canvas, rasterize, scan.

use crate::backend::{BaselineMode, RasterSample, Rasterizer};
use crate::font::FontSpec;
use crate::options::MeasureOptions;
use crate::scan::{self, PixelBBox};
use crate::{Error, Result};

/// Canvas dimensions for one glyph string at one size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    /// `width >= chars * size * width_factor`, `height >= size * height_factor`.
    ///
    /// The height is rounded up to an even number of pixels so the anchor row `height / 2`
    /// falls exactly on a pixel boundary.
    pub fn for_text(text: &str, size: f64, options: &MeasureOptions) -> Self {
        let chars = text.chars().count().max(1) as f64;
        let width = (chars * size * options.canvas_width_factor).ceil().max(1.0) as u32;
        let mut height = (size * options.canvas_height_factor).ceil().max(2.0) as u32;
        if height % 2 == 1 {
            height += 1;
        }
        Self { width, height }
    }
}

/// A scanned glyph together with the anchor row it was drawn on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphSample {
    pub bbox: PixelBBox,
    pub anchor_y: f64,
}

impl GlyphSample {
    /// Distance of the top ink edge above the anchor, in pixels.
    pub fn top(&self) -> f64 {
        self.anchor_y - f64::from(self.bbox.top)
    }

    /// Distance of the bottom ink edge above the anchor (negative below it), in pixels.
    pub fn bottom(&self) -> f64 {
        self.anchor_y - f64::from(self.bbox.bottom_edge())
    }

    pub fn height(&self) -> f64 {
        f64::from(self.bbox.height())
    }
}

pub struct GlyphSampler<'a> {
    rasterizer: &'a dyn Rasterizer,
    options: &'a MeasureOptions,
}

impl<'a> GlyphSampler<'a> {
    pub fn new(rasterizer: &'a dyn Rasterizer, options: &'a MeasureOptions) -> Self {
        Self {
            rasterizer,
            options,
        }
    }

    /// Renders `text` on a canvas large enough to hold its ink without clipping.
    pub fn rasterize(
        &self,
        font: &FontSpec,
        text: &str,
        baseline: BaselineMode,
    ) -> Result<RasterSample> {
        let canvas = CanvasSize::for_text(text, font.size, self.options);
        tracing::trace!(
            text,
            %baseline,
            width = canvas.width,
            height = canvas.height,
            "rasterizing glyph sample"
        );
        let raster = self
            .rasterizer
            .rasterize(text, font, baseline, canvas.width, canvas.height)?;
        if raster.width() != canvas.width || raster.height() != canvas.height {
            return Err(Error::backend(format!(
                "backend returned a {}x{} raster for a {}x{} canvas",
                raster.width(),
                raster.height(),
                canvas.width,
                canvas.height
            )));
        }
        Ok(raster)
    }

    /// Rasterizes and scans one `(text, baseline)` pair. The raster is dropped once its box is
    /// known.
    pub fn sample(
        &self,
        font: &FontSpec,
        text: &str,
        baseline: BaselineMode,
    ) -> Result<GlyphSample> {
        let raster = self.rasterize(font, text, baseline)?;
        let anchor_y = raster.anchor_y();
        match scan::scan(&raster) {
            Some(bbox) => Ok(GlyphSample { bbox, anchor_y }),
            None => Err(Error::GlyphNotRenderable {
                text: text.to_string(),
                baseline,
            }),
        }
    }
}
