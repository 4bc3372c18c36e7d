#![forbid(unsafe_code)]

//! Rasterization-based font metrics.
//!
//! Instead of trusting the tables embedded in a font file, `typemetry` renders a small battery
//! of reference glyphs (`x`, `d`, `p`, `H`, `1`, `i`, `O`, `A`) to offscreen rasters, scans their
//! ink, and derives size-normalized vertical metrics from the pixel boxes.
//!
//! Design goals:
//! - backend-agnostic: rendering is behind the [`Rasterizer`] trait
//! - partial failure: a missing reference glyph blanks only the fields that depend on it
//! - deterministic, size-invariant output that is cheap to memoize per font

pub mod backend;
pub mod cache;
pub mod engine;
pub mod error;
pub mod font;
pub mod metrics;
pub mod options;
pub mod sample;
pub mod scan;

pub use backend::{BaselineMode, NativeBBox, RasterSample, Rasterizer};
pub use cache::MetricsCache;
pub use engine::{MetricsEngine, Trial};
pub use error::{Error, Result};
pub use font::{FontKey, FontSpec, FontStyle, FontWeight};
pub use metrics::FontMetrics;
pub use options::MeasureOptions;
pub use sample::{CanvasSize, GlyphSample, GlyphSampler};
pub use scan::PixelBBox;

use std::sync::Arc;

/// A metrics engine bundled with the cache it memoizes into.
///
/// Cloning is cheap and clones share the cache.
#[derive(Debug, Clone)]
pub struct Typemetry {
    engine: MetricsEngine,
    cache: Arc<MetricsCache>,
}

impl Typemetry {
    /// An engine with default options and a private cache.
    pub fn new(rasterizer: Arc<dyn Rasterizer + Send + Sync>) -> Self {
        Self {
            engine: MetricsEngine::new(rasterizer),
            cache: Arc::new(MetricsCache::new()),
        }
    }

    pub fn with_options(mut self, options: MeasureOptions) -> Self {
        self.engine = self.engine.with_options(options);
        self
    }

    pub fn with_cache(mut self, cache: Arc<MetricsCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn engine(&self) -> &MetricsEngine {
        &self.engine
    }

    pub fn cache(&self) -> &Arc<MetricsCache> {
        &self.cache
    }

    pub fn options(&self) -> &MeasureOptions {
        self.engine.options()
    }

    /// Cached, size-normalized metrics for `font`. Only family, weight and style matter.
    pub fn measure_font(&self, font: &FontSpec) -> Result<FontMetrics> {
        font.validate()?;
        self.cache
            .get_or_compute(&font.key(), || self.engine.measure(font))
    }

    /// Uncached tight ink box of `text` rendered at `font.size`.
    pub fn measure_glyph(
        &self,
        text: &str,
        font: &FontSpec,
        baseline: BaselineMode,
    ) -> Result<PixelBBox> {
        Ok(self.engine.measure_glyph(text, font, baseline)?.bbox)
    }
}

#[cfg(test)]
mod tests;
