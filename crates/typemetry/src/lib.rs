#![forbid(unsafe_code)]

//! `typemetry` measures normalized font metrics by rendering reference glyphs and scanning
//! their pixels, instead of trusting the tables embedded in the font file.
//!
//! # Features
//!
//! - `raster`: enable the pure-Rust [`raster::ResvgRasterizer`] backend (resvg + fontdb)

pub use typemetry_core::*;

#[cfg(feature = "raster")]
pub mod raster;

/// Synchronous cached measurement (executor-free).
pub fn measure_font_sync(typemetry: &Typemetry, font: &FontSpec) -> Result<FontMetrics> {
    typemetry.measure_font(font)
}

/// Runtime-agnostic async wrapper around [`measure_font_sync`]. All work is CPU-bound; the
/// future completes on first poll.
pub async fn measure_font(typemetry: &Typemetry, font: &FontSpec) -> Result<FontMetrics> {
    measure_font_sync(typemetry, font)
}

/// Synchronous uncached glyph box measurement (executor-free).
pub fn measure_glyph_sync(
    typemetry: &Typemetry,
    text: &str,
    font: &FontSpec,
    baseline: BaselineMode,
) -> Result<PixelBBox> {
    typemetry.measure_glyph(text, font, baseline)
}

pub async fn measure_glyph(
    typemetry: &Typemetry,
    text: &str,
    font: &FontSpec,
    baseline: BaselineMode,
) -> Result<PixelBBox> {
    measure_glyph_sync(typemetry, text, font, baseline)
}

/// Process-wide engine over system fonts, backed by [`MetricsCache::global`].
///
/// Options come from [`MeasureOptions::from_env`]; invalid environment overrides fall back
/// to the defaults.
#[cfg(feature = "raster")]
pub fn system_typemetry() -> &'static Typemetry {
    use std::sync::{Arc, OnceLock};

    static SHARED: OnceLock<Typemetry> = OnceLock::new();
    SHARED.get_or_init(|| {
        let options = MeasureOptions::from_env().unwrap_or_else(|err| {
            tracing::warn!("ignoring measure options from the environment: {err}");
            MeasureOptions::default()
        });
        Typemetry::new(Arc::new(raster::ResvgRasterizer::system()))
            .with_options(options)
            .with_cache(MetricsCache::global())
    })
}

/// Cached metrics for an installed font, measured with [`system_typemetry`].
#[cfg(feature = "raster")]
pub fn measure_installed_font(font: &FontSpec) -> Result<FontMetrics> {
    measure_font_sync(system_typemetry(), font)
}
