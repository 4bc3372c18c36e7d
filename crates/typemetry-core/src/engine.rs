//! Combines the reference glyph battery and native queries into [`FontMetrics`].

use crate::Result;
use crate::backend::{BaselineMode, Rasterizer};
use crate::font::FontSpec;
use crate::metrics::FontMetrics;
use crate::options::MeasureOptions;
use crate::sample::{GlyphSample, GlyphSampler};
use rayon::prelude::*;
use std::sync::Arc;

/// One reference glyph of the battery. Each isolates a single typographic feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trial {
    /// `x`: x-height, and the baseline reference for the em-box trials.
    XHeight,
    /// `d`: ascender top.
    Ascender,
    /// `p`: descender bottom.
    Descender,
    /// `H`: flat capital.
    CapHeight,
    /// `1`: figure height.
    Figure,
    /// `i`: tittle top.
    Tittle,
    /// `O`: round capital overshoot.
    RoundCapital,
    /// `A`: pointed capital apex.
    PointedCapital,
    /// `x` anchored on the em-box top.
    EmTop,
    /// `x` anchored on the em-box bottom.
    EmBottom,
}

impl Trial {
    pub const BATTERY: [Trial; 10] = [
        Trial::XHeight,
        Trial::Ascender,
        Trial::Descender,
        Trial::CapHeight,
        Trial::Figure,
        Trial::Tittle,
        Trial::RoundCapital,
        Trial::PointedCapital,
        Trial::EmTop,
        Trial::EmBottom,
    ];

    pub fn glyph(self) -> &'static str {
        match self {
            Trial::XHeight | Trial::EmTop | Trial::EmBottom => "x",
            Trial::Ascender => "d",
            Trial::Descender => "p",
            Trial::CapHeight => "H",
            Trial::Figure => "1",
            Trial::Tittle => "i",
            Trial::RoundCapital => "O",
            Trial::PointedCapital => "A",
        }
    }

    pub fn baseline(self) -> BaselineMode {
        match self {
            Trial::EmTop => BaselineMode::Top,
            Trial::EmBottom => BaselineMode::Bottom,
            _ => BaselineMode::Alphabetic,
        }
    }
}

/// Samples of one battery run, `None` where the glyph produced no ink.
#[derive(Debug, Clone, Default)]
struct Battery {
    samples: Vec<(Trial, Option<GlyphSample>)>,
}

impl Battery {
    fn get(&self, trial: Trial) -> Option<&GlyphSample> {
        self.samples
            .iter()
            .find(|(p, _)| *p == trial)
            .and_then(|(_, s)| s.as_ref())
    }
}

#[derive(Clone)]
pub struct MetricsEngine {
    rasterizer: Arc<dyn Rasterizer + Send + Sync>,
    options: MeasureOptions,
}

impl std::fmt::Debug for MetricsEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsEngine")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl MetricsEngine {
    pub fn new(rasterizer: Arc<dyn Rasterizer + Send + Sync>) -> Self {
        Self {
            rasterizer,
            options: MeasureOptions::default(),
        }
    }

    pub fn with_options(mut self, options: MeasureOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &MeasureOptions {
        &self.options
    }

    pub fn rasterizer(&self) -> &Arc<dyn Rasterizer + Send + Sync> {
        &self.rasterizer
    }

    /// Measures one glyph string at the caller's own size; the lower-level primitive behind
    /// custom batteries.
    pub fn measure_glyph(
        &self,
        text: &str,
        font: &FontSpec,
        baseline: BaselineMode,
    ) -> Result<GlyphSample> {
        font.validate()?;
        GlyphSampler::new(self.rasterizer.as_ref(), &self.options).sample(font, text, baseline)
    }

    /// Measures `font` at the reference size. The size carried by `font` is ignored.
    ///
    /// A reference glyph without ink only blanks the fields that depend on it; backend
    /// failures abort the whole measurement.
    pub fn measure(&self, font: &FontSpec) -> Result<FontMetrics> {
        self.options.validate()?;
        let size = self.options.reference_size;
        let font = font.clone().with_size(size);
        font.validate()?;

        tracing::debug!(font = %font, "measuring font metrics");
        let battery = self.sample_battery(&font)?;

        let bbox = self.rasterizer.native_font_bounding_box(&font)?;
        let bbox = bbox.filter(|b| b.top.is_finite() && b.bottom.is_finite());
        if bbox.is_none() {
            tracing::warn!(font = %font, "backend exposes no native font bounding box");
        }

        let lh_size = self.options.line_height_reference_size;
        let line_height = self
            .rasterizer
            .native_line_height(&font.clone().with_size(lh_size), lh_size)?
            .filter(|v| v.is_finite());

        let norm = |v: f64| v / size;
        let x = battery.get(Trial::XHeight);
        let top = battery.get(Trial::EmTop);
        let bottom = battery.get(Trial::EmBottom);

        let em_top = x.zip(top).map(|(x, t)| norm(x.bottom() - t.bottom()));
        let em_bottom = x.zip(bottom).map(|(x, b)| norm(x.bottom() - b.bottom()));
        let em_middle = em_top.zip(em_bottom).map(|(t, b)| (t + b) / 2.0);
        let em_height = em_top.zip(em_bottom).map(|(t, b)| t - b);

        let metrics = FontMetrics {
            baseline: 0.0,
            ascent: battery.get(Trial::Ascender).map(|d| norm(d.top())),
            descent: battery.get(Trial::Descender).map(|p| norm(p.bottom())),
            x_height: x.map(|x| norm(x.height())),
            cap_height: battery.get(Trial::CapHeight).map(|h| norm(h.height())),
            fig_height: battery.get(Trial::Figure).map(|f| norm(f.height())),
            tittle_height: battery.get(Trial::Tittle).map(|i| norm(i.top())),
            round_overshoot: battery.get(Trial::RoundCapital).map(|o| norm(o.top())),
            pointed_overshoot: battery.get(Trial::PointedCapital).map(|a| norm(a.top())),
            em_top,
            em_bottom,
            em_middle,
            em_height,
            bbox_top: bbox.map(|b| norm(b.top)),
            bbox_bottom: bbox.map(|b| norm(b.bottom)),
            bbox_height: bbox.map(|b| norm(b.height())),
            line_height: line_height.map(|v| v / lh_size),
        };
        tracing::debug!(
            font = %font,
            defined = metrics.defined_count(),
            "font metrics measured"
        );
        Ok(metrics)
    }

    fn sample_battery(&self, font: &FontSpec) -> Result<Battery> {
        let run = |trial: &Trial| -> Result<(Trial, Option<GlyphSample>)> {
            let sampler = GlyphSampler::new(self.rasterizer.as_ref(), &self.options);
            match sampler.sample(font, trial.glyph(), trial.baseline()) {
                Ok(sample) => Ok((*trial, Some(sample))),
                Err(err) if err.is_sample_failure() => {
                    tracing::warn!(font = %font, ?trial, "{err}");
                    Ok((*trial, None))
                }
                Err(err) => Err(err),
            }
        };

        let samples: Result<Vec<_>> = if self.options.parallel_samples {
            Trial::BATTERY.par_iter().map(run).collect()
        } else {
            Trial::BATTERY.iter().map(run).collect()
        };
        Ok(Battery { samples: samples? })
    }
}
