//! A deterministic rasterizer that paints each glyph as axis-aligned ink boxes taken from an
//! em-unit table. Exact integer boundaries at 1000px make expected metrics easy to state.

use crate::*;
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// `(top, bottom)` of one ink box in ems, relative to the alphabetic baseline.
pub(crate) type InkBox = (f64, f64);

const ADVANCE_EM: f64 = 0.6;

pub(crate) struct SyntheticRasterizer {
    glyphs: FxHashMap<char, Vec<InkBox>>,
    em_top: f64,
    em_bottom: f64,
    native_bbox: Option<(f64, f64)>,
    line_height: Option<f64>,
    fail_backend: bool,
    delay: Option<Duration>,
    /// Alpha painted on the first ink row, to check that faint coverage still counts.
    edge_alpha: u8,
    rasterize_calls: AtomicUsize,
    native_bbox_calls: AtomicUsize,
}

impl SyntheticRasterizer {
    /// A sans-like face: x-height 0.5, cap-height 0.7, em box from +0.8 to -0.2.
    pub(crate) fn reference() -> Self {
        let mut glyphs: FxHashMap<char, Vec<InkBox>> = FxHashMap::default();
        glyphs.insert('x', vec![(0.5, 0.0)]);
        glyphs.insert('d', vec![(0.75, 0.0)]);
        glyphs.insert('p', vec![(0.5, -0.25)]);
        glyphs.insert('H', vec![(0.7, 0.0)]);
        glyphs.insert('1', vec![(0.68, 0.0)]);
        glyphs.insert('i', vec![(0.5, 0.0), (0.72, 0.62)]);
        glyphs.insert('O', vec![(0.71, -0.01)]);
        glyphs.insert('A', vec![(0.705, 0.0)]);
        Self {
            glyphs,
            em_top: 0.8,
            em_bottom: -0.2,
            native_bbox: Some((0.9, -0.22)),
            line_height: Some(1.15),
            fail_backend: false,
            delay: None,
            edge_alpha: 255,
            rasterize_calls: AtomicUsize::new(0),
            native_bbox_calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn without_glyph(mut self, ch: char) -> Self {
        self.glyphs.remove(&ch);
        self
    }

    pub(crate) fn without_native_queries(mut self) -> Self {
        self.native_bbox = None;
        self.line_height = None;
        self
    }

    pub(crate) fn failing(mut self) -> Self {
        self.fail_backend = true;
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn with_edge_alpha(mut self, alpha: u8) -> Self {
        self.edge_alpha = alpha;
        self
    }

    pub(crate) fn rasterize_calls(&self) -> usize {
        self.rasterize_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn native_bbox_calls(&self) -> usize {
        self.native_bbox_calls.load(Ordering::SeqCst)
    }
}

fn paint_rows(sample: &mut RasterSample, x0: i64, x1: i64, y0: i64, y1: i64, edge_alpha: u8) {
    let width = i64::from(sample.width());
    let height = i64::from(sample.height());
    let (x0, x1) = (x0.clamp(0, width), x1.clamp(0, width));
    let (y0, y1) = (y0.clamp(0, height), y1.clamp(0, height));
    let data = sample.data_mut();
    for y in y0..y1 {
        let alpha = if y == y0 { edge_alpha } else { 255 };
        for x in x0..x1 {
            let i = ((y * width + x) as usize) * RasterSample::CHANNELS;
            data[i] = 0;
            data[i + 1] = 0;
            data[i + 2] = 0;
            data[i + 3] = alpha;
        }
    }
}

impl Rasterizer for SyntheticRasterizer {
    fn rasterize(
        &self,
        text: &str,
        font: &FontSpec,
        baseline: BaselineMode,
        width: u32,
        height: u32,
    ) -> Result<RasterSample> {
        self.rasterize_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_backend {
            return Err(Error::backend("synthetic backend is switched off"));
        }

        let size = font.size;
        let anchor = f64::from(height) / 2.0;
        let baseline_y = match baseline {
            BaselineMode::Alphabetic => anchor,
            BaselineMode::Top => anchor + self.em_top * size,
            BaselineMode::Bottom => anchor + self.em_bottom * size,
        };

        let mut sample = RasterSample::transparent(width, height);
        let advance = ADVANCE_EM * size;
        let run_width = advance * text.chars().count() as f64;
        let start_x = f64::from(width) / 2.0 - run_width / 2.0;
        for (k, ch) in text.chars().enumerate() {
            let Some(boxes) = self.glyphs.get(&ch) else {
                continue;
            };
            let left = start_x + advance * k as f64;
            let x0 = (left + 0.05 * size).round() as i64;
            let x1 = (left + (ADVANCE_EM - 0.05) * size).round() as i64;
            for (top, bottom) in boxes {
                let y0 = (baseline_y - top * size).round() as i64;
                let y1 = (baseline_y - bottom * size).round() as i64;
                paint_rows(&mut sample, x0, x1, y0, y1, self.edge_alpha);
            }
        }
        Ok(sample)
    }

    fn native_font_bounding_box(&self, font: &FontSpec) -> Result<Option<NativeBBox>> {
        self.native_bbox_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        Ok(self.native_bbox.map(|(top, bottom)| NativeBBox {
            top: top * font.size,
            bottom: bottom * font.size,
        }))
    }

    fn native_line_height(&self, _font: &FontSpec, reference_size: f64) -> Result<Option<f64>> {
        Ok(self.line_height.map(|lh| lh * reference_size))
    }
}

pub(crate) fn assert_close(actual: Option<f64>, expected: f64, tolerance: f64, what: &str) {
    let Some(actual) = actual else {
        panic!("{what}: expected {expected}, got undefined");
    };
    assert!(
        (actual - expected).abs() <= tolerance,
        "{what}: expected {expected} +/- {tolerance}, got {actual}"
    );
}
