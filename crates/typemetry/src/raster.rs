#![forbid(unsafe_code)]

//! A [`Rasterizer`] over resvg: each glyph sample becomes a one-element SVG `<text>` document,
//! rendered into a tiny-skia pixmap. Native queries read the face tables through ttf-parser.

use std::path::PathBuf;
use std::sync::Arc;
use typemetry_core::{BaselineMode, FontSpec, FontStyle, NativeBBox, RasterSample, Rasterizer};
use usvg::fontdb;

#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error("failed to parse glyph SVG: {0}")]
    SvgParse(String),
    #[error("failed to allocate a {width}x{height} pixmap")]
    PixmapAlloc { width: u32, height: u32 },
    #[error("failed to load font file {}: {message}", path.display())]
    FontLoad { path: PathBuf, message: String },
    #[error("failed to encode PNG")]
    PngEncode,
}

pub type Result<T> = std::result::Result<T, RasterError>;

impl From<RasterError> for typemetry_core::Error {
    fn from(err: RasterError) -> Self {
        typemetry_core::Error::backend(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct RasterOptions {
    pub load_system_fonts: bool,
    /// Extra font files, loaded after system fonts.
    pub font_files: Vec<PathBuf>,
    pub font_dirs: Vec<PathBuf>,
    /// Tried after the requested family and before `serif`.
    pub fallback_family: String,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            load_system_fonts: true,
            font_files: Vec::new(),
            font_dirs: Vec::new(),
            fallback_family: "Arial".to_string(),
        }
    }
}

/// Native face tables, in font units.
#[derive(Debug, Clone, Copy)]
struct FaceMetrics {
    ascender: f64,
    descender: f64,
    line_gap: f64,
    units_per_em: f64,
}

/// Renders glyph samples with resvg and answers native queries from the face tables.
///
/// The text element and the native queries resolve the same family chain (requested family,
/// then `fallback_family`, then `serif`), so ink metrics and `bboxTop`/`lineHeight` always
/// describe the same face. A requested family that is not installed is therefore measured
/// through its fallback; use [`ResvgRasterizer::has_face`] to detect that case.
#[derive(Clone)]
pub struct ResvgRasterizer {
    fontdb: Arc<fontdb::Database>,
    fallback_family: String,
}

impl std::fmt::Debug for ResvgRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResvgRasterizer")
            .field("faces", &self.fontdb.len())
            .field("fallback_family", &self.fallback_family)
            .finish()
    }
}

impl ResvgRasterizer {
    pub fn new(options: &RasterOptions) -> Result<Self> {
        let mut db = fontdb::Database::new();
        if options.load_system_fonts {
            db.load_system_fonts();
        }
        for dir in &options.font_dirs {
            db.load_fonts_dir(dir);
        }
        for path in &options.font_files {
            let loaded = db.load_font_file(path);
            loaded.map_err(|err| RasterError::FontLoad {
                path: path.clone(),
                message: err.to_string(),
            })?;
        }
        tracing::debug!(faces = db.len(), "font database loaded");
        Ok(Self::with_database(Arc::new(db), options.fallback_family.clone()))
    }

    /// System fonts only.
    pub fn system() -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        tracing::debug!(faces = db.len(), "system font database loaded");
        Self::with_database(Arc::new(db), RasterOptions::default().fallback_family)
    }

    pub fn with_database(fontdb: Arc<fontdb::Database>, fallback_family: String) -> Self {
        Self {
            fontdb,
            fallback_family,
        }
    }

    pub fn fontdb(&self) -> &Arc<fontdb::Database> {
        &self.fontdb
    }

    /// Whether `font` resolves to an installed face without falling back.
    pub fn has_face(&self, font: &FontSpec) -> bool {
        let name = font.family_name();
        self.query_face(font, &[to_family(&name)]).is_some()
    }

    /// The raw RGBA pixmap `rasterize` scans, encoded as PNG.
    pub fn render_png(
        &self,
        text: &str,
        font: &FontSpec,
        baseline: BaselineMode,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>> {
        let pixmap = self.render_pixmap(text, font, baseline, width, height)?;
        pixmap.encode_png().map_err(|_| RasterError::PngEncode)
    }

    fn render_pixmap(
        &self,
        text: &str,
        font: &FontSpec,
        baseline: BaselineMode,
        width: u32,
        height: u32,
    ) -> Result<tiny_skia::Pixmap> {
        let svg = glyph_svg(text, font, &self.fallback_family, baseline, width, height);

        let mut opt = usvg::Options::default();
        opt.fontdb = Arc::clone(&self.fontdb);

        let tree = usvg::Tree::from_str(&svg, &opt)
            .map_err(|err| RasterError::SvgParse(err.to_string()))?;
        let mut pixmap = tiny_skia::Pixmap::new(width, height)
            .ok_or(RasterError::PixmapAlloc { width, height })?;
        let transform = tiny_skia::Transform::identity();
        resvg::render(&tree, transform, &mut pixmap.as_mut());
        Ok(pixmap)
    }

    fn query_face(&self, font: &FontSpec, families: &[fontdb::Family<'_>]) -> Option<fontdb::ID> {
        let style = match font.style {
            FontStyle::Normal => fontdb::Style::Normal,
            FontStyle::Italic => fontdb::Style::Italic,
        };
        self.fontdb.query(&fontdb::Query {
            families,
            weight: fontdb::Weight(font.weight.value()),
            stretch: fontdb::Stretch::Normal,
            style,
        })
    }

    fn face_metrics(&self, font: &FontSpec) -> Option<FaceMetrics> {
        let name = font.family_name();
        let chain = family_chain(&name, &self.fallback_family);
        let Some(id) = self.query_face(font, &chain) else {
            tracing::debug!(font = %font, "no installed face for native metrics");
            return None;
        };
        let metrics = self
            .fontdb
            .with_face_data(id, |data, index| {
                let face = ttf_parser::Face::parse(data, index).ok()?;
                Some(FaceMetrics {
                    ascender: f64::from(face.ascender()),
                    descender: f64::from(face.descender()),
                    line_gap: f64::from(face.line_gap()),
                    units_per_em: f64::from(face.units_per_em()),
                })
            })
            .flatten();
        metrics.filter(|m| m.units_per_em > 0.0)
    }
}

impl Rasterizer for ResvgRasterizer {
    fn rasterize(
        &self,
        text: &str,
        font: &FontSpec,
        baseline: BaselineMode,
        width: u32,
        height: u32,
    ) -> typemetry_core::Result<RasterSample> {
        let pixmap = self.render_pixmap(text, font, baseline, width, height)?;
        RasterSample::new(width, height, pixmap.take())
    }

    /// Ascender and descender of the resolved face, scaled to `font.size`.
    fn native_font_bounding_box(
        &self,
        font: &FontSpec,
    ) -> typemetry_core::Result<Option<NativeBBox>> {
        let Some(m) = self.face_metrics(font) else {
            return Ok(None);
        };
        let scale = font.size / m.units_per_em;
        Ok(Some(NativeBBox {
            top: m.ascender * scale,
            bottom: m.descender * scale,
        }))
    }

    /// `ascender - descender + lineGap`, the default line box of the face.
    fn native_line_height(
        &self,
        font: &FontSpec,
        reference_size: f64,
    ) -> typemetry_core::Result<Option<f64>> {
        let Some(m) = self.face_metrics(font) else {
            return Ok(None);
        };
        let line_box = m.ascender - m.descender + m.line_gap;
        Ok(Some(line_box * reference_size / m.units_per_em))
    }
}

fn generic_family(name: &str) -> Option<fontdb::Family<'static>> {
    match name.to_ascii_lowercase().as_str() {
        "serif" => Some(fontdb::Family::Serif),
        "sans-serif" => Some(fontdb::Family::SansSerif),
        "monospace" => Some(fontdb::Family::Monospace),
        "cursive" => Some(fontdb::Family::Cursive),
        "fantasy" => Some(fontdb::Family::Fantasy),
        _ => None,
    }
}

fn to_family(name: &str) -> fontdb::Family<'_> {
    generic_family(name).unwrap_or(fontdb::Family::Name(name))
}

/// Requested family, then the fallback, then `serif`, without repeats.
fn family_chain<'a>(requested: &'a str, fallback: &'a str) -> Vec<fontdb::Family<'a>> {
    let mut chain = vec![to_family(requested)];
    for family in [to_family(fallback.trim()), fontdb::Family::Serif] {
        if family != fontdb::Family::Name("") && !chain.contains(&family) {
            chain.push(family);
        }
    }
    chain
}

fn css_family(family: &fontdb::Family<'_>) -> String {
    match family {
        fontdb::Family::Name(name) => format!("'{}'", escape_xml(name)),
        fontdb::Family::Serif => "serif".to_string(),
        fontdb::Family::SansSerif => "sans-serif".to_string(),
        fontdb::Family::Cursive => "cursive".to_string(),
        fontdb::Family::Fantasy => "fantasy".to_string(),
        fontdb::Family::Monospace => "monospace".to_string(),
    }
}

fn dominant_baseline(baseline: BaselineMode) -> &'static str {
    match baseline {
        BaselineMode::Alphabetic => "alphabetic",
        BaselineMode::Top => "text-before-edge",
        BaselineMode::Bottom => "text-after-edge",
    }
}

/// A `width x height` document with `text` centred horizontally and its baseline on the
/// middle row.
fn glyph_svg(
    text: &str,
    font: &FontSpec,
    fallback: &str,
    baseline: BaselineMode,
    width: u32,
    height: u32,
) -> String {
    let name = font.family_name();
    let family = family_chain(&name, fallback)
        .iter()
        .map(css_family)
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}"><text x="{x}" y="{y}" font-family="{family}" font-size="{size}" font-weight="{weight}" font-style="{style}" text-anchor="middle" dominant-baseline="{baseline}" xml:space="preserve" fill="#000000">{text}</text></svg>"##,
        x = f64::from(width) / 2.0,
        y = f64::from(height) / 2.0,
        size = font.size,
        weight = font.weight,
        style = font.style,
        baseline = dominant_baseline(baseline),
        text = escape_xml(text),
    )
}

fn escape_xml(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}
