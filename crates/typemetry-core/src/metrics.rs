//! The normalized metrics record.
//!
//! Every field is a ratio of the font size with positive values above the alphabetic baseline
//! and negative values below it. `None` means "not computable for this font/backend" and is
//! never conflated with zero: serialization omits such fields entirely.

use crate::{Error, Result};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Number, Value};

/// Decimal places used by the `Serialize` impl.
pub const DEFAULT_PRECISION: u32 = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontMetrics {
    #[serde(default)]
    pub baseline: f64,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "ser_rounded")]
    pub ascent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "ser_rounded")]
    pub descent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "ser_rounded")]
    pub x_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "ser_rounded")]
    pub cap_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "ser_rounded")]
    pub fig_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "ser_rounded")]
    pub tittle_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "ser_rounded")]
    pub round_overshoot: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "ser_rounded")]
    pub pointed_overshoot: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "ser_rounded")]
    pub em_top: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "ser_rounded")]
    pub em_bottom: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "ser_rounded")]
    pub em_middle: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "ser_rounded")]
    pub em_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "ser_rounded")]
    pub bbox_top: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "ser_rounded")]
    pub bbox_bottom: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "ser_rounded")]
    pub bbox_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "ser_rounded")]
    pub line_height: Option<f64>,
}

fn ser_rounded<S: Serializer>(v: &Option<f64>, s: S) -> std::result::Result<S::Ok, S::Error> {
    match v {
        Some(v) => s.serialize_f64(round_to(*v, DEFAULT_PRECISION)),
        None => s.serialize_none(),
    }
}

pub fn round_to(v: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    let rounded = (v * factor).round() / factor;
    // Avoid emitting `-0.0`.
    if rounded == 0.0 { 0.0 } else { rounded }
}

impl FontMetrics {
    /// Canonical field names in output order.
    pub const FIELD_NAMES: [&'static str; 17] = [
        "baseline",
        "ascent",
        "descent",
        "xHeight",
        "capHeight",
        "figHeight",
        "tittleHeight",
        "roundOvershoot",
        "pointedOvershoot",
        "emTop",
        "emBottom",
        "emMiddle",
        "emHeight",
        "bboxTop",
        "bboxBottom",
        "bboxHeight",
        "lineHeight",
    ];

    /// `(name, value)` pairs in canonical order. `baseline` is always defined.
    pub fn fields(&self) -> [(&'static str, Option<f64>); 17] {
        [
            ("baseline", Some(self.baseline)),
            ("ascent", self.ascent),
            ("descent", self.descent),
            ("xHeight", self.x_height),
            ("capHeight", self.cap_height),
            ("figHeight", self.fig_height),
            ("tittleHeight", self.tittle_height),
            ("roundOvershoot", self.round_overshoot),
            ("pointedOvershoot", self.pointed_overshoot),
            ("emTop", self.em_top),
            ("emBottom", self.em_bottom),
            ("emMiddle", self.em_middle),
            ("emHeight", self.em_height),
            ("bboxTop", self.bbox_top),
            ("bboxBottom", self.bbox_bottom),
            ("bboxHeight", self.bbox_height),
            ("lineHeight", self.line_height),
        ]
    }

    /// Looks a field up by its serialized name.
    pub fn get(&self, name: &str) -> Result<f64> {
        self.fields()
            .into_iter()
            .find(|(n, _)| *n == name)
            .and_then(|(_, v)| v)
            .ok_or_else(|| Error::MetricUnavailable {
                metric: name.to_string(),
            })
    }

    pub fn defined_count(&self) -> usize {
        self.fields().iter().filter(|(_, v)| v.is_some()).count()
    }

    /// Every field multiplied by `font_size`, i.e. the record in pixels at that size.
    pub fn scaled(&self, font_size: f64) -> Self {
        let s = |v: Option<f64>| v.map(|v| v * font_size);
        Self {
            baseline: self.baseline * font_size,
            ascent: s(self.ascent),
            descent: s(self.descent),
            x_height: s(self.x_height),
            cap_height: s(self.cap_height),
            fig_height: s(self.fig_height),
            tittle_height: s(self.tittle_height),
            round_overshoot: s(self.round_overshoot),
            pointed_overshoot: s(self.pointed_overshoot),
            em_top: s(self.em_top),
            em_bottom: s(self.em_bottom),
            em_middle: s(self.em_middle),
            em_height: s(self.em_height),
            bbox_top: s(self.bbox_top),
            bbox_bottom: s(self.bbox_bottom),
            bbox_height: s(self.bbox_height),
            line_height: s(self.line_height),
        }
    }

    /// Baseline y (downward axis) that centres the em box on `center_y`.
    pub fn centered_baseline(&self, center_y: f64, font_size: f64) -> Option<f64> {
        self.em_middle.map(|m| center_y + m * font_size)
    }

    /// Screen-space y of every defined vertical metric for text drawn with its baseline at
    /// `baseline_y`. Span metrics (`emHeight`, `bboxHeight`, `lineHeight`) are not lines and are
    /// left out.
    pub fn guide_lines(&self, baseline_y: f64, font_size: f64) -> Vec<(&'static str, f64)> {
        self.fields()
            .into_iter()
            .filter(|(name, _)| !matches!(*name, "emHeight" | "bboxHeight" | "lineHeight"))
            .filter_map(|(name, v)| v.map(|v| (name, baseline_y - v * font_size)))
            .collect()
    }

    /// Flat key/value view with values rounded to `precision` places; undefined fields are
    /// omitted.
    pub fn to_map(&self, precision: u32) -> Map<String, Value> {
        let mut out = Map::new();
        for (name, v) in self.fields() {
            let Some(v) = v else {
                continue;
            };
            if let Some(n) = Number::from_f64(round_to(v, precision)) {
                out.insert(name.to_string(), Value::Number(n));
            }
        }
        out
    }

    pub fn to_json(&self, precision: u32, pretty: bool) -> Result<String> {
        let value = Value::Object(self.to_map(precision));
        if !pretty {
            return Ok(serde_json::to_string(&value)?);
        }
        let mut buf = Vec::new();
        let fmt = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, fmt);
        value.serialize(&mut ser)?;
        String::from_utf8(buf).map_err(|e| Error::Json(serde::ser::Error::custom(e)))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
