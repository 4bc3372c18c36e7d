//! Font description value types.
//!
//! A [`FontSpec`] is an immutable description of the font to measure. Cache identity is the
//! [`FontKey`] derived from it, which deliberately excludes the size: metrics are reported as
//! fractions of the size and do not depend on it.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// CSS numeric font weight, restricted to the nine named steps `100..=900`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct FontWeight(u16);

impl FontWeight {
    pub const THIN: Self = Self(100);
    pub const EXTRA_LIGHT: Self = Self(200);
    pub const LIGHT: Self = Self(300);
    pub const NORMAL: Self = Self(400);
    pub const MEDIUM: Self = Self(500);
    pub const SEMI_BOLD: Self = Self(600);
    pub const BOLD: Self = Self(700);
    pub const EXTRA_BOLD: Self = Self(800);
    pub const BLACK: Self = Self(900);

    pub fn new(value: u16) -> Result<Self> {
        if (100..=900).contains(&value) && value % 100 == 0 {
            Ok(Self(value))
        } else {
            Err(Error::InvalidFontSpec {
                message: format!("font weight must be a multiple of 100 in 100..=900, got {value}"),
            })
        }
    }

    pub fn value(self) -> u16 {
        self.0
    }
}

impl Default for FontWeight {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl TryFrom<u16> for FontWeight {
    type Error = Error;

    fn try_from(value: u16) -> Result<Self> {
        Self::new(value)
    }
}

impl From<FontWeight> for u16 {
    fn from(value: FontWeight) -> Self {
        value.0
    }
}

impl fmt::Display for FontWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FontWeight {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Self::NORMAL),
            "bold" => Ok(Self::BOLD),
            other => {
                let value = other.parse::<u16>().map_err(|_| Error::InvalidFontSpec {
                    message: format!("unrecognized font weight {s:?}"),
                })?;
                Self::new(value)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

impl FontStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Italic => "italic",
        }
    }
}

impl fmt::Display for FontStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FontStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "italic" => Ok(Self::Italic),
            _ => Err(Error::InvalidFontSpec {
                message: format!("unrecognized font style {s:?}"),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontSpec {
    pub family: String,
    #[serde(default)]
    pub weight: FontWeight,
    #[serde(default)]
    pub style: FontStyle,
    /// Font size in pixels.
    #[serde(default = "default_font_size")]
    pub size: f64,
}

fn default_font_size() -> f64 {
    16.0
}

impl FontSpec {
    pub fn new(family: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            weight: FontWeight::default(),
            style: FontStyle::default(),
            size: default_font_size(),
        }
    }

    pub fn with_weight(mut self, weight: FontWeight) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_style(mut self, style: FontStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if normalize_family(&self.family).is_empty() {
            return Err(Error::InvalidFontSpec {
                message: "font family must not be empty".to_string(),
            });
        }
        if !(self.size.is_finite() && self.size > 0.0) {
            return Err(Error::InvalidFontSpec {
                message: format!("font size must be a positive number, got {}", self.size),
            });
        }
        Ok(())
    }

    pub fn key(&self) -> FontKey {
        FontKey::new(&self.family, self.weight, self.style)
    }

    /// The family name with surrounding quotes and redundant whitespace removed.
    pub fn family_name(&self) -> String {
        strip_quotes(self.family.trim())
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// CSS `font` shorthand, e.g. `italic 700 16px "Georgia"`.
    pub fn css_font(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FontSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}px \"{}\"",
            self.style,
            self.weight,
            self.size,
            self.family_name()
        )
    }
}

impl FromStr for FontSpec {
    type Err = Error;

    /// Parses `[<style>] [<weight>] <size>px[/<line-height>] <family>`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = |message: String| Error::InvalidFontSpec { message };

        let mut style: Option<FontStyle> = None;
        let mut weight: Option<FontWeight> = None;
        let mut rest = s.trim();
        loop {
            let (tok, tail) = split_first_token(rest);
            if tok.is_empty() {
                return Err(invalid(format!("font shorthand {s:?} is missing a size")));
            }
            if let Some(size) = parse_px_size(tok) {
                let family = tail.trim();
                if family.is_empty() {
                    return Err(invalid(format!("font shorthand {s:?} is missing a family")));
                }
                let spec = FontSpec {
                    family: strip_quotes(family).to_string(),
                    weight: weight.unwrap_or_default(),
                    style: style.unwrap_or_default(),
                    size,
                };
                spec.validate()?;
                return Ok(spec);
            }
            if style.is_none() {
                if let Ok(parsed) = tok.parse::<FontStyle>() {
                    style = Some(parsed);
                    rest = tail;
                    continue;
                }
            }
            if weight.is_none() {
                if let Ok(parsed) = tok.parse::<FontWeight>() {
                    weight = Some(parsed);
                    rest = tail;
                    continue;
                }
            }
            return Err(invalid(format!("unexpected token {tok:?} in font shorthand {s:?}")));
        }
    }
}

fn split_first_token(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(i) => (&s[..i], s[i..].trim_start()),
        None => (s, ""),
    }
}

fn parse_px_size(tok: &str) -> Option<f64> {
    // `16px/1.2` carries a line-height we do not use.
    let size = tok.split('/').next()?;
    let number = size.strip_suffix("px")?;
    number.parse::<f64>().ok()
}

fn strip_quotes(s: &str) -> &str {
    for q in ['"', '\''] {
        if let Some(inner) = s.strip_prefix(q).and_then(|t| t.strip_suffix(q)) {
            return inner;
        }
    }
    s
}

fn normalize_family(family: &str) -> String {
    strip_quotes(family.trim())
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Cache identity of a font: family (case-insensitive, quote- and whitespace-normalized),
/// weight and style.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontKey {
    family: String,
    weight: FontWeight,
    style: FontStyle,
}

impl FontKey {
    pub fn new(family: &str, weight: FontWeight, style: FontStyle) -> Self {
        Self {
            family: normalize_family(family),
            weight,
            style,
        }
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn weight(&self) -> FontWeight {
        self.weight
    }

    pub fn style(&self) -> FontStyle {
        self.style
    }
}

impl From<&FontSpec> for FontKey {
    fn from(spec: &FontSpec) -> Self {
        spec.key()
    }
}

impl fmt::Display for FontKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.family, self.weight, self.style)
    }
}
