use crate::{Error, Result};
use serde::{Deserialize, Serialize};

pub const ENV_REFERENCE_SIZE: &str = "TYPEMETRY_REFERENCE_SIZE";
pub const ENV_PARALLEL: &str = "TYPEMETRY_PARALLEL";

/// Knobs of a measurement pass. None of these affect the cache key: the cache assumes one
/// option set per process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MeasureOptions {
    /// Size in pixels every reference glyph is rendered at.
    pub reference_size: f64,
    /// Size passed to the backend's native line-height query.
    pub line_height_reference_size: f64,
    /// Canvas width per character, in ems.
    pub canvas_width_factor: f64,
    /// Canvas height, in ems. Must cover the tallest ascender plus the deepest descender on
    /// either side of the centre row.
    pub canvas_height_factor: f64,
    /// Sample the glyph battery on the rayon pool. Only sound for backends whose `rasterize`
    /// tolerates concurrent calls, which `Send + Sync` already promises.
    pub parallel_samples: bool,
    /// Decimal places kept when serializing metrics.
    pub precision: u32,
}

impl Default for MeasureOptions {
    fn default() -> Self {
        Self {
            reference_size: 1000.0,
            line_height_reference_size: 1000.0,
            canvas_width_factor: 2.0,
            canvas_height_factor: 2.5,
            parallel_samples: false,
            precision: 3,
        }
    }
}

impl MeasureOptions {
    pub const MIN_CANVAS_WIDTH_FACTOR: f64 = 1.0;
    pub const MIN_CANVAS_HEIGHT_FACTOR: f64 = 2.0;
    pub const MAX_PRECISION: u32 = 12;

    /// Defaults overlaid with `TYPEMETRY_REFERENCE_SIZE` and `TYPEMETRY_PARALLEL`.
    pub fn from_env() -> Result<Self> {
        let mut out = Self::default();
        if let Ok(raw) = std::env::var(ENV_REFERENCE_SIZE) {
            out.reference_size = raw
                .trim()
                .parse::<f64>()
                .map_err(|_| Error::InvalidOptions {
                    message: format!("{ENV_REFERENCE_SIZE}={raw:?} is not a number"),
                })?;
        }
        if let Ok(raw) = std::env::var(ENV_PARALLEL) {
            out.parallel_samples = parse_env_bool(&raw);
        }
        out.validate()?;
        Ok(out)
    }

    pub fn validate(&self) -> Result<()> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(Error::InvalidOptions {
                    message: format!("{name} must be a positive number, got {v}"),
                })
            }
        };
        positive("referenceSize", self.reference_size)?;
        positive("lineHeightReferenceSize", self.line_height_reference_size)?;

        if !(self.canvas_width_factor >= Self::MIN_CANVAS_WIDTH_FACTOR) {
            return Err(Error::InvalidOptions {
                message: format!(
                    "canvasWidthFactor must be at least {}, got {}",
                    Self::MIN_CANVAS_WIDTH_FACTOR,
                    self.canvas_width_factor
                ),
            });
        }
        if !(self.canvas_height_factor >= Self::MIN_CANVAS_HEIGHT_FACTOR) {
            return Err(Error::InvalidOptions {
                message: format!(
                    "canvasHeightFactor must be at least {}, got {}",
                    Self::MIN_CANVAS_HEIGHT_FACTOR,
                    self.canvas_height_factor
                ),
            });
        }
        if self.precision > Self::MAX_PRECISION {
            return Err(Error::InvalidOptions {
                message: format!(
                    "precision must be at most {}, got {}",
                    Self::MAX_PRECISION,
                    self.precision
                ),
            });
        }
        Ok(())
    }
}

pub(crate) fn parse_env_bool(v: &str) -> bool {
    match v.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" | "off" => false,
        _ => true,
    }
}
