use crate::backend::BaselineMode;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The pixel scan found no ink: the glyph is missing from the font or the canvas is degenerate.
    #[error("glyph {text:?} produced no ink at the {baseline} baseline")]
    GlyphNotRenderable {
        text: String,
        baseline: BaselineMode,
    },

    /// The rasterization primitive itself failed. No metrics can be trusted after this.
    #[error("rasterization backend unavailable: {message}")]
    BackendUnavailable { message: String },

    #[error("metric `{metric}` is unavailable")]
    MetricUnavailable { metric: String },

    #[error("invalid font spec: {message}")]
    InvalidFontSpec { message: String },

    #[error("invalid measure options: {message}")]
    InvalidOptions { message: String },

    #[error("metrics JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            message: message.into(),
        }
    }

    /// Sample-level failures are downgraded to undefined fields; everything else aborts a
    /// measurement.
    pub fn is_sample_failure(&self) -> bool {
        matches!(self, Self::GlyphNotRenderable { .. })
    }
}
