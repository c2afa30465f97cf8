use std::path::PathBuf;

/// Convenience result type used across vertikal.
pub type VertikalResult<T> = Result<T, VertikalError>;

/// Top-level error taxonomy used by the compositing pipeline.
#[derive(thiserror::Error, Debug)]
pub enum VertikalError {
    /// Invalid user-provided configuration or inputs.
    #[error("validation error: {0}")]
    Validation(String),

    /// The template image could not be read or decoded.
    #[error("template load error: '{}': {reason}", path.display())]
    TemplateLoad {
        /// Template path as configured.
        path: PathBuf,
        /// Underlying failure.
        reason: String,
    },

    /// The template contains no chroma-key colored pixels.
    #[error("mask empty: no key color found in template '{}'", path.display())]
    MaskEmpty {
        /// Template path as configured.
        path: PathBuf,
    },

    /// A frame source produced no frames on its very first read.
    #[error("empty source: '{0}' yields no frames")]
    EmptySource(String),

    /// None of the candidate encoders could be opened.
    #[error("encoding open error: no encoder could be opened (tried: {}): {last_error}", tried.join(", "))]
    EncodingOpen {
        /// Encoders attempted, in order.
        tried: Vec<String>,
        /// Failure reported by the last attempt.
        last_error: String,
    },

    /// An audio track could not be decoded or mixed.
    #[error("audio mix error: {0}")]
    AudioMix(String),

    /// Decoding, probing, muxing or filesystem failure.
    #[error("media error: {0}")]
    Media(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VertikalError {
    /// Build a [`VertikalError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`VertikalError::Media`] value.
    pub fn media(msg: impl Into<String>) -> Self {
        Self::Media(msg.into())
    }

    /// Build a [`VertikalError::AudioMix`] value.
    pub fn audio_mix(msg: impl Into<String>) -> Self {
        Self::AudioMix(msg.into())
    }

    /// Build a [`VertikalError::EmptySource`] value.
    pub fn empty_source(name: impl Into<String>) -> Self {
        Self::EmptySource(name.into())
    }

    /// Build a [`VertikalError::TemplateLoad`] value.
    pub fn template_load(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        Self::TemplateLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Return `true` for errors that abort a whole batch rather than a single job.
    ///
    /// Only the shared template can poison every job. Settings are validated before a batch
    /// starts, so a `Validation` error raised by a running job concerns that job's input alone.
    pub fn is_fatal_for_batch(&self) -> bool {
        matches!(self, Self::TemplateLoad { .. } | Self::MaskEmpty { .. })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
