use std::path::{Path, PathBuf};

use crate::config::options::{
    AudioConfig, AudioSettings, BlurConfig, BlurSpec, ProcessingMode, TextConfig, TextSpec,
};
use crate::encode::ffmpeg::DEFAULT_ENCODERS;
use crate::foundation::core::Canvas;
use crate::foundation::error::{VertikalError, VertikalResult};

fn default_encoders() -> Vec<String> {
    DEFAULT_ENCODERS.iter().map(|s| s.to_string()).collect()
}

/// Batch configuration as stored in a JSON file.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchConfig {
    /// Compositing mode.
    pub mode: ProcessingMode,
    /// Template image or GIF (greenscreen and narasi).
    #[serde(default)]
    pub template: Option<PathBuf>,
    /// Narration audio driving the output length (narasi).
    #[serde(default)]
    pub narration_audio: Option<PathBuf>,
    /// Caption overlay.
    #[serde(default)]
    pub text: TextConfig,
    /// Blur reframing (blur mode).
    #[serde(default)]
    pub blur: BlurConfig,
    /// Audio tracks (greenscreen and blur).
    #[serde(default)]
    pub audio: AudioConfig,
    /// Output raster.
    #[serde(default)]
    pub canvas: Canvas,
    /// Root folder for outputs; defaults to the folder of the first input.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    /// Candidate H.264 encoders, tried in order.
    #[serde(default = "default_encoders")]
    pub encoders: Vec<String>,
}

impl BatchConfig {
    /// Minimal configuration for `mode` with every other field at its default.
    pub fn new(mode: ProcessingMode) -> Self {
        Self {
            mode,
            template: None,
            narration_audio: None,
            text: TextConfig::default(),
            blur: BlurConfig::default(),
            audio: AudioConfig::default(),
            canvas: Canvas::default(),
            output_dir: None,
            encoders: default_encoders(),
        }
    }

    /// Parse a configuration from JSON text.
    pub fn from_json_str(s: &str) -> VertikalResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| VertikalError::validation(format!("batch config parse failed: {e}")))
    }

    /// Read and parse a configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> VertikalResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            VertikalError::validation(format!(
                "failed to read batch config '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_json_str(&text)
    }

    /// Range-check every field and build the immutable settings used by the pipeline.
    pub fn validate(self) -> VertikalResult<BatchSettings> {
        let canvas = Canvas::new(self.canvas.width, self.canvas.height)?;
        let encoders: Vec<String> = self
            .encoders
            .into_iter()
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .collect();
        if encoders.is_empty() {
            return Err(VertikalError::validation(
                "at least one candidate encoder is required",
            ));
        }
        Ok(BatchSettings {
            mode: self.mode,
            template: self.template,
            narration_audio: self.narration_audio,
            text: TextSpec::new(self.text)?,
            blur: BlurSpec::new(self.blur)?,
            audio: AudioSettings::new(self.audio)?,
            canvas,
            output_dir: self.output_dir,
            encoders,
        })
    }
}

/// Validated, immutable batch settings shared by every job of a batch.
#[derive(Clone, Debug)]
pub struct BatchSettings {
    /// Compositing mode.
    pub mode: ProcessingMode,
    /// Template image or GIF.
    pub template: Option<PathBuf>,
    /// Narration audio (narasi).
    pub narration_audio: Option<PathBuf>,
    /// Caption overlay.
    pub text: TextSpec,
    /// Blur reframing.
    pub blur: BlurSpec,
    /// Audio tracks.
    pub audio: AudioSettings,
    /// Output raster.
    pub canvas: Canvas,
    /// Root folder for outputs.
    pub output_dir: Option<PathBuf>,
    /// Candidate encoders, in order.
    pub encoders: Vec<String>,
}

#[cfg(test)]
#[path = "../../tests/unit/config/batch.rs"]
mod tests;
