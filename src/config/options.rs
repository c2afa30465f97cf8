use std::path::PathBuf;

use crate::foundation::core::Rgb8;
use crate::foundation::error::{VertikalError, VertikalResult};

/// Which compositing mode a batch runs in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingMode {
    /// Chroma-key each source into a template, one output per source.
    Greenscreen,
    /// Blurred-background reframing, one output per source.
    Blur,
    /// Concatenate all sources, chroma-key into a template, length driven by narration audio.
    Narasi,
}

impl ProcessingMode {
    /// Stable lowercase name, used for output folder names.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Greenscreen => "greenscreen",
            Self::Blur => "blur",
            Self::Narasi => "narasi",
        }
    }

    /// Return `true` for modes that composite onto a template.
    pub fn uses_template(self) -> bool {
        matches!(self, Self::Greenscreen | Self::Narasi)
    }
}

impl std::fmt::Display for ProcessingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn check_range(name: &str, v: f32, lo: f32, hi: f32) -> VertikalResult<f32> {
    if !v.is_finite() || v < lo || v > hi {
        return Err(VertikalError::validation(format!(
            "{name} must be within [{lo}, {hi}], got {v}"
        )));
    }
    Ok(v)
}

/// Raw text overlay settings as they appear in a batch config file.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextConfig {
    /// Draw the caption at all.
    pub enabled: bool,
    /// Horizontal placement within the free space, 0..=100.
    pub x_percent: f32,
    /// Vertical placement within the free space, 0..=100.
    pub y_percent: f32,
    /// Font size in pixels, 20..=120.
    pub size: u32,
    /// Font family name or path to a `.ttf`/`.otf` file.
    pub font: String,
    /// `#rrggbb` text color.
    pub color: String,
    /// Fixed caption; when absent the caption is derived from the input name.
    pub content: Option<String>,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            x_percent: 50.0,
            y_percent: 50.0,
            size: 60,
            font: "Arial".to_string(),
            color: "#000000".to_string(),
            content: None,
        }
    }
}

/// Validated text overlay settings.
#[derive(Clone, Debug, PartialEq)]
pub struct TextSpec {
    enabled: bool,
    x_percent: f32,
    y_percent: f32,
    size: u32,
    font: String,
    color: Rgb8,
    content: Option<String>,
}

impl TextSpec {
    /// Smallest accepted font size.
    pub const MIN_SIZE: u32 = 20;
    /// Largest accepted font size.
    pub const MAX_SIZE: u32 = 120;

    /// Validate raw settings.
    pub fn new(cfg: TextConfig) -> VertikalResult<Self> {
        let x_percent = check_range("text x_percent", cfg.x_percent, 0.0, 100.0)?;
        let y_percent = check_range("text y_percent", cfg.y_percent, 0.0, 100.0)?;
        if !(Self::MIN_SIZE..=Self::MAX_SIZE).contains(&cfg.size) {
            return Err(VertikalError::validation(format!(
                "text size must be within [{}, {}], got {}",
                Self::MIN_SIZE,
                Self::MAX_SIZE,
                cfg.size
            )));
        }
        let color = Rgb8::from_hex(&cfg.color)?;
        Ok(Self {
            enabled: cfg.enabled,
            x_percent,
            y_percent,
            size: cfg.size,
            font: cfg.font,
            color,
            content: cfg.content.filter(|c| !c.trim().is_empty()),
        })
    }

    /// Overlay that draws nothing.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            x_percent: 50.0,
            y_percent: 50.0,
            size: 60,
            font: String::new(),
            color: Rgb8::BLACK,
            content: None,
        }
    }

    /// Whether the overlay is drawn.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Horizontal placement percent.
    pub fn x_percent(&self) -> f32 {
        self.x_percent
    }

    /// Vertical placement percent.
    pub fn y_percent(&self) -> f32 {
        self.y_percent
    }

    /// Font size in pixels.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Font identifier.
    pub fn font(&self) -> &str {
        &self.font
    }

    /// Text color.
    pub fn color(&self) -> Rgb8 {
        self.color
    }

    /// Fixed caption override, if configured.
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Caption for an input: the override, or the name with underscores turned into spaces.
    pub fn caption_for(&self, input_stem: &str) -> String {
        match self.content() {
            Some(c) => c.to_string(),
            None => input_stem.replace('_', " ").trim().to_string(),
        }
    }
}

/// Raw blur reframing settings as they appear in a batch config file.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BlurConfig {
    /// Percent of source height removed from the top, 0..=40.
    pub crop_top_percent: f32,
    /// Percent of source height removed from the bottom, 0..=40.
    pub crop_bottom_percent: f32,
    /// Horizontal inset placement, 0..=100.
    pub x_percent: f32,
    /// Vertical inset placement, 0..=100.
    pub y_percent: f32,
}

impl Default for BlurConfig {
    fn default() -> Self {
        Self {
            crop_top_percent: 0.0,
            crop_bottom_percent: 0.0,
            x_percent: 50.0,
            y_percent: 50.0,
        }
    }
}

/// Validated blur reframing settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlurSpec {
    crop_top_percent: f32,
    crop_bottom_percent: f32,
    x_percent: f32,
    y_percent: f32,
}

impl BlurSpec {
    /// Largest accepted crop per edge.
    pub const MAX_CROP_PERCENT: f32 = 40.0;

    /// Validate raw settings.
    pub fn new(cfg: BlurConfig) -> VertikalResult<Self> {
        Ok(Self {
            crop_top_percent: check_range(
                "blur crop_top_percent",
                cfg.crop_top_percent,
                0.0,
                Self::MAX_CROP_PERCENT,
            )?,
            crop_bottom_percent: check_range(
                "blur crop_bottom_percent",
                cfg.crop_bottom_percent,
                0.0,
                Self::MAX_CROP_PERCENT,
            )?,
            x_percent: check_range("blur x_percent", cfg.x_percent, 0.0, 100.0)?,
            y_percent: check_range("blur y_percent", cfg.y_percent, 0.0, 100.0)?,
        })
    }

    /// Percent cropped from the top.
    pub fn crop_top_percent(&self) -> f32 {
        self.crop_top_percent
    }

    /// Percent cropped from the bottom.
    pub fn crop_bottom_percent(&self) -> f32 {
        self.crop_bottom_percent
    }

    /// Horizontal placement percent.
    pub fn x_percent(&self) -> f32 {
        self.x_percent
    }

    /// Vertical placement percent.
    pub fn y_percent(&self) -> f32 {
        self.y_percent
    }
}

impl Default for BlurSpec {
    fn default() -> Self {
        Self {
            crop_top_percent: 0.0,
            crop_bottom_percent: 0.0,
            x_percent: 50.0,
            y_percent: 50.0,
        }
    }
}

/// Linear volume in percent, 0..=100.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct VolumePercent(u8);

impl VolumePercent {
    /// Unattenuated.
    pub const FULL: VolumePercent = VolumePercent(100);

    /// Validate a percent value.
    pub fn new(percent: u32) -> VertikalResult<Self> {
        if percent > 100 {
            return Err(VertikalError::validation(format!(
                "volume must be within [0, 100], got {percent}"
            )));
        }
        Ok(Self(percent as u8))
    }

    /// Raw percent.
    pub fn percent(self) -> u8 {
        self.0
    }

    /// Linear gain factor.
    pub fn gain(self) -> f32 {
        f32::from(self.0) / 100.0
    }
}

/// Which audio tracks a greenscreen/blur job carries.
///
/// Background-only and dual audio are mutually exclusive by construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioMode {
    /// Keep the source's own audio.
    Original,
    /// Replace the source audio with a random background track.
    Background,
    /// Mix the source audio with a random background track.
    Dual,
}

impl AudioMode {
    /// Resolve the two independent toggles; dual audio takes precedence.
    pub fn from_toggles(background_enabled: bool, dual_audio_enabled: bool) -> Self {
        if dual_audio_enabled {
            Self::Dual
        } else if background_enabled {
            Self::Background
        } else {
            Self::Original
        }
    }

    /// Return `true` when a background folder is required.
    pub fn needs_background(self) -> bool {
        !matches!(self, Self::Original)
    }
}

/// Raw audio settings as they appear in a batch config file.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AudioConfig {
    /// Background music only.
    pub background_enabled: bool,
    /// Original plus background music.
    pub dual_audio_enabled: bool,
    /// Gain of the source's own audio in dual mode, 0..=100.
    pub original_volume: u32,
    /// Gain of the background track, 0..=100.
    pub background_volume: u32,
    /// Folder that background tracks are picked from.
    pub background_folder: Option<PathBuf>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            background_enabled: false,
            dual_audio_enabled: false,
            original_volume: 100,
            background_volume: 30,
            background_folder: None,
        }
    }
}

/// Validated audio settings.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioSettings {
    mode: AudioMode,
    original_volume: VolumePercent,
    background_volume: VolumePercent,
    background_folder: Option<PathBuf>,
}

impl AudioSettings {
    /// Validate raw settings.
    pub fn new(cfg: AudioConfig) -> VertikalResult<Self> {
        Ok(Self {
            mode: AudioMode::from_toggles(cfg.background_enabled, cfg.dual_audio_enabled),
            original_volume: VolumePercent::new(cfg.original_volume)?,
            background_volume: VolumePercent::new(cfg.background_volume)?,
            background_folder: cfg.background_folder,
        })
    }

    /// Keep the original audio only.
    pub fn original_only() -> Self {
        Self {
            mode: AudioMode::Original,
            original_volume: VolumePercent::FULL,
            background_volume: VolumePercent::FULL,
            background_folder: None,
        }
    }

    /// Effective audio mode.
    pub fn mode(&self) -> AudioMode {
        self.mode
    }

    /// Gain of the original track in dual mode.
    pub fn original_volume(&self) -> VolumePercent {
        self.original_volume
    }

    /// Gain of the background track.
    pub fn background_volume(&self) -> VolumePercent {
        self.background_volume
    }

    /// Folder background tracks are picked from.
    pub fn background_folder(&self) -> Option<&std::path::Path> {
        self.background_folder.as_deref()
    }

    /// Short human-readable description for batch summaries.
    pub fn describe(&self) -> String {
        match self.mode {
            AudioMode::Original => "original audio only".to_string(),
            AudioMode::Background => format!(
                "background music {}%",
                self.background_volume.percent()
            ),
            AudioMode::Dual => format!(
                "dual audio: original {}% + background {}%",
                self.original_volume.percent(),
                self.background_volume.percent()
            ),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/options.rs"]
mod tests;
