use crate::foundation::error::{VertikalError, VertikalResult};

/// One decoded or composited frame: straight-alpha RGBA8, row-major.
pub type Frame = image::RgbaImage;

/// Absolute 0-based index of an emitted output frame.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> VertikalResult<Self> {
        if den == 0 {
            return Err(VertikalError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(VertikalError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Parse an ffprobe-style rate such as `30000/1001` or `25`.
    pub fn parse_ratio(s: &str) -> VertikalResult<Self> {
        let (num, den) = match s.trim().split_once('/') {
            Some((n, d)) => (n.trim(), d.trim()),
            None => (s.trim(), "1"),
        };
        let num = num
            .parse::<u32>()
            .map_err(|e| VertikalError::validation(format!("invalid fps numerator '{num}': {e}")))?;
        let den = den.parse::<u32>().map_err(|e| {
            VertikalError::validation(format!("invalid fps denominator '{den}': {e}"))
        })?;
        Self::new(num, den)
    }

    /// Approximate a floating-point rate with millisecond precision.
    pub fn from_f64(fps: f64) -> VertikalResult<Self> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(VertikalError::validation(format!(
                "fps must be finite and > 0, got {fps}"
            )));
        }
        let num = (fps * 1000.0).round() as u32;
        Self::new(num, 1000)
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Convert frame count to seconds.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * self.frame_duration_secs()
    }

    /// Convert seconds to a frame count, rounding to the nearest frame.
    pub fn secs_to_frames_round(self, secs: f64) -> u64 {
        (secs * self.as_f64()).round().max(0.0) as u64
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Portrait 1080x1920 delivery canvas.
    pub const PORTRAIT_1080: Canvas = Canvas {
        width: 1080,
        height: 1920,
    };

    /// Create a validated canvas; dimensions must be non-zero and even.
    pub fn new(width: u32, height: u32) -> VertikalResult<Self> {
        if width == 0 || height == 0 {
            return Err(VertikalError::validation("canvas width/height must be non-zero"));
        }
        if !width.is_multiple_of(2) || !height.is_multiple_of(2) {
            return Err(VertikalError::validation(
                "canvas width/height must be even (required for yuv420p output)",
            ));
        }
        Ok(Self { width, height })
    }

    /// Number of pixels on the canvas.
    pub fn pixel_count(self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Return `true` when `frame` matches the canvas exactly.
    pub fn matches(self, frame: &Frame) -> bool {
        frame.width() == self.width && frame.height() == self.height
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::PORTRAIT_1080
    }
}

/// Opaque sRGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Rgb8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb8 {
    /// Pure black.
    pub const BLACK: Rgb8 = Rgb8 { r: 0, g: 0, b: 0 };

    /// Parse `#rrggbb` or `rrggbb`.
    pub fn from_hex(s: &str) -> VertikalResult<Self> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(VertikalError::validation(format!(
                "color '{s}' must be a #rrggbb hex string"
            )));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| {
                VertikalError::validation(format!("color '{s}' has invalid hex digits: {e}"))
            })
        };
        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }

    /// Format as lowercase `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
