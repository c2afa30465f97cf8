use std::path::Path;

use crate::assets::decode::{DecodedAnimation, decode_gif_file};
use crate::foundation::core::{Fps, Frame};
use crate::foundation::error::{VertikalError, VertikalResult};
use crate::source::{FrameSource, MemorySource};

/// Rate used when a GIF carries no frame delays.
pub const DEFAULT_GIF_FPS: f64 = 10.0;
/// Upper bound for the nominal GIF rate.
pub const MAX_GIF_FPS: f64 = 60.0;

/// Nominal rate for a mean frame delay, clamped to `1..=60` fps.
pub fn fps_for_mean_delay(mean_delay_ms: f64) -> VertikalResult<Fps> {
    let fps = if mean_delay_ms.is_finite() && mean_delay_ms > 0.0 {
        (1000.0 / mean_delay_ms).clamp(1.0, MAX_GIF_FPS)
    } else {
        DEFAULT_GIF_FPS
    };
    Fps::from_f64(fps)
}

/// Decoded animated image replayed at its mean frame rate.
#[derive(Clone, Debug)]
pub struct AnimatedSource {
    inner: MemorySource,
}

impl AnimatedSource {
    /// Decode the GIF at `path`.
    pub fn open(path: &Path) -> VertikalResult<Self> {
        let anim = decode_gif_file(path)?;
        if anim.frames.is_empty() {
            return Err(VertikalError::empty_source(path.display().to_string()));
        }
        Self::from_animation(path.display().to_string(), anim)
    }

    /// Source over already-decoded frames.
    pub fn from_animation(name: impl Into<String>, anim: DecodedAnimation) -> VertikalResult<Self> {
        let fps = fps_for_mean_delay(anim.mean_delay_ms())?;
        Ok(Self {
            inner: MemorySource::new(name, fps, anim.frames),
        })
    }
}

impl FrameSource for AnimatedSource {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn fps(&self) -> Fps {
        self.inner.fps()
    }

    fn dimensions(&self) -> (u32, u32) {
        self.inner.dimensions()
    }

    fn frame_count_hint(&self) -> Option<u64> {
        self.inner.frame_count_hint()
    }

    fn next_frame(&mut self) -> VertikalResult<Option<Frame>> {
        self.inner.next_frame()
    }

    fn rewind(&mut self) -> VertikalResult<()> {
        self.inner.rewind()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/animated.rs"]
mod tests;
