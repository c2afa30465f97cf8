use crate::foundation::core::{Fps, Frame};
use crate::foundation::error::VertikalResult;
use crate::source::FrameSource;

/// Frames held in memory.
#[derive(Clone, Debug)]
pub struct MemorySource {
    name: String,
    fps: Fps,
    frames: Vec<Frame>,
    pos: usize,
}

impl MemorySource {
    /// Source replaying `frames` at `fps`.
    pub fn new(name: impl Into<String>, fps: Fps, frames: Vec<Frame>) -> Self {
        Self {
            name: name.into(),
            fps,
            frames,
            pos: 0,
        }
    }

    /// `count` solid frames whose red channel encodes the frame index (mod 256).
    pub fn numbered(name: impl Into<String>, fps: Fps, width: u32, height: u32, count: usize) -> Self {
        let frames = (0..count)
            .map(|i| Frame::from_pixel(width, height, image::Rgba([(i % 256) as u8, 0, 0, 255])))
            .collect();
        Self::new(name, fps, frames)
    }

    /// Number of frames held.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Return `true` when no frames are held.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl FrameSource for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fps(&self) -> Fps {
        self.fps
    }

    fn dimensions(&self) -> (u32, u32) {
        self.frames.first().map_or((0, 0), |f| f.dimensions())
    }

    fn frame_count_hint(&self) -> Option<u64> {
        Some(self.frames.len() as u64)
    }

    fn next_frame(&mut self) -> VertikalResult<Option<Frame>> {
        let frame = self.frames.get(self.pos).cloned();
        if frame.is_some() {
            self.pos += 1;
        }
        Ok(frame)
    }

    fn rewind(&mut self) -> VertikalResult<()> {
        self.pos = 0;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/memory.rs"]
mod tests;
