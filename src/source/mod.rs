//! Restartable frame sources.

use std::path::Path;

use crate::assets::decode::is_gif_path;
use crate::foundation::core::{Fps, Frame};
use crate::foundation::error::VertikalResult;

/// GIF-backed source.
pub mod animated;
/// Back-to-back union of several sources.
pub mod concat;
/// In-memory frame list.
pub mod memory;
/// ffmpeg-decoded video file.
pub mod video;

pub use animated::AnimatedSource;
pub use concat::{ConcatSource, concatenate};
pub use memory::MemorySource;
pub use video::VideoFileSource;

/// Ordered, finite, restartable sequence of frames with a nominal rate.
pub trait FrameSource: Send {
    /// Human readable name for logs and progress.
    fn name(&self) -> &str;

    /// Nominal playback rate.
    fn fps(&self) -> Fps;

    /// Frame dimensions `(width, height)`.
    fn dimensions(&self) -> (u32, u32);

    /// Total frames, when known without decoding.
    fn frame_count_hint(&self) -> Option<u64>;

    /// Next frame, or `None` once exhausted.
    fn next_frame(&mut self) -> VertikalResult<Option<Frame>>;

    /// Restart from the first frame.
    fn rewind(&mut self) -> VertikalResult<()>;

    /// Duration in seconds derived from the frame count hint.
    fn duration_hint(&self) -> Option<f64> {
        self.frame_count_hint()
            .map(|n| self.fps().frames_to_secs(n))
    }
}

/// Open `path` as a GIF or video source depending on its extension.
pub fn open_source(path: &Path) -> VertikalResult<Box<dyn FrameSource>> {
    if is_gif_path(path) {
        Ok(Box::new(AnimatedSource::open(path)?))
    } else {
        Ok(Box::new(VideoFileSource::open(path)?))
    }
}
