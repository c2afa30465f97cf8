use std::path::Path;

use crate::assets::media::{VideoDecodeStream, VideoSourceInfo, probe_video};
use crate::foundation::core::{Fps, Frame};
use crate::foundation::error::VertikalResult;
use crate::source::FrameSource;

/// Video file decoded by a streaming `ffmpeg` child; rewinding restarts the decoder.
pub struct VideoFileSource {
    name: String,
    info: VideoSourceInfo,
    stream: Option<VideoDecodeStream>,
}

impl VideoFileSource {
    /// Probe `path`; decoding starts on the first read.
    pub fn open(path: &Path) -> VertikalResult<Self> {
        let info = probe_video(path)?;
        tracing::debug!(
            path = %path.display(),
            width = info.width,
            height = info.height,
            fps = info.fps.as_f64(),
            "probed video"
        );
        Ok(Self {
            name: path.display().to_string(),
            info,
            stream: None,
        })
    }

    /// Probe metadata.
    pub fn info(&self) -> &VideoSourceInfo {
        &self.info
    }
}

impl FrameSource for VideoFileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fps(&self) -> Fps {
        self.info.fps
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.info.width, self.info.height)
    }

    fn frame_count_hint(&self) -> Option<u64> {
        self.info.frame_count.or_else(|| {
            self.info
                .duration_sec
                .map(|d| self.info.fps.secs_to_frames_round(d))
        })
    }

    fn next_frame(&mut self) -> VertikalResult<Option<Frame>> {
        if self.stream.is_none() {
            self.stream = Some(VideoDecodeStream::spawn(&self.info)?);
        }
        match self.stream.as_mut() {
            Some(stream) => stream.read_frame(),
            None => Ok(None),
        }
    }

    fn rewind(&mut self) -> VertikalResult<()> {
        // Dropping the stream kills and reaps the decoder.
        self.stream = None;
        Ok(())
    }
}
