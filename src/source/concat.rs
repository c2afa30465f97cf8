use crate::effects::resample::stretch_to;
use crate::foundation::core::{Fps, Frame};
use crate::foundation::error::{VertikalError, VertikalResult};
use crate::source::FrameSource;

/// Plays its sources back to back, resampled to the first source's resolution.
pub struct ConcatSource {
    name: String,
    sources: Vec<Box<dyn FrameSource>>,
    current: usize,
    width: u32,
    height: u32,
    fps: Fps,
}

/// Join `sources` in order; the first source sets resolution and nominal rate.
pub fn concatenate(sources: Vec<Box<dyn FrameSource>>) -> VertikalResult<ConcatSource> {
    let first = sources
        .first()
        .ok_or_else(|| VertikalError::validation("nothing to concatenate"))?;
    let (width, height) = first.dimensions();
    if width == 0 || height == 0 {
        return Err(VertikalError::empty_source(first.name().to_string()));
    }
    let fps = first.fps();
    for s in &sources[1..] {
        if s.fps() != fps {
            tracing::debug!(
                source = s.name(),
                fps = s.fps().as_f64(),
                target = fps.as_f64(),
                "concatenated source plays at the first source's rate"
            );
        }
    }
    let name = format!("concat of {} sources", sources.len());
    Ok(ConcatSource {
        name,
        sources,
        current: 0,
        width,
        height,
        fps,
    })
}

impl ConcatSource {
    /// Number of joined sources.
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }
}

impl FrameSource for ConcatSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fps(&self) -> Fps {
        self.fps
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn frame_count_hint(&self) -> Option<u64> {
        self.sources.iter().map(|s| s.frame_count_hint()).sum()
    }

    fn next_frame(&mut self) -> VertikalResult<Option<Frame>> {
        while let Some(source) = self.sources.get_mut(self.current) {
            if let Some(frame) = source.next_frame()? {
                return Ok(Some(stretch_to(&frame, self.width, self.height)));
            }
            self.current += 1;
        }
        Ok(None)
    }

    fn rewind(&mut self) -> VertikalResult<()> {
        for s in &mut self.sources {
            s.rewind()?;
        }
        self.current = 0;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/concat.rs"]
mod tests;
