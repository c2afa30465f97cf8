use crate::foundation::core::{Fps, Frame, FrameIndex};
use crate::foundation::error::{VertikalError, VertikalResult};
use crate::source::FrameSource;

/// How many frames a job emits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncTarget {
    /// Exactly this many frames, looping the source as needed.
    Frames(u64),
    /// One pass over the source.
    SourceLength,
}

impl SyncTarget {
    /// `round(secs * rate)` frames.
    pub fn from_duration(secs: f64, rate: Fps) -> VertikalResult<Self> {
        if !secs.is_finite() || secs < 0.0 {
            return Err(VertikalError::validation(format!(
                "target duration must be finite and >= 0, got {secs}"
            )));
        }
        Ok(Self::Frames(rate.secs_to_frames_round(secs)))
    }
}

/// One emitted frame and where it came from.
#[derive(Clone, Debug)]
pub struct SyncedFrame {
    /// Output position.
    pub index: FrameIndex,
    /// Position within the (looped) source, `index mod source_len`.
    pub source_index: u64,
    /// Pixels.
    pub frame: Frame,
}

/// Emits exactly the target number of frames from a restartable source.
///
/// The source is rewound when exhausted and never read past the target.
#[derive(Clone, Debug)]
pub struct DurationSynchronizer {
    target: SyncTarget,
    emitted: u64,
    source_len: Option<u64>,
    pos: u64,
    loops: u64,
}

impl DurationSynchronizer {
    /// Synchronizer for `target`.
    pub fn new(target: SyncTarget) -> Self {
        Self {
            target,
            emitted: 0,
            source_len: None,
            pos: 0,
            loops: 0,
        }
    }

    /// Synchronizer emitting `round(secs * rate)` frames.
    pub fn for_duration(secs: f64, rate: Fps) -> VertikalResult<Self> {
        Ok(Self::new(SyncTarget::from_duration(secs, rate)?))
    }

    /// Configured target.
    pub fn target(&self) -> SyncTarget {
        self.target
    }

    /// Frames emitted so far.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Times the source was restarted.
    pub fn loops(&self) -> u64 {
        self.loops
    }

    /// Source length, once a full pass has been observed.
    pub fn source_len(&self) -> Option<u64> {
        self.source_len
    }

    /// Return `true` once the target count has been emitted.
    pub fn is_done(&self) -> bool {
        matches!(self.target, SyncTarget::Frames(n) if self.emitted >= n)
    }

    /// Next output frame, or `None` once the target is reached.
    pub fn next(&mut self, source: &mut dyn FrameSource) -> VertikalResult<Option<SyncedFrame>> {
        if self.is_done() {
            return Ok(None);
        }

        let frame = match source.next_frame()? {
            Some(f) => f,
            None => {
                if self.pos == 0 {
                    return Err(VertikalError::empty_source(source.name().to_string()));
                }
                if self.target == SyncTarget::SourceLength {
                    self.source_len = Some(self.pos);
                    return Ok(None);
                }
                self.source_len.get_or_insert(self.pos);
                source.rewind()?;
                self.pos = 0;
                self.loops += 1;
                tracing::debug!(source = source.name(), loops = self.loops, "source looped");
                source
                    .next_frame()?
                    .ok_or_else(|| VertikalError::empty_source(source.name().to_string()))?
            }
        };

        let out = SyncedFrame {
            index: FrameIndex(self.emitted),
            source_index: self.pos,
            frame,
        };
        self.pos += 1;
        self.emitted += 1;
        Ok(Some(out))
    }

    /// Drive the loop to completion, handing every frame to `emit`; returns the frame count.
    pub fn run(
        &mut self,
        source: &mut dyn FrameSource,
        mut emit: impl FnMut(SyncedFrame) -> VertikalResult<()>,
    ) -> VertikalResult<u64> {
        while let Some(frame) = self.next(source)? {
            emit(frame)?;
        }
        Ok(self.emitted)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timing/sync.rs"]
mod tests;
