use crate::foundation::error::{VertikalError, VertikalResult};

/// Lifecycle of one composition job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Not started.
    Idle,
    /// Inputs opened and target length resolved.
    Validating,
    /// Narasi clips joined into one source.
    Concatenating,
    /// Compositor ready for frames.
    Compositing,
    /// Caption rasterized.
    TextOverlay,
    /// Frames pulled, composited and encoded up to the target count.
    Synchronizing,
    /// Audio tracks aligned and mixed.
    AudioMixing,
    /// Audio muxed into the final file.
    Finalizing,
    /// Output written.
    Done,
    /// Aborted with an error.
    Failed,
}

impl Stage {
    /// Lowercase stage name for logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::Concatenating => "concatenating",
            Self::Compositing => "compositing",
            Self::TextOverlay => "text overlay",
            Self::Synchronizing => "synchronizing",
            Self::AudioMixing => "audio mixing",
            Self::Finalizing => "finalizing",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    /// Return `true` for `Done` and `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Whether `self -> next` is a legal transition.
    pub fn can_advance_to(self, next: Stage) -> bool {
        use Stage::*;
        if next == Failed {
            return !self.is_terminal();
        }
        matches!(
            (self, next),
            (Idle, Validating)
                | (Validating, Concatenating)
                | (Validating, Compositing)
                | (Concatenating, Compositing)
                | (Compositing, TextOverlay)
                | (TextOverlay, Synchronizing)
                | (Synchronizing, AudioMixing)
                | (AudioMixing, Finalizing)
                | (Finalizing, Done)
        )
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A job failure and the stage it happened in.
#[derive(thiserror::Error, Debug)]
#[error("{stage} failed: {source}")]
pub struct JobError {
    /// Stage that failed.
    pub stage: Stage,
    /// Underlying error.
    #[source]
    pub source: VertikalError,
}

impl JobError {
    /// Tag `source` with `stage`.
    pub fn at(stage: Stage, source: VertikalError) -> Self {
        Self { stage, source }
    }
}

/// Records the stages a job walks through and rejects illegal transitions.
#[derive(Clone, Debug)]
pub struct StageTracker {
    current: Stage,
    history: Vec<Stage>,
}

impl Default for StageTracker {
    fn default() -> Self {
        Self {
            current: Stage::Idle,
            history: vec![Stage::Idle],
        }
    }
}

impl StageTracker {
    /// Tracker in `Idle`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current stage.
    pub fn current(&self) -> Stage {
        self.current
    }

    /// Every stage entered so far, in order.
    pub fn history(&self) -> &[Stage] {
        &self.history
    }

    /// Move to `next`.
    pub fn advance(&mut self, next: Stage) -> VertikalResult<()> {
        if !self.current.can_advance_to(next) {
            return Err(VertikalError::validation(format!(
                "illegal stage transition {} -> {}",
                self.current, next
            )));
        }
        tracing::debug!(from = %self.current, to = %next, "job stage");
        self.current = next;
        self.history.push(next);
        Ok(())
    }

    /// Enter `Failed` and tag `err` with `stage` (the current stage when `None`).
    pub fn fail(&mut self, stage: Option<Stage>, err: VertikalError) -> JobError {
        let stage = stage.unwrap_or(self.current);
        if !self.current.is_terminal() {
            self.current = Stage::Failed;
            self.history.push(Stage::Failed);
        }
        JobError::at(stage, err)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/stage.rs"]
mod tests;
