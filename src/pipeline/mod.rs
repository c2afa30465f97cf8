//! Batch orchestration: validation, per-job state machine, worker thread.

/// Batch preparation, input enumeration and the sequential job loop.
pub mod batch;
/// Media collaborators (decode, encode, mux) behind one seam.
pub mod io;
/// One composition job from sources to finished file.
pub mod job;
/// Job stages and stage-tagged failures.
pub mod stage;
/// Background worker thread with progress and cancellation.
pub mod worker;

pub use batch::{Batch, BatchReport, JobFailure, Progress};
pub use io::{FfmpegIo, MediaIo};
pub use job::{CompositionJob, FrameComposer, JobLength, JobOutcome};
pub use stage::{JobError, Stage, StageTracker};
pub use worker::BatchWorker;
