use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::assets::media::AudioPcm;
use crate::audio::mix::{AudioMixer, AudioTrackRef};
use crate::config::options::{BlurSpec, TextSpec};
use crate::effects::chroma::ChromaKeyLayer;
use crate::effects::reframe::BlurCompositor;
use crate::encode::ffmpeg::open_first;
use crate::encode::sink::SinkConfig;
use crate::foundation::core::{Canvas, Frame};
use crate::foundation::error::{VertikalError, VertikalResult};
use crate::pipeline::io::{IoAudioDecoder, MediaIo};
use crate::pipeline::stage::{JobError, Stage, StageTracker};
use crate::source::{FrameSource, concatenate};
use crate::text::layout::{TextLayoutEngine, TextOverlay};
use crate::timing::sync::{DurationSynchronizer, SyncTarget};

/// Per-frame compositing step shared by every job of a batch.
#[derive(Clone)]
pub enum FrameComposer {
    /// Chroma-key the source into a (possibly animated) template.
    Chroma(Arc<ChromaKeyLayer>),
    /// Blurred-background reframing.
    Blur {
        /// Compositor for the batch canvas.
        compositor: BlurCompositor,
        /// Crop and placement.
        placement: BlurSpec,
    },
}

impl FrameComposer {
    /// Composite output frame `out_idx` from `source`.
    pub fn compose(&self, out_idx: u64, source: &Frame) -> VertikalResult<Frame> {
        match self {
            Self::Chroma(layer) => layer.compose(out_idx, source),
            Self::Blur { compositor, placement } => compositor.compose(source, placement),
        }
    }
}

/// What decides how many frames a job emits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobLength {
    /// One pass over the (joined) source.
    SourceLength,
    /// The duration of this audio file; the source loops or is cut to match.
    AudioLength(PathBuf),
}

/// One unit of work: inputs in, one finished MP4 out.
#[derive(Clone, Debug)]
pub struct CompositionJob {
    /// Display name used in progress and reports.
    pub name: String,
    /// Source files; more than one are concatenated in order.
    pub inputs: Vec<PathBuf>,
    /// Caption drawn by the text overlay.
    pub caption: String,
    /// Audio tracks mixed into the output (at most two).
    pub audio_tracks: Vec<AudioTrackRef>,
    /// Track used alone when none of `audio_tracks` is usable.
    pub fallback_audio: Option<AudioTrackRef>,
    /// Target length.
    pub length: JobLength,
    /// Final output path.
    pub output: PathBuf,
}

/// Shared, read-only collaborators a job runs against.
pub struct JobContext<'a> {
    /// Media collaborators.
    pub io: &'a dyn MediaIo,
    /// Per-frame compositor.
    pub composer: &'a FrameComposer,
    /// Caption layout engine.
    pub text_engine: &'a TextLayoutEngine,
    /// Caption settings.
    pub text: &'a TextSpec,
    /// Output raster.
    pub canvas: Canvas,
    /// Candidate encoders, in order.
    pub encoders: &'a [String],
    /// Audio mixer.
    pub mixer: AudioMixer,
}

/// Result of a successful job.
#[derive(Clone, Debug)]
pub struct JobOutcome {
    /// Written file.
    pub output: PathBuf,
    /// Frames encoded.
    pub frames: u64,
    /// Encoder that was used.
    pub encoder: String,
    /// Whether the output carries an audio stream.
    pub has_audio: bool,
    /// Stages walked, `Idle` through `Done`.
    pub stages: Vec<Stage>,
}

impl CompositionJob {
    /// Run the job; the scratch directory is removed whether it succeeds or fails.
    #[tracing::instrument(skip_all, fields(job = %self.name))]
    pub fn run(&self, ctx: &JobContext<'_>) -> Result<JobOutcome, JobError> {
        let mut tracker = StageTracker::new();
        let scratch = tempfile::Builder::new()
            .prefix("vertikal-job-")
            .tempdir()
            .map_err(|e| {
                tracker.fail(
                    Some(Stage::Idle),
                    VertikalError::media(format!("failed to create scratch directory: {e}")),
                )
            })?;

        let result = self.run_stages(ctx, &mut tracker, scratch.path());
        match &result {
            Ok(outcome) => tracing::info!(
                output = %outcome.output.display(),
                frames = outcome.frames,
                encoder = %outcome.encoder,
                audio = outcome.has_audio,
                "job done"
            ),
            Err(e) => tracing::warn!(stage = %e.stage, error = %e.source, "job failed"),
        }
        if let Err(e) = scratch.close() {
            tracing::warn!(error = %e, "failed to remove job scratch directory");
        }
        result
    }

    fn run_stages(
        &self,
        ctx: &JobContext<'_>,
        tracker: &mut StageTracker,
        scratch: &Path,
    ) -> Result<JobOutcome, JobError> {
        macro_rules! step {
            ($e:expr) => {
                $e.map_err(|e| tracker.fail(None, e))?
            };
        }

        step!(tracker.advance(Stage::Validating));
        if self.inputs.is_empty() {
            return Err(tracker.fail(None, VertikalError::validation("job has no inputs")));
        }
        if self.audio_tracks.len() > crate::audio::mix::MAX_TRACKS {
            return Err(tracker.fail(
                None,
                VertikalError::validation("a job mixes at most two audio tracks"),
            ));
        }
        let mut sources = Vec::with_capacity(self.inputs.len());
        for input in &self.inputs {
            sources.push(step!(ctx.io.open_source(input)));
        }
        let audio_secs = match &self.length {
            JobLength::SourceLength => None,
            JobLength::AudioLength(path) => Some(step!(ctx.io.audio_duration(path))),
        };

        let mut source: Box<dyn FrameSource> = if sources.len() > 1 {
            step!(tracker.advance(Stage::Concatenating));
            let joined = step!(concatenate(sources));
            tracing::info!(
                clips = joined.source_count(),
                frames = ?joined.frame_count_hint(),
                "clips concatenated"
            );
            Box::new(joined)
        } else {
            match sources.pop() {
                Some(s) => s,
                None => {
                    return Err(tracker.fail(None, VertikalError::validation("job has no inputs")));
                }
            }
        };

        let fps = source.fps();
        let target = match audio_secs {
            Some(secs) => {
                let target = step!(SyncTarget::from_duration(secs, fps));
                if target == SyncTarget::Frames(0) {
                    return Err(tracker.fail(
                        None,
                        VertikalError::validation(format!(
                            "target duration {secs:.3}s rounds to zero frames"
                        )),
                    ));
                }
                target
            }
            None => SyncTarget::SourceLength,
        };

        step!(tracker.advance(Stage::Compositing));
        step!(tracker.advance(Stage::TextOverlay));
        let overlay = TextOverlay::prepare(ctx.text_engine, ctx.text, &self.caption);

        step!(tracker.advance(Stage::Synchronizing));
        let silent = scratch.join("video.mp4");
        let cfg = SinkConfig {
            width: ctx.canvas.width,
            height: ctx.canvas.height,
            fps,
        };
        let (encoder, mut sink) =
            step!(open_first(ctx.encoders, |enc| ctx.io.open_sink(enc, &silent, cfg)));

        let mut sync = DurationSynchronizer::new(target);
        let mut failed_at = Stage::Synchronizing;
        let emitted = sync.run(source.as_mut(), |synced| {
            let mut frame = ctx.composer.compose(synced.index.0, &synced.frame).inspect_err(|_| {
                failed_at = Stage::Compositing;
            })?;
            if let Some(overlay) = &overlay {
                overlay.apply(&mut frame).inspect_err(|_| {
                    failed_at = Stage::TextOverlay;
                })?;
            }
            sink.push_frame(synced.index, &frame)
        });
        let emitted = match emitted {
            Ok(n) => n,
            Err(e) => return Err(tracker.fail(Some(failed_at), e)),
        };
        step!(sink.end());
        drop(sink);
        if emitted == 0 {
            return Err(tracker.fail(
                None,
                VertikalError::empty_source(source.name().to_string()),
            ));
        }
        let target_secs = audio_secs.unwrap_or_else(|| fps.frames_to_secs(emitted));
        tracing::debug!(frames = emitted, loops = sync.loops(), secs = target_secs, "frames encoded");

        step!(tracker.advance(Stage::AudioMixing));
        let decoder = IoAudioDecoder(ctx.io);
        let mut audio = step!(ctx.mixer.mix(&self.audio_tracks, target_secs, &decoder));
        if audio.is_none()
            && let Some(fallback) = &self.fallback_audio
        {
            tracing::info!(track = %fallback.path.display(), "no usable audio track, using fallback");
            audio = step!(ctx.mixer.mix(std::slice::from_ref(fallback), target_secs, &decoder));
        }

        step!(tracker.advance(Stage::Finalizing));
        let has_audio = step!(self.finalize(ctx, &silent, audio.as_ref(), scratch));

        step!(tracker.advance(Stage::Done));
        Ok(JobOutcome {
            output: self.output.clone(),
            frames: emitted,
            encoder,
            has_audio,
            stages: tracker.history().to_vec(),
        })
    }

    // A failed mux still delivers the video without audio.
    fn finalize(
        &self,
        ctx: &JobContext<'_>,
        silent: &Path,
        audio: Option<&AudioPcm>,
        scratch: &Path,
    ) -> VertikalResult<bool> {
        match ctx.io.mux(silent, audio, &self.output, scratch) {
            Ok(()) => Ok(audio.is_some()),
            Err(e) if audio.is_some() => {
                tracing::warn!(error = %e, "audio mux failed, writing video without audio");
                ctx.io.copy_video(silent, &self.output)?;
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/job.rs"]
mod tests;
