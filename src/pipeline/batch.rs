use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::Rng;
use rand::seq::SliceRandom as _;

use crate::assets::decode::is_gif_path;
use crate::assets::fonts::FontResolver;
use crate::assets::template::TemplateAsset;
use crate::audio::mix::{AudioMixer, AudioTrackRef};
use crate::config::batch::BatchSettings;
use crate::config::options::{AudioMode, ProcessingMode, VolumePercent};
use crate::effects::chroma::ChromaKeyLayer;
use crate::effects::mask::MaskBuilder;
use crate::effects::reframe::BlurCompositor;
use crate::foundation::error::{VertikalError, VertikalResult};
use crate::pipeline::io::MediaIo;
use crate::pipeline::job::{CompositionJob, FrameComposer, JobContext, JobLength, JobOutcome};
use crate::pipeline::stage::Stage;
use crate::text::layout::TextLayoutEngine;

/// Video inputs accepted by extension.
pub const VIDEO_EXTENSIONS: [&str; 8] = ["mp4", "avi", "mov", "mkv", "wmv", "flv", "webm", "m4v"];
/// Animated image inputs accepted by extension.
pub const GIF_EXTENSIONS: [&str; 1] = ["gif"];
/// Template images accepted by extension.
pub const TEMPLATE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "bmp", "webp", "gif"];
/// Audio files accepted by extension.
pub const AUDIO_EXTENSIONS: [&str; 7] = ["mp3", "wav", "aac", "m4a", "ogg", "flac", "wma"];

/// Output file name of a narasi batch.
pub const NARASI_OUTPUT: &str = "narasi_output.mp4";
/// Caption of a narasi output when the text settings carry no fixed content.
pub const NARASI_CAPTION: &str = "Narasi Video";

/// Return `true` when `path` has one of `exts` (case-insensitive).
pub fn has_extension(path: &Path, exts: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| exts.iter().any(|x| x.eq_ignore_ascii_case(e)))
}

/// Return `true` for videos and GIFs.
pub fn is_clip_path(path: &Path) -> bool {
    has_extension(path, &VIDEO_EXTENSIONS) || has_extension(path, &GIF_EXTENSIONS)
}

/// Files directly inside `dir` with one of `exts`, sorted by name.
pub fn list_files_with_extensions(dir: &Path, exts: &[&str]) -> VertikalResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        VertikalError::validation(format!("cannot read folder '{}': {e}", dir.display()))
    })?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| VertikalError::validation(format!("cannot list '{}': {e}", dir.display())))?
            .path();
        if path.is_file() && has_extension(&path, exts) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Expand files and folders into clip inputs; folders are scanned without recursion.
pub fn collect_inputs(paths: &[PathBuf]) -> VertikalResult<Vec<PathBuf>> {
    let mut out = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut exts = VIDEO_EXTENSIONS.to_vec();
            exts.extend(GIF_EXTENSIONS);
            out.extend(list_files_with_extensions(path, &exts)?);
        } else if is_clip_path(path) {
            out.push(path.clone());
        } else {
            tracing::warn!(path = %path.display(), "skipping input with unsupported extension");
        }
    }
    Ok(out)
}

/// `<root>/edited_videos_<mode>` where root is the configured output dir or the first input's folder.
pub fn output_dir_for(mode: ProcessingMode, output_root: Option<&Path>, inputs: &[PathBuf]) -> PathBuf {
    let root = output_root
        .map(Path::to_path_buf)
        .or_else(|| inputs.first().and_then(|p| p.parent()).map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."));
    root.join(format!("edited_videos_{}", mode.as_str()))
}

/// `edited_<stem>.mp4` inside `dir`.
pub fn output_path_for(dir: &Path, input: &Path) -> PathBuf {
    dir.join(format!("edited_{}.mp4", file_stem(input)))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Progress notification sent after each finished job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Progress {
    /// 1-based index of the job that just finished.
    pub current: usize,
    /// Number of jobs in the batch.
    pub total: usize,
    /// Name of the job that just finished.
    pub name: String,
}

/// A job that did not produce output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobFailure {
    /// Job name.
    pub name: String,
    /// Stage that failed.
    pub stage: Stage,
    /// Human readable reason.
    pub reason: String,
}

/// Outcome of a whole batch.
#[derive(Clone, Debug)]
pub struct BatchReport {
    /// Compositing mode.
    pub mode: ProcessingMode,
    /// Jobs that wrote their output.
    pub successful: usize,
    /// Jobs in the batch.
    pub total: usize,
    /// Written outputs, in job order.
    pub outputs: Vec<PathBuf>,
    /// Failed jobs, in job order.
    pub failures: Vec<JobFailure>,
    /// Whether the batch stopped early on request.
    pub cancelled: bool,
    /// Audio description of the batch.
    pub audio: String,
}

impl BatchReport {
    /// Return `true` when every job succeeded.
    pub fn all_succeeded(&self) -> bool {
        self.successful == self.total
    }

    /// One-line `successful/total` summary.
    pub fn summary(&self) -> String {
        let mut s = format!(
            "{}: {}/{} videos processed ({})",
            self.mode, self.successful, self.total, self.audio
        );
        if self.cancelled {
            s.push_str(", cancelled");
        }
        s
    }
}

/// A validated batch: shared template, masks, caption engine and the job list.
pub struct Batch {
    settings: BatchSettings,
    composer: FrameComposer,
    text_engine: TextLayoutEngine,
    jobs: Vec<CompositionJob>,
}

impl Batch {
    /// Validate `settings` against `inputs`, load the template and build every mask, then plan jobs.
    ///
    /// Settings errors and the batch-fatal template errors (`TemplateLoad`, `MaskEmpty`) surface
    /// here, before any frame is processed.
    pub fn prepare(
        settings: BatchSettings,
        inputs: Vec<PathBuf>,
        fonts: &FontResolver,
        rng: &mut impl Rng,
    ) -> VertikalResult<Self> {
        if inputs.is_empty() {
            return Err(VertikalError::validation("no input videos to process"));
        }
        let canvas = settings.canvas;

        let composer = match settings.mode {
            ProcessingMode::Greenscreen | ProcessingMode::Narasi => {
                let path = settings.template.as_deref().ok_or_else(|| {
                    VertikalError::validation(format!("{} mode needs a template", settings.mode))
                })?;
                if !has_extension(path, &TEMPLATE_EXTENSIONS) {
                    return Err(VertikalError::template_load(path, "unsupported template format"));
                }
                let template = TemplateAsset::load(path, canvas)?;
                let layer = ChromaKeyLayer::prepare(template, &MaskBuilder::default(), canvas)?;
                FrameComposer::Chroma(Arc::new(layer))
            }
            ProcessingMode::Blur => FrameComposer::Blur {
                compositor: BlurCompositor::new(canvas),
                placement: settings.blur,
            },
        };

        let text_engine = TextLayoutEngine::from_resolver(fonts, settings.text.font(), canvas);
        let output_dir = output_dir_for(settings.mode, settings.output_dir.as_deref(), &inputs);

        let jobs = if settings.mode == ProcessingMode::Narasi {
            vec![plan_narasi(&settings, inputs, &output_dir)?]
        } else {
            plan_clips(&settings, inputs, &output_dir, rng)?
        };

        tracing::info!(
            mode = %settings.mode,
            jobs = jobs.len(),
            audio = %settings.audio.describe(),
            output = %output_dir.display(),
            "batch prepared"
        );
        Ok(Self {
            settings,
            composer,
            text_engine,
            jobs,
        })
    }

    /// Planned jobs, in run order.
    pub fn jobs(&self) -> &[CompositionJob] {
        &self.jobs
    }

    /// Settings the batch was prepared with.
    pub fn settings(&self) -> &BatchSettings {
        &self.settings
    }

    /// Run jobs sequentially. `cancel` is checked between jobs; `on_progress` fires after each job.
    pub fn run(
        &self,
        io: &dyn MediaIo,
        cancel: &AtomicBool,
        mut on_progress: impl FnMut(Progress),
    ) -> VertikalResult<BatchReport> {
        let ctx = JobContext {
            io,
            composer: &self.composer,
            text_engine: &self.text_engine,
            text: &self.settings.text,
            canvas: self.settings.canvas,
            encoders: &self.settings.encoders,
            mixer: AudioMixer::default(),
        };
        let total = self.jobs.len();
        let mut report = BatchReport {
            mode: self.settings.mode,
            successful: 0,
            total,
            outputs: Vec::new(),
            failures: Vec::new(),
            cancelled: false,
            audio: self.audio_description(),
        };

        for (i, job) in self.jobs.iter().enumerate() {
            if cancel.load(Ordering::Relaxed) {
                tracing::info!(remaining = total - i, "batch cancelled");
                report.cancelled = true;
                break;
            }
            tracing::info!(current = i + 1, total, job = %job.name, "processing");
            match job.run(&ctx) {
                Ok(JobOutcome { output, .. }) => {
                    report.successful += 1;
                    report.outputs.push(output);
                }
                Err(e) if e.source.is_fatal_for_batch() => {
                    tracing::error!(job = %job.name, error = %e, "aborting batch");
                    return Err(e.source);
                }
                Err(e) => {
                    tracing::warn!(job = %job.name, stage = ?e.stage, error = %e.source, "job failed");
                    report.failures.push(JobFailure {
                        name: job.name.clone(),
                        stage: e.stage,
                        reason: e.source.to_string(),
                    });
                }
            }
            on_progress(Progress {
                current: i + 1,
                total,
                name: job.name.clone(),
            });
        }

        tracing::info!("{}", report.summary());
        Ok(report)
    }

    fn audio_description(&self) -> String {
        match self.settings.mode {
            ProcessingMode::Narasi => "narration audio".to_string(),
            _ => self.settings.audio.describe(),
        }
    }
}

fn plan_narasi(
    settings: &BatchSettings,
    inputs: Vec<PathBuf>,
    output_dir: &Path,
) -> VertikalResult<CompositionJob> {
    let narration = settings
        .narration_audio
        .clone()
        .ok_or_else(|| VertikalError::validation("narasi mode needs one narration audio file"))?;
    if !has_extension(&narration, &AUDIO_EXTENSIONS) {
        return Err(VertikalError::validation(format!(
            "narration '{}' is not a supported audio file",
            narration.display()
        )));
    }
    if !narration.is_file() {
        return Err(VertikalError::validation(format!(
            "narration audio '{}' does not exist",
            narration.display()
        )));
    }
    if let Some(bad) = inputs.iter().find(|p| !has_extension(p, &VIDEO_EXTENSIONS)) {
        return Err(VertikalError::validation(format!(
            "narasi inputs must be videos, got '{}'",
            bad.display()
        )));
    }
    Ok(CompositionJob {
        name: format!("narasi ({} clips)", inputs.len()),
        caption: settings.text.content().unwrap_or(NARASI_CAPTION).to_string(),
        audio_tracks: vec![AudioTrackRef::new(&narration, VolumePercent::FULL)],
        fallback_audio: None,
        length: JobLength::AudioLength(narration),
        inputs,
        output: output_dir.join(NARASI_OUTPUT),
    })
}

fn plan_clips(
    settings: &BatchSettings,
    inputs: Vec<PathBuf>,
    output_dir: &Path,
    rng: &mut impl Rng,
) -> VertikalResult<Vec<CompositionJob>> {
    let audio = &settings.audio;
    let backgrounds = if audio.mode().needs_background() {
        let folder = audio.background_folder().ok_or_else(|| {
            VertikalError::validation("background music is enabled but no folder is set")
        })?;
        let files = list_files_with_extensions(folder, &AUDIO_EXTENSIONS)?;
        if files.is_empty() {
            return Err(VertikalError::validation(format!(
                "no audio files in background folder '{}'",
                folder.display()
            )));
        }
        files
    } else {
        Vec::new()
    };

    let jobs = inputs
        .into_iter()
        .map(|input| {
            let background = backgrounds.choose(rng).cloned();
            let (audio_tracks, fallback_audio) =
                tracks_for(audio.mode(), &input, background, settings);
            CompositionJob {
                name: input
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                caption: settings.text.caption_for(&file_stem(&input)),
                audio_tracks,
                fallback_audio,
                length: JobLength::SourceLength,
                output: output_path_for(output_dir, &input),
                inputs: vec![input],
            }
        })
        .collect();
    Ok(jobs)
}

fn tracks_for(
    mode: AudioMode,
    input: &Path,
    background: Option<PathBuf>,
    settings: &BatchSettings,
) -> (Vec<AudioTrackRef>, Option<AudioTrackRef>) {
    let audio = &settings.audio;
    // GIF inputs carry no audio of their own.
    let original = |volume| (!is_gif_path(input)).then(|| AudioTrackRef::new(input, volume));
    let background = background.map(|p| AudioTrackRef::new(p, audio.background_volume()));
    match mode {
        AudioMode::Original => (original(VolumePercent::FULL).into_iter().collect(), None),
        AudioMode::Background => match background {
            Some(bg) => (vec![bg], original(VolumePercent::FULL)),
            None => (original(VolumePercent::FULL).into_iter().collect(), None),
        },
        AudioMode::Dual => (
            original(audio.original_volume())
                .into_iter()
                .chain(background)
                .collect(),
            None,
        ),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/batch.rs"]
mod tests;
