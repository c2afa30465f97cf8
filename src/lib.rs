//! Vertikal turns batches of short clips into vertical (portrait) videos.
//!
//! A batch runs in one of three modes:
//!
//! - **greenscreen**: each clip is keyed into a still or animated template
//! - **blur**: each clip is inset over a blurred, cover-fitted copy of itself
//! - **narasi**: all clips are joined, keyed into a template and looped or cut to a narration track
//!
//! The public API is batch-oriented: validate a [`BatchConfig`], [`Batch::prepare`] it against
//! the input list, then [`Batch::run`] it (or hand it to a [`BatchWorker`]). Decoding, encoding
//! and muxing go through the [`MediaIo`] seam; [`FfmpegIo`] drives the system `ffmpeg`.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod foundation;

pub mod audio;
pub(crate) mod config;
pub(crate) mod effects;
pub mod encode;
pub mod pipeline;
pub mod source;
pub mod text;
pub mod timing;

pub use crate::foundation::core::{Canvas, Fps, Frame, FrameIndex, Rgb8};
pub use crate::foundation::error::{VertikalError, VertikalResult};

pub use crate::assets::decode::{DecodedAnimation, decode_gif_file, decode_image_file};
pub use crate::assets::fonts::FontResolver;
pub use crate::assets::media::{
    AudioPcm, MIX_CHANNELS, MIX_SAMPLE_RATE, VideoSourceInfo, is_ffmpeg_on_path,
    probe_duration_sec, probe_video,
};
pub use crate::assets::template::{TemplateAsset, TemplateFrame};
pub use crate::config::batch::{BatchConfig, BatchSettings};
pub use crate::config::options::{
    AudioConfig, AudioMode, AudioSettings, BlurConfig, BlurSpec, ProcessingMode, TextConfig,
    TextSpec, VolumePercent,
};
pub use crate::effects::chroma::{ChromaKeyCompositor, ChromaKeyLayer};
pub use crate::effects::mask::{KeyColorRange, Mask, MaskBuilder};
pub use crate::effects::reframe::{BlurCompositor, InsetRect, inset_geometry};

pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::pipeline::{
    Batch, BatchReport, BatchWorker, CompositionJob, FfmpegIo, FrameComposer, JobError,
    JobFailure, JobLength, JobOutcome, MediaIo, Progress, Stage,
};
pub use crate::source::{FrameSource, MemorySource};
pub use crate::text::layout::{TextLayoutEngine, TextOverlay};
