use std::path::Path;

use crate::assets::media::{AudioPcm, decode_audio_f32, probe_duration_sec};
use crate::audio::mix::AudioDecode;
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, probe_encoder};
use crate::encode::mux::{copy_video, mux_audio};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::error::VertikalResult;
use crate::source::{FrameSource, open_source};

/// Every external media operation a job performs.
pub trait MediaIo: Send + Sync {
    /// Open a video or GIF as a frame source.
    fn open_source(&self, path: &Path) -> VertikalResult<Box<dyn FrameSource>>;

    /// Decode the audio of `path` to interleaved PCM; no audio stream yields empty PCM.
    fn decode_audio(&self, path: &Path, sample_rate: u32, channels: u16) -> VertikalResult<AudioPcm>;

    /// Duration of an audio file in seconds.
    fn audio_duration(&self, path: &Path) -> VertikalResult<f64>;

    /// Open and begin a sink writing `out_path` with `encoder`.
    fn open_sink(
        &self,
        encoder: &str,
        out_path: &Path,
        cfg: SinkConfig,
    ) -> VertikalResult<Box<dyn FrameSink>>;

    /// Mux `video` with `audio` into `out`, or copy it when there is no audio.
    fn mux(
        &self,
        video: &Path,
        audio: Option<&AudioPcm>,
        out: &Path,
        scratch_dir: &Path,
    ) -> VertikalResult<()>;

    /// Copy the silent video to `out`.
    fn copy_video(&self, video: &Path, out: &Path) -> VertikalResult<()>;
}

/// Adapts a [`MediaIo`] to the mixer's decoder seam.
pub(crate) struct IoAudioDecoder<'a>(pub(crate) &'a dyn MediaIo);

impl AudioDecode for IoAudioDecoder<'_> {
    fn decode(&self, path: &Path, sample_rate: u32, channels: u16) -> VertikalResult<AudioPcm> {
        self.0.decode_audio(path, sample_rate, channels)
    }
}

/// [`MediaIo`] backed by the system `ffmpeg`/`ffprobe`.
#[derive(Clone, Copy, Debug, Default)]
pub struct FfmpegIo;

impl MediaIo for FfmpegIo {
    fn open_source(&self, path: &Path) -> VertikalResult<Box<dyn FrameSource>> {
        open_source(path)
    }

    fn decode_audio(&self, path: &Path, sample_rate: u32, channels: u16) -> VertikalResult<AudioPcm> {
        decode_audio_f32(path, sample_rate, channels)
    }

    fn audio_duration(&self, path: &Path) -> VertikalResult<f64> {
        probe_duration_sec(path)
    }

    fn open_sink(
        &self,
        encoder: &str,
        out_path: &Path,
        cfg: SinkConfig,
    ) -> VertikalResult<Box<dyn FrameSink>> {
        probe_encoder(encoder, cfg)?;
        let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(out_path, encoder));
        sink.begin(cfg)?;
        Ok(Box::new(sink))
    }

    fn mux(
        &self,
        video: &Path,
        audio: Option<&AudioPcm>,
        out: &Path,
        scratch_dir: &Path,
    ) -> VertikalResult<()> {
        mux_audio(video, audio, out, scratch_dir)
    }

    fn copy_video(&self, video: &Path, out: &Path) -> VertikalResult<()> {
        copy_video(video, out)
    }
}
