use std::path::{Path, PathBuf};

use crate::assets::media::{AudioPcm, MIX_CHANNELS, MIX_SAMPLE_RATE, decode_audio_f32};
use crate::config::options::VolumePercent;
use crate::foundation::error::{VertikalError, VertikalResult};

/// Most tracks mixed into one job.
pub const MAX_TRACKS: usize = 2;

/// An audio file and the volume it is mixed at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioTrackRef {
    /// Audio (or video with audio) file.
    pub path: PathBuf,
    /// Linear gain as a percentage.
    pub volume: VolumePercent,
}

impl AudioTrackRef {
    /// Track at `volume`.
    pub fn new(path: impl Into<PathBuf>, volume: VolumePercent) -> Self {
        Self {
            path: path.into(),
            volume,
        }
    }
}

/// Decodes a file to interleaved PCM at a fixed rate and channel count.
pub trait AudioDecode {
    /// Decode `path`; an input without audio yields empty PCM.
    fn decode(&self, path: &Path, sample_rate: u32, channels: u16) -> VertikalResult<AudioPcm>;
}

/// [`AudioDecode`] through an `ffmpeg` child process.
#[derive(Clone, Copy, Debug, Default)]
pub struct FfmpegAudioDecoder;

impl AudioDecode for FfmpegAudioDecoder {
    fn decode(&self, path: &Path, sample_rate: u32, channels: u16) -> VertikalResult<AudioPcm> {
        decode_audio_f32(path, sample_rate, channels)
    }
}

/// Aligns up to two tracks to a target length and sums them.
#[derive(Clone, Copy, Debug)]
pub struct AudioMixer {
    sample_rate: u32,
    channels: u16,
}

impl Default for AudioMixer {
    fn default() -> Self {
        Self {
            sample_rate: MIX_SAMPLE_RATE,
            channels: MIX_CHANNELS,
        }
    }
}

impl AudioMixer {
    /// Mixer producing `sample_rate` Hz with `channels` interleaved channels.
    pub fn new(sample_rate: u32, channels: u16) -> VertikalResult<Self> {
        if sample_rate == 0 || channels == 0 {
            return Err(VertikalError::validation(
                "mixer sample rate and channel count must be non-zero",
            ));
        }
        Ok(Self {
            sample_rate,
            channels,
        })
    }

    /// Output sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Output channel count.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Sample frames in `secs` seconds, `round(secs * sample_rate)`.
    pub fn target_frames(&self, secs: f64) -> usize {
        if !secs.is_finite() || secs <= 0.0 {
            return 0;
        }
        (secs * f64::from(self.sample_rate)).round() as usize
    }

    /// Decode, align and mix `tracks` to exactly `target_secs`.
    ///
    /// Tracks that fail to decode or carry no samples are dropped with a warning.
    /// `None` means no track survived and the output has no audio stream.
    pub fn mix(
        &self,
        tracks: &[AudioTrackRef],
        target_secs: f64,
        decoder: &dyn AudioDecode,
    ) -> VertikalResult<Option<AudioPcm>> {
        if tracks.len() > MAX_TRACKS {
            return Err(VertikalError::validation(format!(
                "at most {MAX_TRACKS} audio tracks can be mixed, got {}",
                tracks.len()
            )));
        }

        let mut decoded = Vec::with_capacity(tracks.len());
        for track in tracks {
            match self.decode_track(track, decoder) {
                Ok(pcm) => decoded.push((pcm, track.volume)),
                Err(e) => tracing::warn!(
                    track = %track.path.display(),
                    error = %e,
                    "dropping audio track"
                ),
            }
        }
        Ok(self.mix_pcm(&decoded, self.target_frames(target_secs)))
    }

    fn decode_track(&self, track: &AudioTrackRef, decoder: &dyn AudioDecode) -> VertikalResult<AudioPcm> {
        let pcm = decoder
            .decode(&track.path, self.sample_rate, self.channels)
            .map_err(|e| VertikalError::audio_mix(format!("decode failed: {e}")))?;
        if pcm.sample_rate != self.sample_rate || pcm.channels != self.channels {
            return Err(VertikalError::audio_mix(format!(
                "decoded {} Hz / {} ch, expected {} Hz / {} ch",
                pcm.sample_rate, pcm.channels, self.sample_rate, self.channels
            )));
        }
        if pcm.frames() == 0 {
            return Err(VertikalError::audio_mix("track has no audio samples"));
        }
        Ok(pcm)
    }

    /// Mix already-decoded tracks to exactly `target_frames` sample frames.
    pub fn mix_pcm(&self, tracks: &[(AudioPcm, VolumePercent)], target_frames: usize) -> Option<AudioPcm> {
        if tracks.is_empty() {
            return None;
        }
        let target_len = target_frames * usize::from(self.channels);
        let mut out = vec![0.0f32; target_len];
        for (pcm, volume) in tracks {
            let gain = volume.gain();
            let aligned = fit_to_length(&pcm.interleaved_f32, target_len);
            for (o, s) in out.iter_mut().zip(aligned) {
                *o += s * gain;
            }
        }
        for s in &mut out {
            *s = s.clamp(-1.0, 1.0);
        }
        Some(AudioPcm {
            sample_rate: self.sample_rate,
            channels: self.channels,
            interleaved_f32: out,
        })
    }
}

/// Truncate `samples`, or repeat whole copies plus a partial remainder, to exactly `target_len`.
pub fn fit_to_length(samples: &[f32], target_len: usize) -> Vec<f32> {
    if samples.is_empty() {
        return vec![0.0; target_len];
    }
    samples.iter().copied().cycle().take(target_len).collect()
}

/// Write interleaved `f32` PCM samples to a raw little-endian `.f32le` file.
pub(crate) fn write_mix_to_f32le_file(samples_interleaved: &[f32], out_path: &Path) -> VertikalResult<()> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            VertikalError::media(format!(
                "failed to create audio mix output directory '{}': {e}",
                parent.display()
            ))
        })?;
    }

    let mut bytes = Vec::<u8>::with_capacity(samples_interleaved.len() * 4);
    for &sample in samples_interleaved {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    std::fs::write(out_path, bytes).map_err(|e| {
        VertikalError::media(format!(
            "failed to write mixed audio file '{}': {e}",
            out_path.display()
        ))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/audio/mix.rs"]
mod tests;
