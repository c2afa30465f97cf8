use std::io::Read as _;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

use crate::foundation::core::{Fps, Frame};
use crate::foundation::error::{VertikalError, VertikalResult};

/// Internal audio mixing sample rate used across decode/mix/mux.
pub const MIX_SAMPLE_RATE: u32 = 48_000;
/// Internal audio mixing channel count (interleaved stereo).
pub const MIX_CHANNELS: u16 = 2;

#[derive(Clone, Debug)]
/// Basic metadata about a source video file.
pub struct VideoSourceInfo {
    /// Source path used for probing/decoding.
    pub source_path: PathBuf,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Nominal frame rate of the first video stream.
    pub fps: Fps,
    /// Container or stream duration in seconds, when reported.
    pub duration_sec: Option<f64>,
    /// Frame count of the video stream, when reported.
    pub frame_count: Option<u64>,
    /// Whether ffprobe detected at least one audio stream.
    pub has_audio: bool,
}

#[derive(Clone, Debug, PartialEq)]
/// Decoded interleaved floating-point PCM.
pub struct AudioPcm {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
    /// Interleaved `f32` PCM samples.
    pub interleaved_f32: Vec<f32>,
}

impl AudioPcm {
    /// Number of sample frames (one sample per channel).
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.interleaved_f32.len() / usize::from(self.channels)
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / f64::from(self.sample_rate)
    }
}

#[derive(serde::Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
    nb_frames: Option<String>,
    duration: Option<String>,
    #[serde(default)]
    tags: Option<ProbeTags>,
    #[serde(default)]
    side_data_list: Vec<ProbeSideData>,
}

#[derive(serde::Deserialize)]
struct ProbeTags {
    rotate: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeSideData {
    rotation: Option<f64>,
}

impl ProbeStream {
    // Display rotation in degrees, from the display matrix or the legacy `rotate` tag.
    fn rotation_degrees(&self) -> i64 {
        let deg = self
            .side_data_list
            .iter()
            .find_map(|d| d.rotation)
            .or_else(|| {
                self.tags
                    .as_ref()
                    .and_then(|t| t.rotate.as_deref())
                    .and_then(|r| r.trim().parse::<f64>().ok())
            })
            .unwrap_or(0.0);
        (deg.round() as i64).rem_euclid(360)
    }
}

#[derive(serde::Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeOut {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

fn run_ffprobe(source_path: &Path) -> VertikalResult<ProbeOut> {
    let out = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| VertikalError::media(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(VertikalError::media(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    serde_json::from_slice(&out.stdout)
        .map_err(|e| VertikalError::media(format!("ffprobe json parse failed: {e}")))
}

fn parse_positive_f64(s: Option<&str>) -> Option<f64> {
    s.and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v > 0.0)
}

/// Probe source video metadata through `ffprobe`.
///
/// Width and height are the displayed size: ffmpeg autorotates while decoding, so a
/// quarter-turn rotation swaps the coded dimensions.
pub fn probe_video(source_path: &Path) -> VertikalResult<VideoSourceInfo> {
    let parsed = run_ffprobe(source_path)?;
    video_info_from_probe(source_path, &parsed)
}

fn video_info_from_probe(source_path: &Path, parsed: &ProbeOut) -> VertikalResult<VideoSourceInfo> {
    let video_stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| {
            VertikalError::media(format!(
                "no video stream found in '{}'",
                source_path.display()
            ))
        })?;
    let width = video_stream
        .width
        .ok_or_else(|| VertikalError::media("missing video width from ffprobe"))?;
    let height = video_stream
        .height
        .ok_or_else(|| VertikalError::media("missing video height from ffprobe"))?;
    let (width, height) = match video_stream.rotation_degrees() {
        90 | 270 => (height, width),
        _ => (width, height),
    };

    // `avg_frame_rate` is `0/0` for some containers; fall back to `r_frame_rate`.
    let fps = [&video_stream.avg_frame_rate, &video_stream.r_frame_rate]
        .into_iter()
        .flatten()
        .find_map(|r| Fps::parse_ratio(r).ok())
        .ok_or_else(|| VertikalError::media("missing video frame rate from ffprobe"))?;

    let duration_sec = parse_positive_f64(video_stream.duration.as_deref()).or_else(|| {
        parse_positive_f64(parsed.format.as_ref().and_then(|f| f.duration.as_deref()))
    });
    let frame_count = video_stream
        .nb_frames
        .as_deref()
        .and_then(|n| n.trim().parse::<u64>().ok())
        .filter(|&n| n > 0);
    let has_audio = parsed
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));

    Ok(VideoSourceInfo {
        source_path: source_path.to_path_buf(),
        width,
        height,
        fps,
        duration_sec,
        frame_count,
        has_audio,
    })
}

/// Probe the playback duration of any media file in seconds.
pub fn probe_duration_sec(path: &Path) -> VertikalResult<f64> {
    let parsed = run_ffprobe(path)?;
    parse_positive_f64(parsed.format.as_ref().and_then(|f| f.duration.as_deref()))
        .or_else(|| {
            parsed
                .streams
                .iter()
                .find_map(|s| parse_positive_f64(s.duration.as_deref()))
        })
        .ok_or_else(|| {
            VertikalError::media(format!(
                "ffprobe reported no duration for '{}'",
                path.display()
            ))
        })
}

/// Decode audio from a media file to interleaved `f32` PCM.
pub fn decode_audio_f32(path: &Path, sample_rate: u32, channels: u16) -> VertikalResult<AudioPcm> {
    let out = Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(path)
        .args([
            "-vn",
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
            &channels.to_string(),
            "-ar",
            &sample_rate.to_string(),
            "pipe:1",
        ])
        .output()
        .map_err(|e| VertikalError::media(format!("failed to run ffmpeg for audio decode: {e}")))?;

    if !out.status.success() {
        let msg = String::from_utf8_lossy(&out.stderr);
        // ffmpeg reports a missing audio stream as an error; that is an empty track here.
        if msg.contains("Stream specifier")
            || msg.contains("matches no streams")
            || msg.contains("does not contain any stream")
        {
            return Ok(AudioPcm {
                sample_rate,
                channels,
                interleaved_f32: Vec::new(),
            });
        }
        return Err(VertikalError::media(format!(
            "ffmpeg audio decode failed for '{}': {}",
            path.display(),
            msg.trim()
        )));
    }

    if !out.stdout.len().is_multiple_of(4) {
        return Err(VertikalError::media(
            "decoded audio byte length is not aligned to f32 samples",
        ));
    }
    let interleaved_f32 = out
        .stdout
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();

    Ok(AudioPcm {
        sample_rate,
        channels,
        interleaved_f32,
    })
}

/// A running `ffmpeg` process that decodes a video file to raw RGBA frames on stdout.
///
/// The child is killed and reaped when the stream is dropped.
pub struct VideoDecodeStream {
    child: Child,
    stdout: ChildStdout,
    width: u32,
    height: u32,
}

impl VideoDecodeStream {
    /// Spawn a decoder for `info.source_path`, positioned at the first frame.
    pub fn spawn(info: &VideoSourceInfo) -> VertikalResult<Self> {
        let mut child = Command::new("ffmpeg")
            .args(["-v", "error", "-nostdin", "-i"])
            .arg(&info.source_path)
            .args([
                "-map",
                "0:v:0",
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgba",
                "-fps_mode",
                "passthrough",
                "pipe:1",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                VertikalError::media(format!(
                    "failed to spawn ffmpeg decoder (is it installed and on PATH?): {e}"
                ))
            })?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| VertikalError::media("failed to open ffmpeg stdout (unexpected)"))?;
        Ok(Self {
            child,
            stdout,
            width: info.width,
            height: info.height,
        })
    }

    /// Read the next frame; `None` once the decoder reaches end of stream.
    pub fn read_frame(&mut self) -> VertikalResult<Option<Frame>> {
        let len = self.width as usize * self.height as usize * 4;
        let mut buf = vec![0u8; len];
        let mut filled = 0usize;
        while filled < len {
            let n = self
                .stdout
                .read(&mut buf[filled..])
                .map_err(|e| VertikalError::media(format!("ffmpeg decode read failed: {e}")))?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        if filled < len {
            // A trailing partial frame is dropped.
            return Ok(None);
        }
        Frame::from_raw(self.width, self.height, buf)
            .map(Some)
            .ok_or_else(|| VertikalError::media("decoded frame buffer has unexpected size"))
    }
}

impl Drop for VideoDecodeStream {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
