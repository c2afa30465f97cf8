use std::io::{Read as _, Write as _};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, Frame, FrameIndex};
use crate::foundation::error::{VertikalError, VertikalResult};

/// H.264 encoders tried in order when the config does not name any.
pub const DEFAULT_ENCODERS: [&str; 5] = [
    "libx264",
    "h264_nvenc",
    "h264_qsv",
    "h264_videotoolbox",
    "libopenh264",
];

/// Options for [`FfmpegSink`] MP4 output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output MP4 file path.
    pub out_path: PathBuf,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
    /// `ffmpeg` video encoder name.
    pub encoder: String,
}

impl FfmpegSinkOpts {
    /// Options writing `out_path` with `encoder`.
    pub fn new(out_path: impl Into<PathBuf>, encoder: impl Into<String>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            encoder: encoder.into(),
        }
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw RGBA frames to stdin.
///
/// Produces a silent H.264 yuv420p MP4; audio is muxed afterwards.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    /// Create a new sink that streams into `ffmpeg`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            cfg: None,
            last_idx: None,
        }
    }

    /// Encoder this sink was opened with.
    pub fn encoder(&self) -> &str {
        &self.opts.encoder
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> VertikalResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(VertikalError::validation(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(VertikalError::validation(
                "ffmpeg sink width/height must be even (required for yuv420p mp4 output)",
            ));
        }

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(VertikalError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd.arg(if self.opts.overwrite { "-y" } else { "-n" });
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args(["-i", "pipe:0", "-an", "-c:v"])
            .arg(&self.opts.encoder)
            .args(["-pix_fmt", "yuv420p", "-movflags", "+faststart"])
            .arg(&self.opts.out_path);

        let mut child = cmd.spawn().map_err(|e| {
            VertikalError::media(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| VertikalError::media("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| VertikalError::media("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &Frame) -> VertikalResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| VertikalError::media("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(VertikalError::media(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        if frame.width() != cfg.width || frame.height() != cfg.height {
            return Err(VertikalError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width(),
                frame.height(),
                cfg.width,
                cfg.height
            )));
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(VertikalError::media("ffmpeg sink is already finalized"));
        };
        stdin.write_all(frame.as_raw()).map_err(|e| {
            VertikalError::media(format!("failed to write frame to ffmpeg stdin: {e}"))
        })
    }

    fn end(&mut self) -> VertikalResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| VertikalError::media("ffmpeg sink not started"))?;

        let status = child.wait().map_err(|e| {
            VertikalError::media(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| VertikalError::media("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| VertikalError::media(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(VertikalError::media(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        self.cfg = None;
        Ok(())
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // For rawvideo input, `-r` before `-i` sets the input framerate.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

/// Encode one black frame of the job's size with `encoder` to check it is usable on this machine.
///
/// Hardware encoders reject frames below their minimum size, so the probe uses `cfg` rather than
/// a fixed thumbnail.
pub fn probe_encoder(encoder: &str, cfg: SinkConfig) -> VertikalResult<()> {
    let out = Command::new("ffmpeg")
        .args(probe_args(encoder, cfg))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .output()
        .map_err(|e| {
            VertikalError::media(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;
    if !out.status.success() {
        return Err(VertikalError::media(format!(
            "encoder '{encoder}' unavailable: {}",
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    Ok(())
}

fn probe_args(encoder: &str, cfg: SinkConfig) -> Vec<String> {
    let source = format!(
        "color=c=black:s={}x{}:r={}/{}:d=1",
        cfg.width, cfg.height, cfg.fps.num, cfg.fps.den
    );
    [
        "-v", "error", "-nostdin", "-f", "lavfi", "-i", &source, "-frames:v", "1", "-c:v",
        encoder, "-pix_fmt", "yuv420p", "-f", "null", "-",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

/// Try `candidates` in order; the first `open` that succeeds wins.
///
/// Fails with [`VertikalError::EncodingOpen`] only after every candidate failed.
pub fn open_first<T>(
    candidates: &[String],
    mut open: impl FnMut(&str) -> VertikalResult<T>,
) -> VertikalResult<(String, T)> {
    let mut tried = Vec::with_capacity(candidates.len());
    let mut last_error = String::from("no candidate encoders configured");
    for candidate in candidates {
        match open(candidate) {
            Ok(opened) => {
                tracing::info!(encoder = %candidate, "encoder opened");
                return Ok((candidate.clone(), opened));
            }
            Err(e) => {
                tracing::debug!(encoder = %candidate, error = %e, "encoder unavailable, trying next");
                tried.push(candidate.clone());
                last_error = e.to_string();
            }
        }
    }
    Err(VertikalError::EncodingOpen { tried, last_error })
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> VertikalResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
