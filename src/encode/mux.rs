use std::path::Path;
use std::process::{Command, Stdio};

use crate::assets::media::AudioPcm;
use crate::audio::mix::write_mix_to_f32le_file;
use crate::encode::ffmpeg::ensure_parent_dir;
use crate::foundation::error::{VertikalError, VertikalResult};

/// Combine the silent `video` with `audio` into `out`; without audio the video is copied as is.
///
/// The raw PCM is staged in `scratch_dir`.
pub fn mux_audio(
    video: &Path,
    audio: Option<&AudioPcm>,
    out: &Path,
    scratch_dir: &Path,
) -> VertikalResult<()> {
    ensure_parent_dir(out)?;
    let Some(audio) = audio else {
        return copy_video(video, out);
    };

    let pcm_path = scratch_dir.join("mix.f32le");
    write_mix_to_f32le_file(&audio.interleaved_f32, &pcm_path)?;

    let output = Command::new("ffmpeg")
        .args(["-y", "-v", "error", "-nostdin", "-i"])
        .arg(video)
        .args([
            "-f",
            "f32le",
            "-ar",
            &audio.sample_rate.to_string(),
            "-ac",
            &audio.channels.to_string(),
            "-i",
        ])
        .arg(&pcm_path)
        .args([
            "-map",
            "0:v:0",
            "-map",
            "1:a:0",
            "-c:v",
            "copy",
            "-c:a",
            "aac",
            "-shortest",
            "-movflags",
            "+faststart",
        ])
        .arg(out)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| {
            VertikalError::media(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;
    if !output.status.success() {
        return Err(VertikalError::media(format!(
            "ffmpeg mux failed for '{}': {}",
            out.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(())
}

/// Copy the finished silent video to its final location.
pub fn copy_video(video: &Path, out: &Path) -> VertikalResult<()> {
    ensure_parent_dir(out)?;
    std::fs::copy(video, out).map_err(|e| {
        VertikalError::media(format!(
            "failed to copy '{}' to '{}': {e}",
            video.display(),
            out.display()
        ))
    })?;
    Ok(())
}
