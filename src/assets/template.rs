use std::path::{Path, PathBuf};

use crate::assets::decode::{decode_gif_file, decode_image_file, is_gif_path};
use crate::effects::resample::stretch_to_canvas;
use crate::foundation::core::{Canvas, Frame};
use crate::foundation::error::{VertikalError, VertikalResult};

/// One template frame, normalized to canvas resolution.
#[derive(Clone, Debug)]
pub struct TemplateFrame {
    /// Opaque RGBA pixels at canvas resolution.
    pub image: Frame,
    /// Display duration in milliseconds (0 for still templates).
    pub delay_ms: u32,
}

/// A still or animated chroma-key template, loaded once per batch.
#[derive(Clone, Debug)]
pub struct TemplateAsset {
    path: PathBuf,
    frames: Vec<TemplateFrame>,
}

impl TemplateAsset {
    /// Load a still image or GIF and stretch every frame to `canvas`.
    pub fn load(path: &Path, canvas: Canvas) -> VertikalResult<Self> {
        let frames = if is_gif_path(path) {
            let anim = decode_gif_file(path).map_err(|e| VertikalError::template_load(path, e))?;
            anim.frames
                .iter()
                .zip(anim.delays_ms.iter())
                .map(|(f, &delay_ms)| TemplateFrame {
                    image: stretch_to_canvas(f, canvas),
                    delay_ms,
                })
                .collect::<Vec<_>>()
        } else {
            let still = decode_image_file(path).map_err(|e| VertikalError::template_load(path, e))?;
            vec![TemplateFrame {
                image: stretch_to_canvas(&still, canvas),
                delay_ms: 0,
            }]
        };
        Self::from_frames(path, frames)
    }

    /// Build a template from already-decoded frames (must be canvas sized).
    pub fn from_frames(path: impl Into<PathBuf>, frames: Vec<TemplateFrame>) -> VertikalResult<Self> {
        let path = path.into();
        if frames.is_empty() {
            return Err(VertikalError::template_load(&path, "template has no frames"));
        }
        Ok(Self { path, frames })
    }

    /// Source path of the template.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of template frames.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Return `true` when the template has more than one frame.
    pub fn is_animated(&self) -> bool {
        self.frames.len() > 1
    }

    /// All template frames in display order.
    pub fn frames(&self) -> &[TemplateFrame] {
        &self.frames
    }

    /// Template frame index shown at output frame `out_idx` (cycles modulo the frame count).
    pub fn index_for_output(&self, out_idx: u64) -> usize {
        (out_idx % self.frames.len() as u64) as usize
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/template.rs"]
mod tests;
