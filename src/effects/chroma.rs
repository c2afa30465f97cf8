use crate::assets::template::TemplateAsset;
use crate::effects::mask::{Mask, MaskBuilder};
use crate::effects::resample::stretch_to_canvas;
use crate::foundation::core::{Canvas, Frame};
use crate::foundation::error::{VertikalError, VertikalResult};

/// Merges a template frame and a source frame through a key mask.
#[derive(Clone, Copy, Debug)]
pub struct ChromaKeyCompositor {
    canvas: Canvas,
}

impl ChromaKeyCompositor {
    /// Compositor producing frames of `canvas` size.
    pub fn new(canvas: Canvas) -> Self {
        Self { canvas }
    }

    /// Output canvas.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Source pixels where the mask is set, template pixels elsewhere.
    ///
    /// The source is stretched to the canvas first; template and mask must already match it.
    pub fn compose(&self, template: &Frame, source: &Frame, mask: &Mask) -> VertikalResult<Frame> {
        if !self.canvas.matches(template) {
            return Err(VertikalError::validation(format!(
                "template is {}x{}, expected canvas {}x{}",
                template.width(),
                template.height(),
                self.canvas.width,
                self.canvas.height
            )));
        }
        if mask.width() != self.canvas.width || mask.height() != self.canvas.height {
            return Err(VertikalError::validation("mask does not match canvas size"));
        }

        let stretched = stretch_to_canvas(source, self.canvas);
        let mut out = template.clone();
        for (i, (dst, src)) in out.pixels_mut().zip(stretched.pixels()).enumerate() {
            if mask.get_index(i) {
                *dst = *src;
            }
        }
        Ok(out)
    }
}

/// A template with one mask per template frame, shared read-only by every job of a batch.
#[derive(Clone, Debug)]
pub struct ChromaKeyLayer {
    template: TemplateAsset,
    masks: Vec<Mask>,
    compositor: ChromaKeyCompositor,
}

impl ChromaKeyLayer {
    /// Build every mask up front; the first frame must contain key pixels.
    pub fn prepare(
        template: TemplateAsset,
        builder: &MaskBuilder,
        canvas: Canvas,
    ) -> VertikalResult<Self> {
        let mut masks = Vec::with_capacity(template.frame_count());
        for (i, frame) in template.frames().iter().enumerate() {
            let mask = if i == 0 {
                builder.build(&frame.image, template.path())?
            } else {
                builder.classify(&frame.image)
            };
            if mask.true_count() == 0 {
                tracing::warn!(frame = i, "template frame has no key pixels");
            }
            masks.push(mask);
        }
        tracing::info!(
            template = %template.path().display(),
            frames = template.frame_count(),
            key_pixels = masks[0].true_count(),
            "template masks ready"
        );
        Ok(Self {
            template,
            masks,
            compositor: ChromaKeyCompositor::new(canvas),
        })
    }

    /// The template backing this layer.
    pub fn template(&self) -> &TemplateAsset {
        &self.template
    }

    /// Mask of template frame `i`.
    pub fn mask(&self, i: usize) -> Option<&Mask> {
        self.masks.get(i)
    }

    /// Composite `source` for output frame `out_idx`, advancing animated templates per frame.
    pub fn compose(&self, out_idx: u64, source: &Frame) -> VertikalResult<Frame> {
        let i = self.template.index_for_output(out_idx);
        self.compositor
            .compose(&self.template.frames()[i].image, source, &self.masks[i])
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/chroma.rs"]
mod tests;
