use image::imageops::FilterType;

use crate::config::options::BlurSpec;
use crate::effects::blur::gaussian_blur_rgba8;
use crate::effects::resample::stretch_to;
use crate::foundation::core::{Canvas, Frame};
use crate::foundation::error::{VertikalError, VertikalResult};
use crate::foundation::math::percent_offset;

/// Share of each canvas dimension the sharp inset may occupy.
pub const INSET_FIT_FRACTION: f32 = 0.9;

const BACKDROP_DOWNSCALE: u32 = 4;
const BACKDROP_BLUR_RADIUS: u32 = 12;
const BACKDROP_BLUR_SIGMA: f32 = 6.0;

/// Placement of the sharp inset on the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InsetRect {
    /// Left edge in canvas pixels.
    pub x: u32,
    /// Top edge in canvas pixels.
    pub y: u32,
    /// Inset width.
    pub width: u32,
    /// Inset height.
    pub height: u32,
}

impl InsetRect {
    /// Return `true` when the rect lies entirely inside `canvas`.
    pub fn fits(&self, canvas: Canvas) -> bool {
        self.width > 0
            && self.height > 0
            && self.x + self.width <= canvas.width
            && self.y + self.height <= canvas.height
    }
}

/// Rows `(top, bottom)` removed from a source of `height` rows; at least one row survives.
pub fn crop_rows(height: u32, placement: &BlurSpec) -> (u32, u32) {
    let rows = |pct: f32| (height as f32 * pct / 100.0).round() as u32;
    let top = rows(placement.crop_top_percent());
    let bottom = rows(placement.crop_bottom_percent());
    if top + bottom >= height {
        let top = top.min(height.saturating_sub(1));
        return (top, height.saturating_sub(1).saturating_sub(top));
    }
    (top, bottom)
}

/// Largest aspect-preserving fit of `src_w`x`src_h` inside the fit fraction of `canvas`, then offset by percent.
pub fn inset_geometry(canvas: Canvas, src_w: u32, src_h: u32, placement: &BlurSpec) -> InsetRect {
    let box_w = canvas.width as f32 * INSET_FIT_FRACTION;
    let box_h = canvas.height as f32 * INSET_FIT_FRACTION;
    let scale = (box_w / src_w.max(1) as f32).min(box_h / src_h.max(1) as f32);
    let width = ((src_w as f32 * scale).round() as u32).clamp(1, canvas.width);
    let height = ((src_h as f32 * scale).round() as u32).clamp(1, canvas.height);
    InsetRect {
        x: percent_offset(placement.x_percent(), canvas.width - width),
        y: percent_offset(placement.y_percent(), canvas.height - height),
        width,
        height,
    }
}

/// Reframes a source onto the canvas over a blurred copy of itself.
#[derive(Clone, Copy, Debug)]
pub struct BlurCompositor {
    canvas: Canvas,
}

impl BlurCompositor {
    /// Compositor producing frames of `canvas` size.
    pub fn new(canvas: Canvas) -> Self {
        Self { canvas }
    }

    /// Blurred, stretched backdrop with the cropped source pasted sharp on top.
    pub fn compose(&self, source: &Frame, placement: &BlurSpec) -> VertikalResult<Frame> {
        if source.width() == 0 || source.height() == 0 {
            return Err(VertikalError::validation("blur source frame is empty"));
        }
        let mut out = self.backdrop(source)?;

        let (top, bottom) = crop_rows(source.height(), placement);
        let crop_h = source.height() - top - bottom;
        let cropped = image::imageops::crop_imm(source, 0, top, source.width(), crop_h).to_image();

        let rect = inset_geometry(self.canvas, cropped.width(), cropped.height(), placement);
        let inset = stretch_to(&cropped, rect.width, rect.height);
        image::imageops::replace(&mut out, &inset, i64::from(rect.x), i64::from(rect.y));
        Ok(out)
    }

    fn backdrop(&self, source: &Frame) -> VertikalResult<Frame> {
        let small_w = (self.canvas.width / BACKDROP_DOWNSCALE).max(1);
        let small_h = (self.canvas.height / BACKDROP_DOWNSCALE).max(1);
        let small = stretch_to(source, small_w, small_h);
        let blurred = gaussian_blur_rgba8(
            small.as_raw(),
            small_w,
            small_h,
            BACKDROP_BLUR_RADIUS,
            BACKDROP_BLUR_SIGMA,
        )?;
        let small = Frame::from_raw(small_w, small_h, blurred)
            .ok_or_else(|| VertikalError::validation("blurred backdrop has wrong size"))?;
        if small_w == self.canvas.width && small_h == self.canvas.height {
            return Ok(small);
        }
        Ok(image::imageops::resize(
            &small,
            self.canvas.width,
            self.canvas.height,
            FilterType::Triangle,
        ))
    }

    /// Output canvas.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/reframe.rs"]
mod tests;
