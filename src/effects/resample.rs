use image::imageops::FilterType;

use crate::foundation::core::{Canvas, Frame};

/// Stretch `frame` to exactly `width`x`height` (aspect ratio is not preserved).
pub fn stretch_to(frame: &Frame, width: u32, height: u32) -> Frame {
    if frame.width() == width && frame.height() == height {
        return frame.clone();
    }
    image::imageops::resize(frame, width.max(1), height.max(1), FilterType::Triangle)
}

/// Stretch `frame` to the canvas resolution.
pub fn stretch_to_canvas(frame: &Frame, canvas: Canvas) -> Frame {
    stretch_to(frame, canvas.width, canvas.height)
}
