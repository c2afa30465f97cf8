use std::io::BufReader;
use std::path::Path;

use anyhow::Context;
use image::AnimationDecoder as _;

use crate::foundation::core::Frame;
use crate::foundation::error::VertikalResult;
use crate::foundation::math::mul_div255_u8;

/// Frames of a decoded animated image with their display durations.
#[derive(Clone, Debug)]
pub struct DecodedAnimation {
    /// Opaque RGBA frames in display order.
    pub frames: Vec<Frame>,
    /// Display duration of each frame in milliseconds.
    pub delays_ms: Vec<u32>,
}

impl DecodedAnimation {
    /// Mean frame delay in milliseconds (0 when unknown).
    pub fn mean_delay_ms(&self) -> f64 {
        if self.delays_ms.is_empty() {
            return 0.0;
        }
        let total: u64 = self.delays_ms.iter().map(|&d| u64::from(d)).sum();
        total as f64 / self.delays_ms.len() as f64
    }
}

/// Return `true` when `path` has a `.gif` extension (case-insensitive).
pub fn is_gif_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gif"))
}

/// Decode a still image file into an opaque RGBA frame.
pub fn decode_image_file(path: &Path) -> VertikalResult<Frame> {
    let dyn_img =
        image::open(path).with_context(|| format!("decode image '{}'", path.display()))?;
    let mut rgba = dyn_img.to_rgba8();
    flatten_over_black_in_place(&mut rgba);
    Ok(rgba)
}

/// Decode every frame of an animated GIF.
pub fn decode_gif_file(path: &Path) -> VertikalResult<DecodedAnimation> {
    let file =
        std::fs::File::open(path).with_context(|| format!("open gif '{}'", path.display()))?;
    let decoder = image::codecs::gif::GifDecoder::new(BufReader::new(file))
        .with_context(|| format!("read gif header '{}'", path.display()))?;
    let raw_frames = decoder
        .into_frames()
        .collect_frames()
        .with_context(|| format!("decode gif frames '{}'", path.display()))?;

    let mut frames = Vec::with_capacity(raw_frames.len());
    let mut delays_ms = Vec::with_capacity(raw_frames.len());
    for f in raw_frames {
        let (num, den) = f.delay().numer_denom_ms();
        delays_ms.push(if den == 0 { 0 } else { num / den });
        let mut rgba = f.into_buffer();
        flatten_over_black_in_place(&mut rgba);
        frames.push(rgba);
    }
    Ok(DecodedAnimation { frames, delays_ms })
}

/// Composite straight-alpha pixels over opaque black.
pub(crate) fn flatten_over_black_in_place(frame: &mut Frame) {
    for px in frame.pixels_mut() {
        let a = u16::from(px[3]);
        if a == 255 {
            continue;
        }
        px[0] = mul_div255_u8(u16::from(px[0]), a);
        px[1] = mul_div255_u8(u16::from(px[1]), a);
        px[2] = mul_div255_u8(u16::from(px[2]), a);
        px[3] = 255;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
