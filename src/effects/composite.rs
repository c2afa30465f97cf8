use crate::foundation::core::{Frame, Rgb8};
use crate::foundation::error::{VertikalError, VertikalResult};
use crate::foundation::math::{mul_div255_u16, mul_div255_u8};

/// Premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// Source-over for premultiplied RGBA8.
pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    let sa = u16::from(src[3]);
    if sa == 0 {
        return dst;
    }
    if sa == 255 {
        return src;
    }
    let inv = 255u16 - sa;
    let mut out = [0u8; 4];
    for i in 0..4 {
        let dc = mul_div255_u16(u16::from(dst[i]), inv);
        out[i] = (u16::from(src[i]) + dc).min(255) as u8;
    }
    out
}

/// Premultiplied pixel of `color` at `coverage` alpha.
pub fn premul_color(color: Rgb8, coverage: u8) -> PremulRgba8 {
    let a = u16::from(coverage);
    [
        mul_div255_u8(u16::from(color.r), a),
        mul_div255_u8(u16::from(color.g), a),
        mul_div255_u8(u16::from(color.b), a),
        coverage,
    ]
}

/// Composite a premultiplied layer over an opaque frame at `(x, y)`; parts outside are clipped.
pub fn over_layer_in_place(
    dst: &mut Frame,
    layer: &[u8],
    layer_w: u32,
    layer_h: u32,
    x: i64,
    y: i64,
) -> VertikalResult<()> {
    if layer.len() != layer_w as usize * layer_h as usize * 4 {
        return Err(VertikalError::validation(
            "over_layer_in_place expects layer matching width*height*4",
        ));
    }
    let (dw, dh) = (i64::from(dst.width()), i64::from(dst.height()));
    for ly in 0..i64::from(layer_h) {
        let dy = y + ly;
        if dy < 0 || dy >= dh {
            continue;
        }
        for lx in 0..i64::from(layer_w) {
            let dx = x + lx;
            if dx < 0 || dx >= dw {
                continue;
            }
            let i = ((ly * i64::from(layer_w) + lx) * 4) as usize;
            let src = [layer[i], layer[i + 1], layer[i + 2], layer[i + 3]];
            if src[3] == 0 {
                continue;
            }
            let px = dst.get_pixel_mut(dx as u32, dy as u32);
            px.0 = over(px.0, src);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/effects/composite.rs"]
mod tests;
