use std::path::Path;

use crate::foundation::core::Frame;
use crate::foundation::error::{VertikalError, VertikalResult};

/// HSV thresholds classifying a pixel as key color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeyColorRange {
    /// Inclusive lower hue bound in degrees.
    pub hue_min_deg: f32,
    /// Inclusive upper hue bound in degrees.
    pub hue_max_deg: f32,
    /// Minimum saturation, 0..=1.
    pub sat_min: f32,
    /// Minimum value (brightness), 0..=1.
    pub val_min: f32,
}

impl KeyColorRange {
    /// Green-screen key.
    pub const GREEN: KeyColorRange = KeyColorRange {
        hue_min_deg: 70.0,
        hue_max_deg: 170.0,
        sat_min: 40.0 / 255.0,
        val_min: 40.0 / 255.0,
    };

    /// Return `true` when the RGB pixel falls inside the range.
    pub fn contains(&self, r: u8, g: u8, b: u8) -> bool {
        let (h, s, v) = rgb_to_hsv(r, g, b);
        h >= self.hue_min_deg && h <= self.hue_max_deg && s >= self.sat_min && v >= self.val_min
    }
}

impl Default for KeyColorRange {
    fn default() -> Self {
        Self::GREEN
    }
}

/// Convert 8-bit RGB to (hue degrees 0..360, saturation 0..=1, value 0..=1).
pub(crate) fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (f32, f32, f32) {
    let (rf, gf, bf) = (f32::from(r), f32::from(g), f32::from(b));
    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let delta = max - min;
    let v = max / 255.0;
    if max <= 0.0 || delta <= 0.0 {
        return (0.0, 0.0, v);
    }
    let s = delta / max;
    let h = if max == rf {
        60.0 * (((gf - bf) / delta).rem_euclid(6.0))
    } else if max == gf {
        60.0 * (((bf - rf) / delta) + 2.0)
    } else {
        60.0 * (((rf - gf) / delta) + 4.0)
    };
    (h, s, v)
}

/// Per-pixel key classification aligned with a template frame; `true` marks the key region.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    bits: Vec<u64>,
    true_count: usize,
}

impl Mask {
    /// Pack a row-major boolean grid.
    pub fn from_bools(width: u32, height: u32, values: &[bool]) -> VertikalResult<Self> {
        let len = width as usize * height as usize;
        if values.len() != len {
            return Err(VertikalError::validation(format!(
                "mask expects {len} values for {width}x{height}, got {}",
                values.len()
            )));
        }
        Ok(Self::pack(width, height, values))
    }

    fn pack(width: u32, height: u32, values: &[bool]) -> Self {
        let mut bits = vec![0u64; values.len().div_ceil(64)];
        let mut true_count = 0usize;
        for (i, _) in values.iter().enumerate().filter(|(_, v)| **v) {
            bits[i / 64] |= 1u64 << (i % 64);
            true_count += 1;
        }
        Self {
            width,
            height,
            bits,
            true_count,
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total pixel count.
    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Return `true` for a zero-sized mask.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Key pixels.
    pub fn true_count(&self) -> usize {
        self.true_count
    }

    /// Template pixels.
    pub fn false_count(&self) -> usize {
        self.len() - self.true_count
    }

    /// Classification of pixel `(x, y)`; out-of-bounds is `false`.
    pub fn get(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.get_index(y as usize * self.width as usize + x as usize)
    }

    pub(crate) fn get_index(&self, i: usize) -> bool {
        (self.bits[i / 64] >> (i % 64)) & 1 == 1
    }

    /// Black/white preview image: white where the source video shows through.
    pub fn to_preview(&self) -> image::GrayImage {
        image::GrayImage::from_fn(self.width, self.height, |x, y| {
            image::Luma([if self.get(x, y) { 255 } else { 0 }])
        })
    }
}

/// Derives key masks from template frames.
#[derive(Clone, Copy, Debug)]
pub struct MaskBuilder {
    range: KeyColorRange,
    kernel_radius: u32,
}

impl Default for MaskBuilder {
    fn default() -> Self {
        Self {
            range: KeyColorRange::GREEN,
            kernel_radius: 1,
        }
    }
}

impl MaskBuilder {
    /// Builder with a custom key range and morphology kernel radius (1 = 3x3).
    pub fn new(range: KeyColorRange, kernel_radius: u32) -> Self {
        Self {
            range,
            kernel_radius,
        }
    }

    /// Classify every pixel and clean up speckles (erosion then dilation).
    pub fn classify(&self, frame: &Frame) -> Mask {
        let (w, h) = frame.dimensions();
        let raw: Vec<bool> = frame
            .pixels()
            .map(|p| self.range.contains(p[0], p[1], p[2]))
            .collect();
        let eroded = morph(&raw, w as usize, h as usize, self.kernel_radius as usize, Morph::Erode);
        let opened = morph(&eroded, w as usize, h as usize, self.kernel_radius as usize, Morph::Dilate);
        Mask::pack(w, h, &opened)
    }

    /// Classify `frame` and fail with [`VertikalError::MaskEmpty`] when no key pixel remains.
    pub fn build(&self, frame: &Frame, template_path: &Path) -> VertikalResult<Mask> {
        let mask = self.classify(frame);
        if mask.true_count() == 0 {
            return Err(VertikalError::MaskEmpty {
                path: template_path.to_path_buf(),
            });
        }
        Ok(mask)
    }
}

#[derive(Clone, Copy)]
enum Morph {
    Erode,
    Dilate,
}

/// Square-kernel morphology as two separable passes; out-of-bounds neighbors are ignored.
fn morph(src: &[bool], w: usize, h: usize, r: usize, op: Morph) -> Vec<bool> {
    if r == 0 || w == 0 || h == 0 {
        return src.to_vec();
    }
    let combine = |acc: bool, v: bool| match op {
        Morph::Erode => acc && v,
        Morph::Dilate => acc || v,
    };
    let init = matches!(op, Morph::Erode);

    let mut tmp = vec![false; src.len()];
    for y in 0..h {
        let row = &src[y * w..(y + 1) * w];
        for x in 0..w {
            let lo = x.saturating_sub(r);
            let hi = (x + r).min(w - 1);
            tmp[y * w + x] = row[lo..=hi].iter().fold(init, |a, &v| combine(a, v));
        }
    }

    let mut out = vec![false; src.len()];
    for y in 0..h {
        let lo = y.saturating_sub(r);
        let hi = (y + r).min(h - 1);
        for x in 0..w {
            out[y * w + x] = (lo..=hi).fold(init, |a, yy| combine(a, tmp[yy * w + x]));
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/effects/mask.rs"]
mod tests;
