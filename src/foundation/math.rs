pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y).min(255) as u8
}

/// Round `percent / 100 * range` and clamp the result into `[0, range]`.
pub(crate) fn percent_offset(percent: f32, range: u32) -> u32 {
    let raw = (f64::from(percent) / 100.0 * f64::from(range)).round();
    raw.clamp(0.0, f64::from(range)) as u32
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
