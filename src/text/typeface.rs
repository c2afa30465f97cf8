use std::sync::Arc;

use crate::text::builtin;

/// Coverage bitmap of one glyph, positioned relative to the pen and baseline.
#[derive(Clone, Debug, Default)]
pub struct GlyphBitmap {
    /// Bitmap width in pixels.
    pub width: u32,
    /// Bitmap height in pixels.
    pub height: u32,
    /// Offset from the pen x to the bitmap's left edge.
    pub left: i32,
    /// Offset from the baseline to the bitmap's top edge (negative is above).
    pub top: i32,
    /// Row-major 8-bit coverage.
    pub coverage: Vec<u8>,
}

/// Glyph source for caption text.
#[derive(Clone)]
pub enum Typeface {
    /// Outline font rasterized with `fontdue`.
    Outline(Arc<fontdue::Font>),
    /// Built-in 5x7 bitmap font.
    Builtin,
}

impl std::fmt::Debug for Typeface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Outline(font) => f
                .debug_tuple("Outline")
                .field(&font.name().unwrap_or("unnamed"))
                .finish(),
            Self::Builtin => f.write_str("Builtin"),
        }
    }
}

impl Typeface {
    /// Return `true` for the bitmap fallback.
    pub fn is_builtin(&self) -> bool {
        matches!(self, Self::Builtin)
    }

    /// Horizontal advance of `ch` at `px`.
    pub fn advance(&self, ch: char, px: f32) -> f32 {
        match self {
            Self::Outline(font) => font.metrics(ch, px).advance_width,
            Self::Builtin => (builtin::CELL_W * builtin::scale_for(px)) as f32,
        }
    }

    /// Sum of advances of every char in `text`.
    pub fn measure(&self, text: &str, px: f32) -> f32 {
        text.chars().map(|c| self.advance(c, px)).sum()
    }

    /// Distance from the line top to the baseline.
    pub fn ascent(&self, px: f32) -> f32 {
        match self {
            Self::Outline(font) => font
                .horizontal_line_metrics(px)
                .map(|m| m.ascent)
                .unwrap_or(px * 0.8),
            Self::Builtin => (builtin::GLYPH_H * builtin::scale_for(px)) as f32,
        }
    }

    /// Rasterize `ch` at `px`.
    pub fn glyph(&self, ch: char, px: f32) -> GlyphBitmap {
        match self {
            Self::Outline(font) => {
                let (m, coverage) = font.rasterize(ch, px);
                GlyphBitmap {
                    width: m.width as u32,
                    height: m.height as u32,
                    left: m.xmin,
                    top: -(m.ymin + m.height as i32),
                    coverage,
                }
            }
            Self::Builtin => {
                let scale = builtin::scale_for(px);
                GlyphBitmap {
                    width: builtin::GLYPH_W * scale,
                    height: builtin::GLYPH_H * scale,
                    left: 0,
                    top: -((builtin::GLYPH_H * scale) as i32),
                    coverage: builtin::rasterize(ch, scale),
                }
            }
        }
    }
}
