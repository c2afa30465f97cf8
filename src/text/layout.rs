use std::sync::Arc;

use crate::assets::fonts::FontResolver;
use crate::config::options::TextSpec;
use crate::effects::composite::{over, over_layer_in_place, premul_color};
use crate::foundation::core::{Canvas, Frame, Rgb8};
use crate::foundation::error::VertikalResult;
use crate::foundation::math::percent_offset;
use crate::text::tokens::{Token, tokenize};
use crate::text::typeface::{GlyphBitmap, Typeface};

/// Extra pixels between consecutive lines.
pub const LINE_GAP: u32 = 10;
/// Minimum distance between the text block and the top/bottom canvas edges.
pub const V_MARGIN: u32 = 20;
/// Fixed left/right margin; lines wrap at `canvas.width - 2 * H_MARGIN`.
pub const H_MARGIN: u32 = 40;
/// Edge length of the square box a pictogram occupies.
pub const PICTOGRAM_PX: u32 = 80;

/// Content of one placed run.
#[derive(Clone, Debug, PartialEq)]
pub enum Run {
    /// Text drawn with the caption typeface.
    Text(String),
    /// A whole pictogram cluster.
    Pictogram(String),
}

/// A run and its horizontal placement within its line.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedRun {
    /// What is drawn.
    pub run: Run,
    /// Left edge relative to the line start.
    pub x: f32,
    /// Advance width.
    pub width: f32,
}

/// One wrapped line.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayoutLine {
    runs: Vec<PlacedRun>,
    text: String,
    width: f32,
}

impl LayoutLine {
    /// Runs in reading order.
    pub fn runs(&self) -> &[PlacedRun] {
        &self.runs
    }

    /// Plain text of the line, pictograms included.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Total advance width.
    pub fn width(&self) -> f32 {
        self.width
    }

    fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    fn push(&mut self, run: Run, width: f32, gap: f32) {
        if gap > 0.0 {
            self.text.push(' ');
        }
        match &run {
            Run::Text(s) | Run::Pictogram(s) => self.text.push_str(s),
        }
        let x = self.width + gap;
        self.width = x + width;
        self.runs.push(PlacedRun { run, x, width });
    }
}

struct Wrapper {
    max: f32,
    space_w: f32,
    lines: Vec<LayoutLine>,
    cur: LayoutLine,
    pending_space: bool,
}

impl Wrapper {
    fn space(&mut self) {
        if !self.cur.is_empty() {
            self.pending_space = true;
        }
    }

    fn place(&mut self, run: Run, width: f32) {
        let mut gap = if self.pending_space { self.space_w } else { 0.0 };
        if !self.cur.is_empty() && self.cur.width + gap + width > self.max {
            self.break_line();
            gap = 0.0;
        }
        self.cur.push(run, width, gap);
        self.pending_space = false;
    }

    fn break_line(&mut self) {
        if !self.cur.is_empty() {
            self.lines.push(std::mem::take(&mut self.cur));
        }
        self.pending_space = false;
    }

    fn finish(mut self) -> Vec<LayoutLine> {
        self.break_line();
        self.lines
    }
}

/// Wraps, anchors and rasterizes captions for one canvas and typeface.
#[derive(Clone)]
pub struct TextLayoutEngine {
    face: Typeface,
    pictograms: Option<Arc<fontdue::Font>>,
    canvas: Canvas,
}

impl TextLayoutEngine {
    /// Engine drawing text with `face` and pictograms with `pictograms` (boxes when absent).
    pub fn new(face: Typeface, pictograms: Option<Arc<fontdue::Font>>, canvas: Canvas) -> Self {
        Self {
            face,
            pictograms,
            canvas,
        }
    }

    /// Engine for the font named by `font`, resolved through `resolver`.
    pub fn from_resolver(resolver: &FontResolver, font: &str, canvas: Canvas) -> Self {
        Self::new(resolver.resolve(font), resolver.pictogram_face(), canvas)
    }

    /// Caption typeface.
    pub fn typeface(&self) -> &Typeface {
        &self.face
    }

    /// Wrap width for this canvas.
    pub fn max_width(&self) -> f32 {
        self.canvas.width.saturating_sub(2 * H_MARGIN).max(1) as f32
    }

    /// Line pitch for a font size.
    pub fn line_height(size: u32) -> u32 {
        size + LINE_GAP
    }

    /// Height of a block of `lines` lines.
    pub fn block_height(lines: usize, size: u32) -> u32 {
        lines as u32 * Self::line_height(size)
    }

    /// Greedy wrap of `text`; only an atom wider than `max_width` on its own can overflow.
    pub fn layout(&self, text: &str, size: u32, max_width: f32) -> Vec<LayoutLine> {
        let px = size as f32;
        let mut w = Wrapper {
            max: max_width,
            space_w: self.face.advance(' ', px),
            lines: Vec::new(),
            cur: LayoutLine::default(),
            pending_space: false,
        };
        for token in tokenize(text) {
            match token {
                Token::Space => w.space(),
                Token::Pictogram(p) => w.place(Run::Pictogram(p.to_string()), PICTOGRAM_PX as f32),
                Token::Word(word) => {
                    let width = self.face.measure(word, px);
                    if width <= max_width {
                        w.place(Run::Text(word.to_string()), width);
                    } else {
                        self.place_split(&mut w, word, px);
                    }
                }
            }
        }
        w.finish()
    }

    /// Wrapped lines as plain strings.
    pub fn wrap(&self, text: &str, size: u32, max_width: f32) -> Vec<String> {
        self.layout(text, size, max_width)
            .into_iter()
            .map(|l| l.text)
            .collect()
    }

    // Over-long words start a fresh line and break between characters.
    fn place_split(&self, w: &mut Wrapper, word: &str, px: f32) {
        w.break_line();
        let mut chunk = String::new();
        let mut chunk_w = 0.0f32;
        for ch in word.chars() {
            let cw = self.face.advance(ch, px);
            if !chunk.is_empty() && chunk_w + cw > w.max {
                w.place(Run::Text(std::mem::take(&mut chunk)), chunk_w);
                w.break_line();
                chunk_w = 0.0;
            }
            chunk.push(ch);
            chunk_w += cw;
        }
        if !chunk.is_empty() {
            w.place(Run::Text(chunk), chunk_w);
        }
    }

    /// Top of a block of `block_h` pixels placed at `y_percent` of the free height.
    pub fn anchor_y(&self, block_h: u32, y_percent: f32) -> u32 {
        let h = i64::from(self.canvas.height);
        let block = i64::from(block_h);
        let margin = i64::from(V_MARGIN);
        let free = h - block - 2 * margin;
        let base = (f64::from(y_percent) / 100.0 * free as f64).trunc() as i64;
        base.min(h - block - margin).max(margin) as u32
    }

    /// Rasterize `lines` into a premultiplied layer whose block top sits at `anchor_y`.
    pub fn render(
        &self,
        lines: &[LayoutLine],
        size: u32,
        x_percent: f32,
        anchor_y: u32,
        color: Rgb8,
    ) -> TextLayer {
        let px = size as f32;
        let pad = PICTOGRAM_PX.max(size) / 2;
        let widest = lines.iter().map(LayoutLine::width).fold(0.0f32, f32::max);
        let block_w = widest.ceil() as u32;
        let width = block_w + 2 * pad;
        let height = Self::block_height(lines.len(), size) + 2 * pad;
        let room = (self.max_width() as u32).saturating_sub(block_w);
        let block_x = H_MARGIN + percent_offset(x_percent, room);

        let mut layer = TextLayer {
            x: i64::from(block_x) - i64::from(pad),
            y: i64::from(anchor_y) - i64::from(pad),
            width,
            height,
            pixels: vec![0u8; width as usize * height as usize * 4],
        };

        let ascent = self.face.ascent(px);
        let pad = i64::from(pad);
        for (i, line) in lines.iter().enumerate() {
            let top = pad + (i as u32 * Self::line_height(size)) as i64;
            let baseline = top + ascent.round() as i64;
            for placed in line.runs() {
                let left = pad + placed.x.round() as i64;
                match &placed.run {
                    Run::Text(s) => {
                        let mut pen = 0.0f32;
                        for ch in s.chars() {
                            let g = self.face.glyph(ch, px);
                            let gx = left + pen.round() as i64 + i64::from(g.left);
                            layer.blit(&g, gx, baseline + i64::from(g.top), color);
                            pen += self.face.advance(ch, px);
                        }
                    }
                    Run::Pictogram(cluster) => {
                        let g = self.pictogram_bitmap(cluster);
                        let box_top = top + (i64::from(size) - i64::from(PICTOGRAM_PX)) / 2;
                        layer.blit(&g, left + i64::from(g.left), box_top + i64::from(g.top), color);
                    }
                }
            }
        }
        layer
    }

    // Bitmap positioned inside the pictogram box (left/top relative to the box corner).
    fn pictogram_bitmap(&self, cluster: &str) -> GlyphBitmap {
        let base = cluster.chars().next().unwrap_or(' ');
        match &self.pictograms {
            Some(font) if font.lookup_glyph_index(base) != 0 => {
                let (m, coverage) = font.rasterize(base, PICTOGRAM_PX as f32 * 0.8);
                centered_pictogram(m.width as u32, m.height as u32, coverage)
            }
            _ => placeholder_box(),
        }
    }
}

// A face can map a pictogram yet draw nothing (bitmap-only color faces); that gets the box too.
fn centered_pictogram(width: u32, height: u32, coverage: Vec<u8>) -> GlyphBitmap {
    if width == 0 || height == 0 || coverage.iter().all(|&c| c == 0) {
        return placeholder_box();
    }
    GlyphBitmap {
        width,
        height,
        left: (PICTOGRAM_PX.saturating_sub(width) / 2) as i32,
        top: (PICTOGRAM_PX.saturating_sub(height) / 2) as i32,
        coverage,
    }
}

// Hollow square drawn when no pictogram face covers the cluster.
fn placeholder_box() -> GlyphBitmap {
    let size = PICTOGRAM_PX;
    let inset = size / 10;
    let stroke = (size / 16).max(1);
    let mut coverage = vec![0u8; (size * size) as usize];
    for y in inset..size - inset {
        for x in inset..size - inset {
            let edge = x < inset + stroke
                || x >= size - inset - stroke
                || y < inset + stroke
                || y >= size - inset - stroke;
            if edge {
                coverage[(y * size + x) as usize] = 255;
            }
        }
    }
    GlyphBitmap {
        width: size,
        height: size,
        left: 0,
        top: 0,
        coverage,
    }
}

/// Premultiplied caption raster and its canvas position.
#[derive(Clone, Debug)]
pub struct TextLayer {
    x: i64,
    y: i64,
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl TextLayer {
    /// Canvas position of the layer's top-left corner.
    pub fn origin(&self) -> (i64, i64) {
        (self.x, self.y)
    }

    /// Layer size in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Return `true` when nothing was drawn.
    pub fn is_blank(&self) -> bool {
        self.pixels.chunks_exact(4).all(|p| p[3] == 0)
    }

    /// Composite the layer over `frame`.
    pub fn apply(&self, frame: &mut Frame) -> VertikalResult<()> {
        over_layer_in_place(frame, &self.pixels, self.width, self.height, self.x, self.y)
    }

    fn blit(&mut self, g: &GlyphBitmap, x: i64, y: i64, color: Rgb8) {
        let (w, h) = (i64::from(self.width), i64::from(self.height));
        for gy in 0..i64::from(g.height) {
            let dy = y + gy;
            if dy < 0 || dy >= h {
                continue;
            }
            for gx in 0..i64::from(g.width) {
                let dx = x + gx;
                if dx < 0 || dx >= w {
                    continue;
                }
                let cov = g.coverage[(gy * i64::from(g.width) + gx) as usize];
                if cov == 0 {
                    continue;
                }
                let i = ((dy * w + dx) * 4) as usize;
                let dst = [
                    self.pixels[i],
                    self.pixels[i + 1],
                    self.pixels[i + 2],
                    self.pixels[i + 3],
                ];
                let out = over(dst, premul_color(color, cov));
                self.pixels[i..i + 4].copy_from_slice(&out);
            }
        }
    }
}

/// A caption rendered once per job and blended onto every frame.
#[derive(Clone, Debug)]
pub struct TextOverlay {
    lines: Vec<String>,
    layer: TextLayer,
}

impl TextOverlay {
    /// Lay out and rasterize `caption`; `None` when the overlay is disabled or the caption is blank.
    pub fn prepare(engine: &TextLayoutEngine, style: &TextSpec, caption: &str) -> Option<Self> {
        if !style.enabled() || caption.trim().is_empty() {
            return None;
        }
        let lines = engine.layout(caption, style.size(), engine.max_width());
        if lines.is_empty() {
            return None;
        }
        let block = TextLayoutEngine::block_height(lines.len(), style.size());
        let anchor = engine.anchor_y(block, style.y_percent());
        let layer = engine.render(&lines, style.size(), style.x_percent(), anchor, style.color());
        tracing::debug!(lines = lines.len(), anchor, "caption laid out");
        Some(Self {
            lines: lines.into_iter().map(|l| l.text).collect(),
            layer,
        })
    }

    /// Wrapped caption lines.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Rendered layer.
    pub fn layer(&self) -> &TextLayer {
        &self.layer
    }

    /// Blend the caption onto `frame`.
    pub fn apply(&self, frame: &mut Frame) -> VertikalResult<()> {
        self.layer.apply(frame)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/layout.rs"]
mod tests;
