//! Caption layout and rasterization.

/// 5x7 bitmap font used when no outline font resolves.
pub mod builtin;
/// Greedy line wrapping, anchoring and layer rendering.
pub mod layout;
/// Word/space/pictogram tokenization.
pub mod tokens;
/// Outline or built-in glyph source.
pub mod typeface;
