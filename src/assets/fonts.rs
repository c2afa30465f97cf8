use std::path::Path;
use std::sync::Arc;

use usvg::fontdb::{Database, Family, Query};

use crate::text::typeface::Typeface;

/// Families tried, in order, for pictograms (emoji). Outline faces come first: fontdue cannot
/// rasterize the bitmap tables of color faces.
const PICTOGRAM_FAMILIES: [&str; 6] = [
    "Noto Emoji",
    "Twemoji Mozilla",
    "Segoe UI Emoji",
    "Symbola",
    "Noto Color Emoji",
    "Apple Color Emoji",
];

const OUTLINE_CHECK: char = '\u{1F600}';

/// Resolves caption font identifiers to typefaces through the system font database.
pub struct FontResolver {
    db: Database,
}

impl FontResolver {
    /// Resolver backed by every font installed on the system.
    pub fn system() -> Self {
        let mut db = Database::new();
        db.load_system_fonts();
        tracing::debug!(faces = db.len(), "loaded system fonts");
        Self { db }
    }

    /// Resolver with no fonts; every lookup falls back to the built-in font.
    pub fn empty() -> Self {
        Self {
            db: Database::new(),
        }
    }

    /// Resolve `ident` (a font file path or a family name), degrading to the built-in font.
    pub fn resolve(&self, ident: &str) -> Typeface {
        let ident = ident.trim();
        if ident.is_empty() {
            return Typeface::Builtin;
        }

        if is_font_file(ident) {
            match std::fs::read(ident) {
                Ok(bytes) => match fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default()) {
                    Ok(font) => return Typeface::Outline(Arc::new(font)),
                    Err(e) => tracing::warn!(font = ident, error = e, "font file unreadable"),
                },
                Err(e) => tracing::warn!(font = ident, error = %e, "font file missing"),
            }
            return Typeface::Builtin;
        }

        let generic = generic_family_for(ident);
        for family in [Family::Name(ident), generic] {
            if let Some(font) = self.load_family(family) {
                return Typeface::Outline(Arc::new(font));
            }
        }
        tracing::warn!(font = ident, "font not found, using built-in fallback");
        Typeface::Builtin
    }

    /// Outline face used for pictograms, when the system has one.
    pub fn pictogram_face(&self) -> Option<Arc<fontdue::Font>> {
        PICTOGRAM_FAMILIES
            .iter()
            .find_map(|name| {
                let font = self.load_family(Family::Name(name))?;
                if draws_outlines(&font) {
                    Some(font)
                } else {
                    tracing::debug!(family = name, "pictogram face has no outlines, skipping");
                    None
                }
            })
            .map(Arc::new)
    }

    fn load_family(&self, family: Family<'_>) -> Option<fontdue::Font> {
        let families = [family];
        let query = Query {
            families: &families,
            ..Query::default()
        };
        let id = self.db.query(&query)?;
        self.db
            .with_face_data(id, |data, index| {
                fontdue::Font::from_bytes(
                    data,
                    fontdue::FontSettings {
                        collection_index: index,
                        ..fontdue::FontSettings::default()
                    },
                )
            })?
            .ok()
    }
}

fn is_font_file(ident: &str) -> bool {
    Path::new(ident)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "ttf" | "otf" | "ttc"))
}

/// Generic family used when a named family is not installed.
fn generic_family_for(name: &str) -> Family<'static> {
    let lower = name.to_ascii_lowercase();
    if lower.contains("times")
        || lower.contains("georgia")
        || (lower.contains("serif") && !lower.contains("sans"))
    {
        Family::Serif
    } else if lower.contains("courier") || lower.contains("mono") {
        Family::Monospace
    } else {
        Family::SansSerif
    }
}

fn draws_outlines(font: &fontdue::Font) -> bool {
    if font.lookup_glyph_index(OUTLINE_CHECK) == 0 {
        return false;
    }
    let (metrics, coverage) = font.rasterize(OUTLINE_CHECK, 32.0);
    metrics.width > 0 && coverage.iter().any(|&c| c > 0)
}
