// this_file: crates/mailglyph-render/src/svg.rs

//! Text-outline engine: font file + string to single-path SVG markup.

use crate::outlines::glyph_outline;
use kurbo::{BezPath, Point};
use log::debug;
use lru::LruCache;
use mailglyph_core::{
    utils::format_css_number, HorizontalAnchor, MailGlyphError, OutlineConfig, OutlineEngine,
    OutlineFace, Result, VerticalAnchor,
};
use owned_ttf_parser::{AsFaceRef, OwnedFace};
use parking_lot::Mutex;
use std::fmt::Write;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use ttf_parser::GlyphId;

const DEFAULT_FACE_CAPACITY: usize = 16;
const PATH_PRECISION: usize = 2;

/// Outline engine backed by ttf-parser, keeping recently used faces.
pub struct TtfOutlineEngine {
    faces: Mutex<LruCache<PathBuf, Arc<TtfFace>>>,
}

impl Default for TtfOutlineEngine {
    fn default() -> Self {
        Self::new(DEFAULT_FACE_CAPACITY)
    }
}

impl TtfOutlineEngine {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            faces: Mutex::new(LruCache::new(capacity)),
        }
    }
}

impl OutlineEngine for TtfOutlineEngine {
    fn load(&self, font_path: &Path) -> Result<Arc<dyn OutlineFace>> {
        if let Some(face) = self.faces.lock().get(font_path) {
            return Ok(face.clone());
        }

        let data = std::fs::read(font_path)
            .map_err(|err| MailGlyphError::font_load(font_path.to_path_buf(), err))?;
        let face = OwnedFace::from_vec(data, 0).map_err(|_| MailGlyphError::InvalidFontData {
            path: font_path.to_path_buf(),
        })?;
        debug!(target: "mailglyph::render", "loaded face {}", font_path.display());

        let face = Arc::new(TtfFace { face });
        self.faces.lock().put(font_path.to_path_buf(), face.clone());
        Ok(face)
    }

    fn name(&self) -> &str {
        "ttf-parser"
    }
}

/// Line metrics of a laid out string, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub x: f64,
    pub y: f64,
    pub baseline: f64,
    pub width: f64,
    pub height: f64,
    pub ascender: f64,
    pub descender: f64,
}

/// A parsed face ready to outline text.
pub struct TtfFace {
    face: OwnedFace,
}

impl TtfFace {
    fn glyphs(&self, text: &str) -> Vec<GlyphId> {
        let face = self.face.as_face_ref();
        text.chars()
            .map(|ch| face.glyph_index(ch).unwrap_or(GlyphId(0)))
            .collect()
    }

    /// Pen advances per glyph in font units, kerning folded into the left glyph.
    fn advances(&self, glyphs: &[GlyphId], kerning: bool) -> Vec<f64> {
        let face = self.face.as_face_ref();
        glyphs
            .iter()
            .enumerate()
            .map(|(index, glyph)| {
                let mut advance = f64::from(face.glyph_hor_advance(*glyph).unwrap_or(0));
                if kerning {
                    if let Some(next) = glyphs.get(index + 1) {
                        advance += f64::from(self.kerning(*glyph, *next));
                    }
                }
                advance
            })
            .collect()
    }

    fn kerning(&self, left: GlyphId, right: GlyphId) -> i16 {
        let Some(kern) = self.face.as_face_ref().tables().kern else {
            return 0;
        };
        kern.subtables
            .into_iter()
            .filter(|subtable| subtable.horizontal && !subtable.variable)
            .find_map(|subtable| subtable.glyphs_kerning(left, right))
            .unwrap_or(0)
    }

    /// Measure `text` and position it according to `layout.anchor`.
    pub fn metrics(&self, text: &str, layout: &OutlineConfig) -> TextMetrics {
        let face = self.face.as_face_ref();
        let scale = layout.font_size / f64::from(face.units_per_em());
        let glyphs = self.glyphs(text);
        let width = self.advances(&glyphs, layout.kerning).iter().sum::<f64>() * scale;
        let ascender = f64::from(face.ascender()) * scale;
        let descender = f64::from(face.descender()) * scale;
        let height = ascender - descender;

        let x = layout.x
            - match layout.anchor.horizontal {
                HorizontalAnchor::Left => 0.0,
                HorizontalAnchor::Center => width / 2.0,
                HorizontalAnchor::Right => width,
            };
        let y = layout.y
            - match layout.anchor.vertical {
                VerticalAnchor::Baseline => ascender,
                VerticalAnchor::Top => 0.0,
                VerticalAnchor::Middle => height / 2.0,
                VerticalAnchor::Bottom => height,
            };

        TextMetrics {
            x,
            y,
            baseline: y + ascender,
            width,
            height,
            ascender,
            descender,
        }
    }

    /// Outline of the whole string as one path.
    pub fn text_path(&self, text: &str, layout: &OutlineConfig) -> BezPath {
        let face = self.face.as_face_ref();
        let scale = layout.font_size / f64::from(face.units_per_em());
        let metrics = self.metrics(text, layout);
        let glyphs = self.glyphs(text);
        let advances = self.advances(&glyphs, layout.kerning);

        let mut path = BezPath::new();
        let mut pen_x = metrics.x;
        for (glyph, advance) in glyphs.iter().zip(advances) {
            if let Some(outline) = glyph_outline(&self.face, *glyph) {
                let placed = outline.place(scale, Point::new(pen_x, metrics.baseline));
                path.extend(placed.elements().iter().copied());
            }
            pen_x += advance * scale;
        }
        path
    }
}

impl OutlineFace for TtfFace {
    fn outline_markup(&self, text: &str, layout: &OutlineConfig) -> Result<String> {
        let metrics = self.metrics(text, layout);
        let data = simplify_path(&self.text_path(text, layout).to_svg(), PATH_PRECISION);

        let mut svg = String::with_capacity(data.len() + 256);
        let _ = write!(
            &mut svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{}" height="{}"><path"#,
            format_css_number(metrics.width),
            format_css_number(metrics.height),
        );
        for (key, value) in &layout.attributes {
            let _ = write!(
                &mut svg,
                r#" {}="{}""#,
                key,
                quick_xml::escape::escape(value.as_str())
            );
        }
        let _ = write!(&mut svg, r#" d="{data}"/></svg>"#);
        Ok(svg)
    }
}

/// Round every coordinate in an SVG path string to `precision` decimals.
pub fn simplify_path(path: &str, precision: usize) -> String {
    let mut result = String::with_capacity(path.len());
    let mut chars = path.chars().peekable();
    let factor = 10_f64.powi(precision as i32);

    while let Some(ch) = chars.next() {
        if !(ch.is_ascii_digit() || ch == '.' || ch == '-') {
            result.push(ch);
            continue;
        }

        let mut num = String::from(ch);
        while let Some(next) = chars.next_if(|c| c.is_ascii_digit() || *c == '.') {
            num.push(next);
        }
        match num.parse::<f64>() {
            Ok(value) => {
                let rounded = (value * factor).round() / factor;
                // avoid "-0"
                let rounded = if rounded == 0.0 { 0.0 } else { rounded };
                result.push_str(&format_css_number(rounded));
            }
            Err(_) => result.push_str(&num),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outlines::tests::dejavu_path;
    use mailglyph_core::Anchor;
    use std::collections::BTreeMap;

    fn layout(anchor: &str) -> OutlineConfig {
        OutlineConfig {
            x: 0.0,
            y: 0.0,
            anchor: Anchor::parse(anchor),
            font_size: 24.0,
            kerning: true,
            attributes: BTreeMap::from([
                ("fill".to_string(), "#f00".to_string()),
                ("stroke".to_string(), "none".to_string()),
            ]),
        }
    }

    fn face() -> Arc<dyn OutlineFace> {
        TtfOutlineEngine::default().load(&dejavu_path()).unwrap()
    }

    #[test]
    fn test_path_simplification() {
        let simplified = simplify_path("M10.123456,20.987654 L30.1,-0.0001 Z", 2);
        assert_eq!(simplified, "M10.12,20.99 L30.1,0 Z");
    }

    #[test]
    fn markup_declares_size_and_attributes() {
        let svg = face().outline_markup("Hello", &layout("left top")).unwrap();
        assert!(svg.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg""#));
        assert!(svg.contains(r##"<path fill="#f00" stroke="none" d="M"##));
        assert!(svg.ends_with("/></svg>"));
    }

    #[test]
    fn anchors_shift_origin() {
        let engine = TtfOutlineEngine::default();
        engine.load(&dejavu_path()).unwrap();
        let face = engine.faces.lock().peek(&dejavu_path()).cloned().unwrap();

        let top_left = face.metrics("Hi", &layout("left top"));
        assert_eq!(top_left.x, 0.0);
        assert_eq!(top_left.y, 0.0);
        assert!((top_left.baseline - top_left.ascender).abs() < 1e-9);
        assert!(top_left.height > 24.0);

        let centered = face.metrics("Hi", &layout("center middle"));
        assert!((centered.x + top_left.width / 2.0).abs() < 1e-9);
        assert!((centered.y + top_left.height / 2.0).abs() < 1e-9);

        let baseline = face.metrics("Hi", &layout("right baseline"));
        assert!((baseline.x + top_left.width).abs() < 1e-9);
        assert!(baseline.baseline.abs() < 1e-9);
    }

    #[test]
    fn empty_text_has_zero_width() {
        let svg = face().outline_markup("", &layout("left top")).unwrap();
        assert!(svg.contains(r#"width="0""#));
        assert!(svg.contains(r#"d="""#));
    }

    #[test]
    fn faces_are_cached() {
        let engine = TtfOutlineEngine::new(2);
        let first = engine.load(&dejavu_path()).unwrap();
        let second = engine.load(&dejavu_path()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn missing_or_invalid_fonts_fail() {
        let engine = TtfOutlineEngine::default();
        assert!(matches!(
            engine.load(Path::new("/no/such/font.ttf")),
            Err(MailGlyphError::FontLoad { .. })
        ));

        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("bogus.ttf");
        std::fs::write(&bogus, b"not a font").unwrap();
        assert!(matches!(
            engine.load(&bogus),
            Err(MailGlyphError::InvalidFontData { .. })
        ));
    }
}
