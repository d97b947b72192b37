// this_file: backends/mailglyph-core/src/types.rs

//! Core types used throughout the mailglyph renderer.

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Font file extensions accepted anywhere a font path is expected, in probe priority order.
///
/// Matching is case-sensitive.
pub const SUPPORTED_FONT_EXTENSIONS: [&str; 6] = ["otf", "OTF", "ttf", "TTF", "woff", "WOFF"];

/// Whether `path` carries one of [`SUPPORTED_FONT_EXTENSIONS`].
pub fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_FONT_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

/// Fully resolved render request.
///
/// Produced by the options normalizer; nothing downstream applies further defaults.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    /// Text to render
    pub text: String,
    /// Font size in logical pixels
    pub font_size: u32,
    /// Glyph colour
    pub font_color: String,
    /// Background rectangle colour
    pub background_color: String,
    /// Emit title/alt/style fallback attributes on image tags
    pub supports_fallback: bool,
    /// Resize rasters so their height equals `font_size`
    pub resize_to_font_size: bool,
    /// Trim surrounding background from rasters
    pub trim: bool,
    /// Trim tolerance percentage, 1..=99
    pub trim_tolerance: u8,
    /// Caller attributes applied last to the output element
    pub attrs: BTreeMap<String, String>,
    /// Layout handed to the outline engine
    pub outline: OutlineConfig,
    /// Resolved font name
    pub font_name: String,
    /// Resolved absolute font path
    pub font_path: PathBuf,
}

impl RenderRequest {
    /// Copy of this request oversampled by `scale` for raster work.
    pub fn scaled(&self, scale: f64) -> Self {
        let mut scaled = self.clone();
        let size = (f64::from(self.font_size) * scale).round().max(1.0);
        scaled.font_size = size as u32;
        scaled.outline.font_size = size;
        scaled
    }
}

/// Layout configuration for the outline engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineConfig {
    pub x: f64,
    pub y: f64,
    pub anchor: Anchor,
    pub font_size: f64,
    pub kerning: bool,
    /// Attributes copied onto the emitted `<path>`, including `fill`
    pub attributes: BTreeMap<String, String>,
}

impl OutlineConfig {
    pub fn fill(&self) -> Option<&str> {
        self.attributes.get("fill").map(String::as_str)
    }
}

/// Horizontal anchor of the outline origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HorizontalAnchor {
    #[default]
    Left,
    Center,
    Right,
}

/// Vertical anchor of the outline origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerticalAnchor {
    #[default]
    Baseline,
    Top,
    Middle,
    Bottom,
}

/// Anchor such as `"left top"` or `"center middle"`.
///
/// Parsing is lenient: unknown words are ignored and missing halves fall back
/// to `left` / `baseline`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Anchor {
    pub horizontal: HorizontalAnchor,
    pub vertical: VerticalAnchor,
}

impl Anchor {
    pub fn parse(value: &str) -> Self {
        let mut anchor = Anchor::default();
        for word in value.split_whitespace() {
            match word.to_ascii_lowercase().as_str() {
                "left" => anchor.horizontal = HorizontalAnchor::Left,
                "center" => anchor.horizontal = HorizontalAnchor::Center,
                "right" => anchor.horizontal = HorizontalAnchor::Right,
                "baseline" => anchor.vertical = VerticalAnchor::Baseline,
                "top" => anchor.vertical = VerticalAnchor::Top,
                "middle" => anchor.vertical = VerticalAnchor::Middle,
                "bottom" => anchor.vertical = VerticalAnchor::Bottom,
                _ => {}
            }
        }
        anchor
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let horizontal = match self.horizontal {
            HorizontalAnchor::Left => "left",
            HorizontalAnchor::Center => "center",
            HorizontalAnchor::Right => "right",
        };
        let vertical = match self.vertical {
            VerticalAnchor::Baseline => "baseline",
            VerticalAnchor::Top => "top",
            VerticalAnchor::Middle => "middle",
            VerticalAnchor::Bottom => "bottom",
        };
        write!(f, "{horizontal} {vertical}")
    }
}

impl Serialize for Anchor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Outcome of font resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFont {
    pub name: String,
    pub path: PathBuf,
}

/// Installed-font location class, scanned in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontCategory {
    User,
    Local,
    Network,
    System,
}

impl FontCategory {
    pub const ALL: [FontCategory; 4] = [
        FontCategory::User,
        FontCategory::Local,
        FontCategory::Network,
        FontCategory::System,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FontCategory::User => "user",
            FontCategory::Local => "local",
            FontCategory::Network => "network",
            FontCategory::System => "system",
        }
    }
}

/// One catalog row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontEntry {
    pub name: String,
    pub path: PathBuf,
}

impl FontEntry {
    /// Build an entry, deriving the name from the file stem.
    pub fn from_path(path: PathBuf) -> Self {
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { name, path }
    }
}

/// Kind of output a pipeline stage produces; part of every cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// SVG markup
    Vector,
    /// `<img>` wrapping the SVG as a data URI
    ImageTag,
    /// `<img>` wrapping a PNG rendered at a working scale, in thousandths
    Raster { per_mille: u32 },
}

impl OperationKind {
    /// Raster operation for a positive working scale.
    pub fn raster(scale: f64) -> Self {
        OperationKind::Raster {
            per_mille: (scale * 1000.0).round() as u32,
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Vector => f.write_str("vector"),
            OperationKind::ImageTag => f.write_str("img"),
            OperationKind::Raster { per_mille: 1000 } => f.write_str("raster"),
            OperationKind::Raster { per_mille } => write!(
                f,
                "raster@{}x",
                crate::utils::format_css_number(f64::from(*per_mille) / 1000.0)
            ),
        }
    }
}

/// Pixel metadata read back from an encoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
}
