// this_file: backends/mailglyph-core/src/traits.rs

//! Collaborator seams: outline generation, rasterization and font discovery.
//!
//! The rendering pipeline only talks to these traits, so tests can swap in
//! doubles and alternative engines can be plugged in without touching the core.

use crate::{FontCategory, ImageMetadata, OutlineConfig, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Converts a font file plus a string into vector path markup.
pub trait OutlineEngine: Send + Sync {
    /// Load (or fetch from cache) the face stored at `font_path`.
    fn load(&self, font_path: &Path) -> Result<Arc<dyn OutlineFace>>;

    /// Engine name for diagnostics.
    fn name(&self) -> &str;
}

/// A loaded face able to lay out a single line of text.
pub trait OutlineFace: Send + Sync {
    /// Produce an `<svg>` fragment with declared `width`/`height` and one `<path>`.
    fn outline_markup(&self, text: &str, layout: &OutlineConfig) -> Result<String>;
}

/// Rasterizes vector markup and reads back encoded images.
pub trait RasterEngine: Send + Sync {
    /// Rasterize SVG bytes at their declared size.
    fn rasterize(&self, markup: &[u8]) -> Result<Box<dyn RasterImage>>;

    /// Read pixel dimensions from encoded PNG bytes.
    fn read_metadata(&self, encoded: &[u8]) -> Result<ImageMetadata>;

    /// Engine name for diagnostics.
    fn name(&self) -> &str;
}

/// A mutable raster produced by a [`RasterEngine`].
pub trait RasterImage: Send {
    /// Crop away border pixels within `tolerance_percent` of the top-left colour.
    fn trim(&mut self, tolerance_percent: u8) -> Result<()>;

    /// Resize to `height`; when `width` is `None` the aspect ratio is kept.
    fn resize(&mut self, width: Option<u32>, height: u32) -> Result<()>;

    /// Encode as PNG.
    fn encode_png(&self) -> Result<Vec<u8>>;

    /// Current pixel dimensions.
    fn dimensions(&self) -> ImageMetadata;
}

/// Enumerates font files available to the catalog.
pub trait FontScanner: Send + Sync {
    /// Font files installed in one location class.
    fn list_installed_fonts(&self, category: FontCategory) -> Result<Vec<PathBuf>>;

    /// Font files shipped alongside the library.
    fn list_bundled_fonts(&self) -> Result<Vec<PathBuf>>;
}
