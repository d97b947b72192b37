// this_file: src/lib.rs

//! mailglyph: text rendered in any installed or bundled font as SVG or PNG
//! image markup for clients that cannot load web fonts.
//!
//! ```no_run
//! # async fn demo() -> mailglyph::Result<()> {
//! use mailglyph::{MailGlyph, RenderConfig};
//!
//! let glyph = MailGlyph::new();
//! let config = RenderConfig::new().text("Hello").font_name_or_path("Georgia");
//! let img = glyph.render_raster_2x(&config).await?;
//! # Ok(())
//! # }
//! ```

pub use mailglyph_api::{
    default_bundled_dir, Defaults, FieldKind, FieldSpec, MailGlyph, MailGlyphBuilder,
    RenderConfig, SCHEMA,
};
pub use mailglyph_core::{
    Anchor, CacheStats, ErrorKind, FontCategory, FontEntry, FontScanner, HorizontalAnchor,
    ImageMetadata, MailGlyphError, OperationKind, OutlineConfig, OutlineEngine, OutlineFace,
    RasterEngine, RasterImage, RenderRequest, ResolvedFont, Result, VerticalAnchor,
    SUPPORTED_FONT_EXTENSIONS,
};
pub use mailglyph_fontdb::{DirectoryFontScanner, FontCatalog, FontResolver};
pub use mailglyph_render::{RenderPipeline, TtfOutlineEngine};
pub use mailglyph_skia::SkiaRasterEngine;
