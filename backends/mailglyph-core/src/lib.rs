// this_file: backends/mailglyph-core/src/lib.rs

//! Core traits and types for the mailglyph text-to-image renderer.

pub mod cache;
pub mod diagnostics;
pub mod error;
pub mod surface;
pub mod traits;
pub mod types;
pub mod utils;

pub use cache::{CacheKey, CacheStats, RenderCache};
pub use diagnostics::RenderRequestDiagnostics;
pub use error::{ErrorKind, MailGlyphError};
pub use surface::{read_png_metadata, RenderSurface};
pub use traits::{FontScanner, OutlineEngine, OutlineFace, RasterEngine, RasterImage};
pub use types::{
    has_supported_extension, Anchor, FontCategory, FontEntry, HorizontalAnchor, ImageMetadata,
    OperationKind, OutlineConfig, RenderRequest, ResolvedFont, VerticalAnchor,
    SUPPORTED_FONT_EXTENSIONS,
};

/// Result type for mailglyph operations
pub type Result<T> = std::result::Result<T, MailGlyphError>;
