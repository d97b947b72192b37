// this_file: crates/mailglyph-api/src/lib.rs

//! Public API for mailglyph: loose configuration, validation and the
//! [`MailGlyph`] context that exposes every render and font operation.

pub mod config;
pub mod context;
pub mod normalize;
pub mod schema;

pub use config::{deep_merge, Defaults, RenderConfig};
pub use context::{default_bundled_dir, MailGlyph, MailGlyphBuilder};
pub use normalize::{normalize, validate, ValidatedOptions};
pub use schema::{FieldKind, FieldSpec, SCHEMA};
