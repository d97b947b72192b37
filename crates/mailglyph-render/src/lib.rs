// this_file: crates/mailglyph-render/src/lib.rs

//! Rendering for mailglyph: the ttf-parser outline engine and the pipeline
//! that turns normalized requests into SVG, `<img>` and PNG output.

mod markup;
pub mod outlines;
pub mod pipeline;
pub mod svg;

pub use pipeline::{fallback_attributes, validate_scale, RenderPipeline};
pub use svg::{TextMetrics, TtfFace, TtfOutlineEngine};
