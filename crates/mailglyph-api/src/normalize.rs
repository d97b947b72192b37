// this_file: crates/mailglyph-api/src/normalize.rs

//! Options normalizer: defaults merged under caller input, one validation
//! pass, font resolution, then an immutable [`RenderRequest`].

use crate::config::{Defaults, RenderConfig};
use crate::schema::{self, *};
use log::debug;
use mailglyph_core::{Anchor, OutlineConfig, RenderRequest, Result};
use mailglyph_fontdb::FontResolver;
use std::path::PathBuf;

/// Validated options awaiting font resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedOptions {
    pub font_name_or_path: String,
    request: RenderRequest,
}

impl ValidatedOptions {
    /// Attach the resolved font and release the finished request.
    pub fn with_font(mut self, name: String, path: PathBuf) -> RenderRequest {
        self.request.font_name = name;
        self.request.font_path = path;
        self.request
    }
}

/// Merge `config` over `defaults` and validate every field.
///
/// Both inputs are copied; later changes to either never reach the result.
pub fn validate(defaults: &Defaults, config: &RenderConfig) -> Result<ValidatedOptions> {
    let options = defaults.apply_to(config);
    schema::validate(&options)?;

    let font_size = FONT_SIZE.pixel_size(&options)?;
    let font_color = FONT_COLOR.text(&options)?;

    let mut attributes = OUTLINE_ATTRIBUTES.attributes(&options)?;
    // outline fill follows the font colour unless set explicitly
    attributes
        .entry("fill".to_string())
        .or_insert_with(|| font_color.clone());

    let outline = OutlineConfig {
        x: OUTLINE_X.number(&options)?.unwrap_or(0.0),
        y: OUTLINE_Y.number(&options)?.unwrap_or(0.0),
        anchor: Anchor::parse(&OUTLINE_ANCHOR.text(&options)?),
        font_size: OUTLINE_FONT_SIZE
            .number(&options)?
            .unwrap_or(f64::from(font_size)),
        kerning: OUTLINE_KERNING.flag(&options)?,
        attributes,
    };

    let request = RenderRequest {
        text: TEXT.text(&options)?,
        font_size,
        font_color,
        background_color: BACKGROUND_COLOR.text(&options)?,
        supports_fallback: SUPPORTS_FALLBACK.flag(&options)?,
        resize_to_font_size: RESIZE_TO_FONT_SIZE.flag(&options)?,
        trim: TRIM.flag(&options)?,
        trim_tolerance: TRIM_TOLERANCE.percent(&options)?,
        attrs: ATTRS.attributes(&options)?,
        outline,
        font_name: String::new(),
        font_path: PathBuf::new(),
    };

    Ok(ValidatedOptions {
        font_name_or_path: FONT_NAME_OR_PATH.text(&options)?,
        request,
    })
}

/// Validate, then resolve `fontNameOrPath` into a font name and path.
pub async fn normalize(
    defaults: &Defaults,
    config: &RenderConfig,
    resolver: &FontResolver,
) -> Result<RenderRequest> {
    let validated = validate(defaults, config)?;
    let font = resolver.resolve(&validated.font_name_or_path).await?;
    debug!(
        target: "mailglyph::normalize",
        "{:?} -> {} ({})",
        validated.font_name_or_path,
        font.name,
        font.path.display()
    );
    Ok(validated.with_font(font.name, font.path))
}
