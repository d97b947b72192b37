// this_file: crates/mailglyph-render/src/pipeline.rs

//! Rendering pipeline: vector markup, then image tags and scaled rasters
//! derived from it, each stage cached under its own operation kind.

use crate::markup::{Document, Element, Syntax};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::debug;
use lru::LruCache;
use mailglyph_core::utils::{format_css_number, parse_leading_number, round_half_up};
use mailglyph_core::{
    CacheKey, ImageMetadata, MailGlyphError, OperationKind, OutlineEngine, RasterEngine,
    RenderCache, RenderRequest, RenderRequestDiagnostics, Result,
};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Turns normalized requests into output strings.
pub struct RenderPipeline {
    cache: Arc<RenderCache>,
    outlines: Arc<dyn OutlineEngine>,
    raster: Arc<dyn RasterEngine>,
    logical_sizes: Mutex<LruCache<CacheKey, ImageMetadata>>,
}

const LOGICAL_SIZE_CAPACITY: usize = 1024;

impl RenderPipeline {
    pub fn new(outlines: Arc<dyn OutlineEngine>, raster: Arc<dyn RasterEngine>) -> Self {
        Self::with_cache(outlines, raster, Arc::new(RenderCache::new()))
    }

    pub fn with_cache(
        outlines: Arc<dyn OutlineEngine>,
        raster: Arc<dyn RasterEngine>,
        cache: Arc<RenderCache>,
    ) -> Self {
        let capacity = NonZeroUsize::new(LOGICAL_SIZE_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache,
            outlines,
            raster,
            logical_sizes: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn cache(&self) -> &RenderCache {
        &self.cache
    }

    /// SVG markup with a background rectangle, whole-pixel size and caller attributes.
    pub async fn render_vector(&self, request: &RenderRequest) -> Result<Arc<str>> {
        let key = CacheKey::new(OperationKind::Vector, request)?;
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }
        RenderRequestDiagnostics::new(OperationKind::Vector, request).log();

        let engine = Arc::clone(&self.outlines);
        let font_path = request.font_path.clone();
        let text = request.text.clone();
        let layout = request.outline.clone();
        let outline = tokio::task::spawn_blocking(move || {
            engine.load(&font_path)?.outline_markup(&text, &layout)
        })
        .await
        .map_err(|err| MailGlyphError::Task(err.to_string()))??;

        let markup = frame_vector(&outline, request)?;
        Ok(self.cache.insert(key, markup))
    }

    /// `<img>` embedding the vector output as an SVG data URI.
    pub async fn render_image_tag(&self, request: &RenderRequest) -> Result<Arc<str>> {
        let key = CacheKey::new(OperationKind::ImageTag, request)?;
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }
        RenderRequestDiagnostics::new(OperationKind::ImageTag, request).log();

        let svg = self.render_vector(request).await?;
        let doc = Document::parse(&svg)?;
        let width = doc.root().attr("width").unwrap_or("0").to_string();
        let height = doc.root().attr("height").unwrap_or("0").to_string();

        let fallback_height = parse_leading_number(&height).unwrap_or(0.0);

        let mut img = Element::new("img");
        img.set_attr("width", width);
        img.set_attr("height", height);
        img.set_attr(
            "src",
            format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg.as_bytes())),
        );
        let img = finish_image_tag(img, request, fallback_height);

        Ok(self.cache.insert(key, img))
    }

    /// `<img>` embedding a PNG rendered at `scale` times the logical size.
    ///
    /// The logical size is the 1x raster's pixel size. Oversampled PNGs are
    /// resized to exactly `scale` times it, so every scale declares the same
    /// width and height.
    pub async fn render_raster(&self, request: &RenderRequest, scale: f64) -> Result<Arc<str>> {
        validate_scale(scale)?;
        let operation = OperationKind::raster(scale);
        let key = CacheKey::new(operation, request)?;
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }
        RenderRequestDiagnostics::new(operation, request).log();

        let (png, logical, pixels) = if operation == OperationKind::raster(1.0) {
            let (png, pixels) = self.rasterize(request, None).await?;
            self.logical_sizes.lock().put(key.clone(), pixels);
            (png, pixels, pixels)
        } else {
            let logical = self.logical_size(request).await?;
            let target = ImageMetadata {
                width: scale_pixels(logical.width, scale),
                height: scale_pixels(logical.height, scale),
            };
            let (png, pixels) = self.rasterize(&request.scaled(scale), Some(target)).await?;
            (png, logical, pixels)
        };
        debug!(
            target: "mailglyph::render",
            "{operation}: {}x{} pixels reported as {}x{}",
            pixels.width,
            pixels.height,
            logical.width,
            logical.height
        );

        let height = f64::from(logical.height);
        let mut img = Element::new("img");
        img.set_attr("width", logical.width.to_string());
        img.set_attr("height", logical.height.to_string());
        img.set_attr(
            "src",
            format!("data:image/png;base64,{}", STANDARD.encode(&png)),
        );
        let img = finish_image_tag(img, request, height);

        Ok(self.cache.insert(key, img))
    }

    /// Pixel size of the 1x raster, remembered per request.
    async fn logical_size(&self, request: &RenderRequest) -> Result<ImageMetadata> {
        let key = CacheKey::new(OperationKind::raster(1.0), request)?;
        let cached = self.logical_sizes.lock().get(&key).copied();
        if let Some(size) = cached {
            return Ok(size);
        }
        let (_, size) = self.rasterize(request, None).await?;
        self.logical_sizes.lock().put(key, size);
        Ok(size)
    }

    /// Rasterize the vector output, trim, then resize to `target` when given
    /// or to the font size height when the request asks for it.
    async fn rasterize(
        &self,
        working: &RenderRequest,
        target: Option<ImageMetadata>,
    ) -> Result<(Vec<u8>, ImageMetadata)> {
        let svg = self.render_vector(working).await?;

        let engine = Arc::clone(&self.raster);
        let trim = working.trim.then_some(working.trim_tolerance);
        let resize = working.resize_to_font_size.then_some(working.font_size);
        tokio::task::spawn_blocking(move || {
            let mut image = engine.rasterize(svg.as_bytes())?;
            if let Some(tolerance) = trim {
                image.trim(tolerance)?;
            }
            match (target, resize) {
                (Some(size), _) => image.resize(Some(size.width), size.height)?,
                (None, Some(height)) => image.resize(None, height)?,
                (None, None) => {}
            }
            let png = image.encode_png()?;
            let metadata = engine.read_metadata(&png)?;
            Ok::<(Vec<u8>, ImageMetadata), MailGlyphError>((png, metadata))
        })
        .await
        .map_err(|err| MailGlyphError::Task(err.to_string()))?
    }
}

fn scale_pixels(logical: u32, scale: f64) -> u32 {
    (round_half_up(f64::from(logical) * scale) as u32).max(1)
}

/// Reject scales that are not positive finite numbers.
pub fn validate_scale(scale: f64) -> Result<()> {
    if scale.is_finite() && scale > 0.0 {
        Ok(())
    } else {
        Err(MailGlyphError::InvalidScale {
            value: scale.to_string(),
        })
    }
}

fn frame_vector(outline: &str, request: &RenderRequest) -> Result<String> {
    let mut doc = Document::parse(outline)?;
    let root = doc.root_mut();
    let width = root
        .attr("width")
        .ok_or_else(|| MailGlyphError::markup("outline markup has no width"))?
        .to_string();
    let height = root
        .attr("height")
        .ok_or_else(|| MailGlyphError::markup("outline markup has no height"))?
        .to_string();

    let width_px = round_half_up(parse_leading_number(&width).unwrap_or(0.0));
    let height_px = round_half_up(parse_leading_number(&height).unwrap_or(0.0));

    let mut rect = Element::new("rect");
    rect.set_attr("width", width);
    rect.set_attr("height", height);
    rect.set_attr("fill", request.background_color.as_str());
    root.prepend(rect);

    let width_px = format_css_number(width_px);
    let height_px = format_css_number(height_px);
    root.set_attr("viewBox", format!("0 0 {width_px} {height_px}"));
    root.set_attr("width", width_px);
    root.set_attr("height", height_px);

    for (key, value) in &request.attrs {
        root.set_attr(key, value.as_str());
    }
    Ok(doc.serialize(Syntax::Xml))
}

/// Apply fallback attributes, then caller attributes, and serialize.
fn finish_image_tag(mut img: Element, request: &RenderRequest, height: f64) -> String {
    if request.supports_fallback {
        for (key, value) in fallback_attributes(request, height) {
            img.set_attr(key, value);
        }
    }
    for (key, value) in &request.attrs {
        img.set_attr(key, value.as_str());
    }
    Document::new(img).serialize(Syntax::Html)
}

/// `title`, `alt` and an inline style readable without image support.
pub fn fallback_attributes(request: &RenderRequest, height: f64) -> BTreeMap<&'static str, String> {
    let style = format!(
        "color: {};font-size: {}px;line-height: {}px;text-align: center;background-color: {};",
        request.font_color,
        format_css_number(height / 2.0),
        format_css_number(height),
        request.background_color,
    );
    BTreeMap::from([
        ("title", request.text.clone()),
        ("alt", request.text.clone()),
        ("style", style),
    ])
}
