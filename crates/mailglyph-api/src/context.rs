// this_file: crates/mailglyph-api/src/context.rs

//! The `MailGlyph` context: defaults, font catalog, resolver and render
//! cache owned together and shared by every operation.

use crate::config::{Defaults, RenderConfig};
use crate::normalize;
use log::debug;
use mailglyph_core::{
    CacheStats, FontScanner, OutlineEngine, RasterEngine, RenderRequest, ResolvedFont, Result,
};
use mailglyph_fontdb::{DirectoryFontScanner, FontCatalog, FontResolver};
use mailglyph_render::{validate_scale, RenderPipeline, TtfOutlineEngine};
use mailglyph_skia::SkiaRasterEngine;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

const DEFAULT_FACE_CACHE: usize = 16;

/// Bundled font directory shipped with the workspace.
pub fn default_bundled_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../assets/fonts")
}

/// Configures collaborators before building a [`MailGlyph`].
pub struct MailGlyphBuilder {
    outlines: Option<Arc<dyn OutlineEngine>>,
    raster: Option<Arc<dyn RasterEngine>>,
    scanner: Option<Arc<dyn FontScanner>>,
    bundled_dir: Option<PathBuf>,
    face_cache: usize,
    defaults: Defaults,
}

impl Default for MailGlyphBuilder {
    fn default() -> Self {
        Self {
            outlines: None,
            raster: None,
            scanner: None,
            bundled_dir: None,
            face_cache: DEFAULT_FACE_CACHE,
            defaults: Defaults::builtin(),
        }
    }
}

impl MailGlyphBuilder {
    pub fn outline_engine(mut self, engine: Arc<dyn OutlineEngine>) -> Self {
        self.outlines = Some(engine);
        self
    }

    pub fn raster_engine(mut self, engine: Arc<dyn RasterEngine>) -> Self {
        self.raster = Some(engine);
        self
    }

    /// Replace directory scanning entirely.
    pub fn font_scanner(mut self, scanner: Arc<dyn FontScanner>) -> Self {
        self.scanner = Some(scanner);
        self
    }

    /// Bundled font directory; takes precedence over `MAILGLYPH_FONT_DIR`.
    pub fn bundled_font_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.bundled_dir = Some(dir.into());
        self
    }

    /// Number of parsed font faces kept by the default outline engine.
    pub fn face_cache_capacity(mut self, capacity: usize) -> Self {
        self.face_cache = capacity;
        self
    }

    /// Merge `partial` over the built-in defaults.
    pub fn defaults(mut self, partial: &RenderConfig) -> Self {
        self.defaults.merge(partial);
        self
    }

    pub fn build(self) -> MailGlyph {
        let scanner: Arc<dyn FontScanner> = match (self.scanner, self.bundled_dir) {
            (Some(scanner), _) => scanner,
            (None, Some(dir)) => Arc::new(DirectoryFontScanner::new(Some(dir))),
            (None, None) => Arc::new(DirectoryFontScanner::from_env(Some(default_bundled_dir()))),
        };
        let outlines: Arc<dyn OutlineEngine> = match self.outlines {
            Some(engine) => engine,
            None => Arc::new(TtfOutlineEngine::new(self.face_cache)),
        };
        let raster: Arc<dyn RasterEngine> = match self.raster {
            Some(engine) => engine,
            None => Arc::new(SkiaRasterEngine::new()),
        };

        debug!(
            target: "mailglyph::render",
            "building context with outline engine {} and raster engine {}",
            outlines.name(),
            raster.name()
        );

        let catalog = Arc::new(FontCatalog::new(scanner));
        MailGlyph {
            defaults: RwLock::new(self.defaults),
            resolver: FontResolver::new(catalog),
            pipeline: RenderPipeline::new(outlines, raster),
        }
    }
}

/// Text-to-image renderer with its own defaults, font catalog and cache.
///
/// Construct once and share; every method takes `&self`.
pub struct MailGlyph {
    defaults: RwLock<Defaults>,
    resolver: FontResolver,
    pipeline: RenderPipeline,
}

impl Default for MailGlyph {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl MailGlyph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> MailGlyphBuilder {
        MailGlyphBuilder::default()
    }

    /// Merge `partial` into the defaults and return the result.
    pub fn set_defaults(&self, partial: &RenderConfig) -> RenderConfig {
        let mut defaults = self.defaults.write();
        defaults.merge(partial);
        defaults.to_config()
    }

    pub fn defaults(&self) -> RenderConfig {
        self.defaults.read().to_config()
    }

    pub async fn normalize_options(&self, config: &RenderConfig) -> Result<RenderRequest> {
        let defaults = self.defaults.read().clone();
        normalize::normalize(&defaults, config, &self.resolver).await
    }

    /// SVG markup.
    pub async fn render_vector(&self, config: &RenderConfig) -> Result<Arc<str>> {
        let request = self.normalize_options(config).await?;
        self.pipeline.render_vector(&request).await
    }

    /// `<img>` with the SVG inlined as a data URI.
    pub async fn render_image_tag(&self, config: &RenderConfig) -> Result<Arc<str>> {
        let request = self.normalize_options(config).await?;
        self.pipeline.render_image_tag(&request).await
    }

    /// `<img>` with a PNG rendered at `scale` times its logical size.
    pub async fn render_raster(&self, config: &RenderConfig, scale: f64) -> Result<Arc<str>> {
        validate_scale(scale)?;
        let request = self.normalize_options(config).await?;
        self.pipeline.render_raster(&request, scale).await
    }

    pub async fn render_raster_2x(&self, config: &RenderConfig) -> Result<Arc<str>> {
        self.render_raster(config, 2.0).await
    }

    pub async fn render_raster_3x(&self, config: &RenderConfig) -> Result<Arc<str>> {
        self.render_raster(config, 3.0).await
    }

    /// Resolve a name or path the same way rendering does.
    pub async fn resolve_font(&self, name_or_path: &str) -> Result<ResolvedFont> {
        self.resolver.resolve(name_or_path).await
    }

    /// Closest catalog name by edit distance.
    pub async fn resolve_closest_font_name(&self, name: &str) -> Result<String> {
        self.resolver.closest_font_name(name).await
    }

    pub async fn get_font_path_by_name(&self, name: &str) -> Result<PathBuf> {
        self.resolver.font_path_by_name(name).await
    }

    pub async fn list_font_paths(&self) -> Result<Vec<PathBuf>> {
        self.resolver.catalog().font_paths().await
    }

    pub async fn list_font_names(&self) -> Result<Vec<String>> {
        self.resolver.catalog().font_names().await
    }

    pub async fn font_paths_by_name(&self) -> Result<BTreeMap<String, PathBuf>> {
        self.resolver.catalog().paths_by_name().await
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.pipeline.cache().stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailglyph_core::{FontCategory, MailGlyphError};

    fn bundled_only() -> MailGlyph {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut scanner = DirectoryFontScanner::new(Some(default_bundled_dir()));
        for category in FontCategory::ALL {
            scanner = scanner.with_category_dirs(category, Vec::new());
        }
        MailGlyph::builder().font_scanner(Arc::new(scanner)).build()
    }

    fn dejavu() -> String {
        default_bundled_dir()
            .join("DejaVuSans.ttf")
            .to_string_lossy()
            .into_owned()
    }

    fn attr<'a>(tag: &'a str, key: &str) -> Option<&'a str> {
        let needle = format!(r#" {key}=""#);
        let start = tag.find(&needle)? + needle.len();
        let len = tag[start..].find('"')?;
        Some(&tag[start..start + len])
    }

    #[tokio::test]
    async fn catalog_lists_bundled_font() {
        let glyph = bundled_only();
        assert_eq!(glyph.list_font_names().await.unwrap(), vec!["DejaVuSans"]);
        let paths = glyph.list_font_paths().await.unwrap();
        assert_eq!(paths.len(), 1);
        assert!(paths[0].ends_with("DejaVuSans.ttf"));
        assert_eq!(
            glyph.get_font_path_by_name("DejaVuSans").await.unwrap(),
            paths[0]
        );
        assert_eq!(glyph.font_paths_by_name().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn font_names_resolve_fuzzily() {
        let glyph = bundled_only();
        assert_eq!(
            glyph.resolve_closest_font_name("DejaVu Sans").await.unwrap(),
            "DejaVuSans"
        );
        let request = glyph
            .normalize_options(&RenderConfig::new().font_name_or_path("dejavusans"))
            .await
            .unwrap();
        assert_eq!(request.font_name, "DejaVuSans");
        assert!(request.font_path.is_absolute());

        let err = glyph
            .resolve_closest_font_name("Foo Bar Baz Beep")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn renders_vector_with_font_color_fill() {
        let glyph = bundled_only();
        let config = RenderConfig::new()
            .text("Hello World")
            .font_name_or_path(dejavu())
            .font_color("#336699");
        let svg = glyph.render_vector(&config).await.unwrap();

        let width: u32 = attr(&svg, "width").unwrap().parse().unwrap();
        let height: u32 = attr(&svg, "height").unwrap().parse().unwrap();
        assert!(width > 0 && height > 0);
        assert!(svg.find("<rect").unwrap() < svg.find("<path").unwrap());
        assert!(svg.contains(r##"<path fill="#336699""##));
    }

    #[tokio::test]
    async fn equivalent_configs_share_cache_entries() {
        let glyph = bundled_only();
        let first = glyph
            .render_vector(
                &RenderConfig::new()
                    .text("Hi")
                    .font_name_or_path(dejavu())
                    .font_size_css("24px"),
            )
            .await
            .unwrap();
        let entries = glyph.cache_stats().entries;

        let second = glyph
            .render_vector(
                &RenderConfig::new()
                    .text("Hi")
                    .font_name_or_path(dejavu())
                    .font_size(24.0),
            )
            .await
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(glyph.cache_stats().entries, entries);
        assert!(glyph.cache_stats().hits >= 1);
    }

    #[tokio::test]
    async fn raster_scales_report_same_logical_size() {
        let glyph = bundled_only();
        let config = RenderConfig::new()
            .text("Hello World")
            .font_name_or_path(dejavu());

        let one = glyph.render_raster(&config, 1.0).await.unwrap();
        let two = glyph.render_raster_2x(&config).await.unwrap();
        let three = glyph.render_raster_3x(&config).await.unwrap();

        for tag in [&two, &three] {
            assert_eq!(attr(tag, "width"), attr(&one, "width"));
            assert_eq!(attr(tag, "height"), attr(&one, "height"));
        }
        // trim and resize are on by default
        assert_eq!(attr(&one, "height"), Some("24"));
        assert!(one.contains("data:image/png;base64,"));
        assert_eq!(attr(&one, "alt"), Some("Hello World"));
    }

    #[tokio::test]
    async fn image_tag_wraps_svg() {
        let glyph = bundled_only();
        let config = RenderConfig::new()
            .text("Hi")
            .font_name_or_path(dejavu())
            .supports_fallback(false)
            .attr("class", "heading");
        let img = glyph.render_image_tag(&config).await.unwrap();
        assert!(img.starts_with("<img "));
        assert!(attr(&img, "src")
            .unwrap()
            .starts_with("data:image/svg+xml;base64,"));
        assert_eq!(attr(&img, "class"), Some("heading"));
        assert_eq!(attr(&img, "alt"), None);
    }

    #[tokio::test]
    async fn invalid_scale_is_checked_first() {
        let glyph = bundled_only();
        let config = RenderConfig::new().font_size_css("abc");
        let err = glyph.render_raster(&config, f64::NAN).await.unwrap_err();
        assert!(matches!(err, MailGlyphError::InvalidScale { .. }));
        assert_eq!(glyph.cache_stats().misses, 0);
    }

    #[tokio::test]
    async fn defaults_apply_to_later_calls() {
        let glyph = bundled_only();
        let merged = glyph.set_defaults(
            &RenderConfig::new()
                .font_name_or_path(dejavu())
                .background_color("white"),
        );
        assert_eq!(merged.as_map()["backgroundColor"], "white");

        let request = glyph
            .normalize_options(&RenderConfig::new().text("x"))
            .await
            .unwrap();
        assert_eq!(request.background_color, "white");
        assert_eq!(request.font_name, "DejaVuSans");

        let own = glyph
            .normalize_options(&RenderConfig::new().background_color("black"))
            .await
            .unwrap();
        assert_eq!(own.background_color, "black");
    }

    #[tokio::test]
    async fn missing_font_file_is_not_found() {
        let glyph = bundled_only();
        let err = glyph
            .render_vector(&RenderConfig::new().font_name_or_path("/no/such/Font.ttf"))
            .await
            .unwrap_err();
        assert!(matches!(err, MailGlyphError::FontFileNotFound { .. }));

        let err = glyph
            .render_vector(&RenderConfig::new().font_name_or_path("/no/such/Font"))
            .await
            .unwrap_err();
        assert!(matches!(err, MailGlyphError::FontPathNotFound { .. }));
    }
}
