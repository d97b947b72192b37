// this_file: backends/mailglyph-skia/src/lib.rs

//! resvg + tiny-skia raster engine.
//!
//! Rasterizes SVG markup at its declared size, then offers the trim, resize
//! and PNG encode steps the rendering pipeline applies to raster output.

use log::debug;
use mailglyph_core::{
    read_png_metadata, ImageMetadata, MailGlyphError, RasterEngine, RasterImage, RenderSurface,
    Result,
};
use tiny_skia::{FilterQuality, IntRect, Pixmap, PixmapPaint, Transform};

/// Raster engine backed by usvg parsing and resvg rendering.
#[derive(Debug, Default, Clone)]
pub struct SkiaRasterEngine;

impl SkiaRasterEngine {
    pub fn new() -> Self {
        Self
    }
}

impl RasterEngine for SkiaRasterEngine {
    fn rasterize(&self, markup: &[u8]) -> Result<Box<dyn RasterImage>> {
        let options = usvg::Options::default();
        let tree = usvg::Tree::from_data(markup, &options)
            .map_err(|err| MailGlyphError::render(format!("SVG parse error: {err}")))?;

        let size = tree.size().to_int_size();
        let mut pixmap = Pixmap::new(size.width(), size.height()).ok_or_else(|| {
            MailGlyphError::render(format!(
                "Failed to create {}x{} pixmap",
                size.width(),
                size.height()
            ))
        })?;
        resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());

        debug!(
            target: "mailglyph::render",
            "rasterized {}x{} pixels",
            pixmap.width(),
            pixmap.height()
        );
        Ok(Box::new(SkiaImage { pixmap }))
    }

    fn read_metadata(&self, encoded: &[u8]) -> Result<ImageMetadata> {
        read_png_metadata(encoded)
    }

    fn name(&self) -> &str {
        "resvg+tiny-skia"
    }
}

/// Pixmap being post-processed before encoding.
pub struct SkiaImage {
    pixmap: Pixmap,
}

impl SkiaImage {
    /// Bounding box of pixels that differ from the top-left pixel by more than `threshold`.
    fn content_bounds(&self, threshold: f32) -> Option<IntRect> {
        let width = self.pixmap.width() as usize;
        let pixels = self.pixmap.pixels();
        let reference = pixels.first()?.demultiply();

        let mut min_x = usize::MAX;
        let mut min_y = usize::MAX;
        let mut max_x = 0usize;
        let mut max_y = 0usize;

        for (index, pixel) in pixels.iter().enumerate() {
            let pixel = pixel.demultiply();
            let delta = [
                pixel.red().abs_diff(reference.red()),
                pixel.green().abs_diff(reference.green()),
                pixel.blue().abs_diff(reference.blue()),
                pixel.alpha().abs_diff(reference.alpha()),
            ]
            .into_iter()
            .max()
            .unwrap_or(0);

            if f32::from(delta) > threshold {
                let (x, y) = (index % width, index / width);
                min_x = min_x.min(x);
                min_y = min_y.min(y);
                max_x = max_x.max(x);
                max_y = max_y.max(y);
            }
        }

        if min_x == usize::MAX {
            return None;
        }
        IntRect::from_xywh(
            min_x as i32,
            min_y as i32,
            (max_x - min_x + 1) as u32,
            (max_y - min_y + 1) as u32,
        )
    }
}

impl RasterImage for SkiaImage {
    fn trim(&mut self, tolerance_percent: u8) -> Result<()> {
        let threshold = f32::from(tolerance_percent) / 100.0 * 255.0;
        let Some(bounds) = self.content_bounds(threshold) else {
            debug!(target: "mailglyph::render", "trim found no content, keeping image");
            return Ok(());
        };
        if bounds.width() == self.pixmap.width() && bounds.height() == self.pixmap.height() {
            return Ok(());
        }
        self.pixmap = self
            .pixmap
            .clone_rect(bounds)
            .ok_or_else(|| MailGlyphError::render("Failed to crop pixmap"))?;
        Ok(())
    }

    fn resize(&mut self, width: Option<u32>, height: u32) -> Result<()> {
        if height == 0 {
            return Err(MailGlyphError::render("Cannot resize to zero height"));
        }
        let (old_width, old_height) = (self.pixmap.width(), self.pixmap.height());
        let width = width.unwrap_or_else(|| {
            let ratio = f64::from(height) / f64::from(old_height);
            ((f64::from(old_width) * ratio).round() as u32).max(1)
        });
        if width == old_width && height == old_height {
            return Ok(());
        }

        let mut resized = Pixmap::new(width, height).ok_or_else(|| {
            MailGlyphError::render(format!("Failed to create {width}x{height} pixmap"))
        })?;
        let paint = PixmapPaint {
            quality: FilterQuality::Bicubic,
            ..PixmapPaint::default()
        };
        let transform = Transform::from_scale(
            width as f32 / old_width as f32,
            height as f32 / old_height as f32,
        );
        resized.draw_pixmap(0, 0, self.pixmap.as_ref(), &paint, transform, None);
        self.pixmap = resized;
        Ok(())
    }

    fn encode_png(&self) -> Result<Vec<u8>> {
        RenderSurface::from_rgba(
            self.pixmap.width(),
            self.pixmap.height(),
            self.pixmap.data().to_vec(),
            true,
        )
        .encode_png()
    }

    fn dimensions(&self) -> ImageMetadata {
        ImageMetadata {
            width: self.pixmap.width(),
            height: self.pixmap.height(),
        }
    }
}
