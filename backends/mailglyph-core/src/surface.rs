// this_file: backends/mailglyph-core/src/surface.rs

//! PNG encoding and metadata helpers shared by raster engines.

use crate::{ImageMetadata, MailGlyphError, Result};
use std::io::Cursor;

/// RGBA pixel buffer awaiting PNG encoding.
#[derive(Debug)]
pub struct RenderSurface {
    width: u32,
    height: u32,
    premultiplied: bool,
    data: Vec<u8>,
}

impl RenderSurface {
    /// Create a new RGBA surface.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>, premultiplied: bool) -> Self {
        Self {
            width,
            height,
            premultiplied,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Encode the surface as an 8-bit RGBA PNG.
    pub fn encode_png(mut self) -> Result<Vec<u8>> {
        let expected = self.width as usize * self.height as usize * 4;
        if self.data.len() != expected {
            return Err(MailGlyphError::render(format!(
                "pixel data size mismatch: expected {expected} bytes, got {}",
                self.data.len()
            )));
        }
        if self.premultiplied {
            unpremultiply(&mut self.data);
        }
        encode_png(self.width, self.height, &self.data)
    }
}

/// Read width/height from PNG bytes without decoding pixels.
pub fn read_png_metadata(encoded: &[u8]) -> Result<ImageMetadata> {
    let decoder = png::Decoder::new(Cursor::new(encoded));
    let reader = decoder
        .read_info()
        .map_err(|err| MailGlyphError::render(format!("PNG decode error: {err}")))?;
    let info = reader.info();
    Ok(ImageMetadata {
        width: info.width,
        height: info.height,
    })
}

fn unpremultiply(data: &mut [u8]) {
    for chunk in data.chunks_exact_mut(4) {
        let alpha = chunk[3];
        if alpha == 0 || alpha == 255 {
            continue;
        }
        let alpha_f = alpha as f32 / 255.0;
        for channel in &mut chunk[..3] {
            let unpremultiplied = ((*channel as f32) / alpha_f).clamp(0.0, 255.0);
            *channel = unpremultiplied.round() as u8;
        }
    }
}

fn encode_png(width: u32, height: u32, data: &[u8]) -> Result<Vec<u8>> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|err| MailGlyphError::render(format!("PNG encoder error: {err}")))?;
        writer
            .write_image_data(data)
            .map_err(|err| MailGlyphError::render(format!("PNG write error: {err}")))?;
    }
    Ok(png_data)
}
