// this_file: backends/mailglyph-core/src/diagnostics.rs

//! Structured debug logging for render requests.

use crate::{OperationKind, RenderRequest};
use log::{debug, log_enabled, Level};

/// Lightweight snapshot of a normalized render request.
#[derive(Debug)]
pub struct RenderRequestDiagnostics<'a> {
    operation: OperationKind,
    chars: usize,
    font_size: u32,
    font_name: &'a str,
    font_path: std::path::Display<'a>,
    color: &'a str,
    background: &'a str,
    trim: Option<u8>,
    resize: bool,
    fallback: bool,
    attrs: usize,
}

impl<'a> RenderRequestDiagnostics<'a> {
    /// Capture the diagnostic snapshot for one stage of a render call.
    pub fn new(operation: OperationKind, request: &'a RenderRequest) -> Self {
        Self {
            operation,
            chars: request.text.chars().count(),
            font_size: request.font_size,
            font_name: request.font_name.as_str(),
            font_path: request.font_path.display(),
            color: request.font_color.as_str(),
            background: request.background_color.as_str(),
            trim: request.trim.then_some(request.trim_tolerance),
            resize: request.resize_to_font_size,
            fallback: request.supports_fallback,
            attrs: request.attrs.len(),
        }
    }

    /// Emit the snapshot at debug level when logging is enabled.
    pub fn log(&self) {
        if log_enabled!(target: "mailglyph::render", Level::Debug) {
            debug!(
                target: "mailglyph::render",
                "op={op} chars={chars} size={size} font={font} path={path} color={color} background={background} trim={trim} resize={resize} fallback={fallback} attrs={attrs}",
                op = self.operation,
                chars = self.chars,
                size = self.font_size,
                font = self.font_name,
                path = self.font_path,
                color = self.color,
                background = self.background,
                trim = self
                    .trim
                    .map(|tolerance| format!("{tolerance}%"))
                    .unwrap_or_else(|| "off".to_string()),
                resize = self.resize,
                fallback = self.fallback,
                attrs = self.attrs,
            );
        }
    }
}
