// this_file: backends/mailglyph-core/src/error.rs

//! Error taxonomy shared by every mailglyph crate.

use std::path::PathBuf;
use thiserror::Error;

/// Coarse error classes callers can branch on without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A configuration field was malformed or out of range.
    Validation,
    /// A font could not be located.
    NotFound,
    /// An argument had the wrong type (e.g. a non-numeric scale).
    Type,
    /// A font file was found but could not be loaded.
    Font,
    /// Markup or raster work failed.
    Render,
    /// Filesystem or task failure.
    Io,
}

/// Main error type for mailglyph operations.
#[derive(Error, Debug)]
pub enum MailGlyphError {
    /// A configuration field failed validation
    #[error("`{field}` {constraint}")]
    Validation {
        field: &'static str,
        constraint: String,
    },

    /// An explicit font file does not exist or is not a regular file
    #[error("Font file not found: {}", path.display())]
    FontFileNotFound { path: PathBuf },

    /// A path-like input had no sibling file with a supported extension
    #[error("`fontNameOrPath` \"{input}\" file was not found")]
    FontPathNotFound { input: String },

    /// Fuzzy matching found nothing close enough
    #[error("\"{query}\" was not found, did you forget to install it?")]
    NoCloseMatch { query: String },

    /// Exact catalog lookup failed
    #[error("No font named \"{name}\" in the font catalog")]
    UnknownFontName { name: String },

    /// Raster scale was not a usable number
    #[error("`scale` must be a Number (got {value})")]
    InvalidScale { value: String },

    /// Font file could not be read
    #[error("Failed to load font from {}: {source}", path.display())]
    FontLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Font file could not be parsed
    #[error("Invalid font data in {}", path.display())]
    InvalidFontData { path: PathBuf },

    /// Markup could not be parsed or was missing required structure
    #[error("Markup error: {0}")]
    Markup(String),

    /// Rasterization or encoding failed
    #[error("Render error: {0}")]
    Render(String),

    /// A blocking task panicked or was cancelled
    #[error("Background task failed: {0}")]
    Task(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MailGlyphError {
    pub fn validation(field: &'static str, constraint: impl Into<String>) -> Self {
        Self::Validation {
            field,
            constraint: constraint.into(),
        }
    }

    pub fn font_load(path: PathBuf, source: std::io::Error) -> Self {
        Self::FontLoad { path, source }
    }

    pub fn markup(message: impl Into<String>) -> Self {
        Self::Markup(message.into())
    }

    pub fn render(message: impl Into<String>) -> Self {
        Self::Render(message.into())
    }

    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::FontFileNotFound { .. }
            | Self::FontPathNotFound { .. }
            | Self::NoCloseMatch { .. }
            | Self::UnknownFontName { .. } => ErrorKind::NotFound,
            Self::InvalidScale { .. } => ErrorKind::Type,
            Self::FontLoad { .. } | Self::InvalidFontData { .. } => ErrorKind::Font,
            Self::Markup(_) | Self::Render(_) => ErrorKind::Render,
            Self::Task(_) | Self::Io(_) => ErrorKind::Io,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}
