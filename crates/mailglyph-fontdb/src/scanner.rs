// this_file: crates/mailglyph-fontdb/src/scanner.rs

//! Filesystem font scanner for installed and bundled fonts.

use log::{trace, warn};
use mailglyph_core::{has_supported_extension, utils, FontCategory, FontScanner, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Environment variable overriding the bundled font directory.
pub const FONT_DIR_ENV: &str = "MAILGLYPH_FONT_DIR";

/// Walks platform font directories plus an optional bundled directory.
#[derive(Debug, Clone, Default)]
pub struct DirectoryFontScanner {
    bundled_dir: Option<PathBuf>,
    overrides: HashMap<FontCategory, Vec<PathBuf>>,
}

impl DirectoryFontScanner {
    /// Scanner using the platform directories and the given bundled directory.
    pub fn new(bundled_dir: Option<PathBuf>) -> Self {
        Self {
            bundled_dir,
            overrides: HashMap::new(),
        }
    }

    /// Bundled directory from [`FONT_DIR_ENV`], falling back to `default`.
    pub fn from_env(default: Option<PathBuf>) -> Self {
        let bundled = std::env::var_os(FONT_DIR_ENV)
            .map(PathBuf::from)
            .or(default);
        Self::new(bundled)
    }

    /// Replace the directories scanned for one category.
    pub fn with_category_dirs(mut self, category: FontCategory, dirs: Vec<PathBuf>) -> Self {
        self.overrides.insert(category, dirs);
        self
    }

    pub fn bundled_dir(&self) -> Option<&Path> {
        self.bundled_dir.as_deref()
    }

    fn category_dirs(&self, category: FontCategory) -> Vec<PathBuf> {
        if let Some(dirs) = self.overrides.get(&category) {
            return dirs.clone();
        }
        utils::font_dirs(category)
            .into_iter()
            .map(|dir| PathBuf::from(shellexpand::tilde(&dir).as_ref()))
            .collect()
    }
}

impl FontScanner for DirectoryFontScanner {
    fn list_installed_fonts(&self, category: FontCategory) -> Result<Vec<PathBuf>> {
        let mut fonts = Vec::new();
        for dir in self.category_dirs(category) {
            fonts.extend(fonts_in_directory(&dir));
        }
        trace!(
            target: "mailglyph::fonts",
            "{} category: {} font files",
            category.as_str(),
            fonts.len()
        );
        Ok(fonts)
    }

    fn list_bundled_fonts(&self) -> Result<Vec<PathBuf>> {
        Ok(self
            .bundled_dir
            .as_deref()
            .map(fonts_in_directory)
            .unwrap_or_default())
    }
}

/// Recursively collect files with a supported font extension under `dir`.
///
/// Missing directories yield nothing; unreadable entries are skipped.
pub fn fonts_in_directory(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        trace!(target: "mailglyph::fonts", "skipping missing font dir {}", dir.display());
        return Vec::new();
    }

    WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(target: "mailglyph::fonts", "skipping unreadable font entry: {err}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| has_supported_extension(path))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn collects_supported_files_recursively() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("A.ttf"), b"").unwrap();
        fs::write(dir.path().join("nested/B.OTF"), b"").unwrap();
        fs::write(dir.path().join("readme.txt"), b"").unwrap();
        fs::write(dir.path().join("C.woff2"), b"").unwrap();

        let mut found = fonts_in_directory(dir.path());
        found.sort();
        assert_eq!(
            found,
            vec![dir.path().join("A.ttf"), dir.path().join("nested/B.OTF")]
        );
    }

    #[test]
    fn missing_directory_is_empty() {
        assert!(fonts_in_directory(Path::new("/definitely/not/a/font/dir")).is_empty());
    }

    #[test]
    fn overrides_replace_platform_dirs() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Custom.otf"), b"").unwrap();
        let scanner = DirectoryFontScanner::new(None)
            .with_category_dirs(FontCategory::Network, vec![dir.path().to_path_buf()]);
        let fonts = scanner.list_installed_fonts(FontCategory::Network).unwrap();
        assert_eq!(fonts, vec![dir.path().join("Custom.otf")]);
    }

    #[test]
    fn bundled_dir_is_scanned() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Bundled.ttf"), b"").unwrap();
        let scanner = DirectoryFontScanner::new(Some(dir.path().to_path_buf()));
        assert_eq!(
            scanner.list_bundled_fonts().unwrap(),
            vec![dir.path().join("Bundled.ttf")]
        );
        assert!(DirectoryFontScanner::new(None)
            .list_bundled_fonts()
            .unwrap()
            .is_empty());
    }
}
