// this_file: crates/mailglyph-fontdb/src/catalog.rs

//! Lazily scanned, process-lifetime index of installed and bundled fonts.

use log::debug;
use mailglyph_core::{
    has_supported_extension, FontCategory, FontEntry, FontScanner, MailGlyphError, Result,
};
use once_cell::sync::OnceCell;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Immutable result of one catalog scan.
#[derive(Debug, Default)]
pub struct CatalogIndex {
    entries: Vec<FontEntry>,
    by_name: HashMap<String, PathBuf>,
}

impl CatalogIndex {
    /// Build from raw scan output: filter, sort by path string, derive names.
    ///
    /// Duplicate paths are kept, so names and paths stay paired by position.
    ///
    /// When two entries share a name the later one in path order wins.
    pub fn from_paths(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut paths: Vec<PathBuf> = paths
            .into_iter()
            .filter(|path| has_supported_extension(path))
            .collect();
        paths.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));

        let entries: Vec<FontEntry> = paths.into_iter().map(FontEntry::from_path).collect();
        let mut by_name = HashMap::with_capacity(entries.len());
        for entry in &entries {
            by_name.insert(entry.name.clone(), entry.path.clone());
        }
        Self { entries, by_name }
    }

    pub fn entries(&self) -> &[FontEntry] {
        &self.entries
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.entries.iter().map(|entry| entry.path.clone()).collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.name.clone()).collect()
    }

    pub fn path_by_name(&self, name: &str) -> Option<&Path> {
        self.by_name.get(name).map(PathBuf::as_path)
    }

    /// Name to path mapping, ordered by name.
    pub fn paths_by_name(&self) -> BTreeMap<String, PathBuf> {
        self.by_name
            .iter()
            .map(|(name, path)| (name.clone(), path.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Font catalog backed by a [`FontScanner`], scanned on first use.
pub struct FontCatalog {
    scanner: Arc<dyn FontScanner>,
    index: OnceCell<Arc<CatalogIndex>>,
}

impl FontCatalog {
    pub fn new(scanner: Arc<dyn FontScanner>) -> Self {
        Self {
            scanner,
            index: OnceCell::new(),
        }
    }

    /// Memoized index, scanning on a blocking thread the first time.
    ///
    /// Concurrent first callers may each scan; the first stored result is kept.
    /// A failed scan is not memoized.
    pub async fn index(&self) -> Result<Arc<CatalogIndex>> {
        if let Some(index) = self.index.get() {
            return Ok(Arc::clone(index));
        }

        let scanner = Arc::clone(&self.scanner);
        let scanned = tokio::task::spawn_blocking(move || scan(scanner.as_ref()))
            .await
            .map_err(|err| MailGlyphError::Task(err.to_string()))??;

        let index = self.index.get_or_init(|| Arc::new(scanned));
        Ok(Arc::clone(index))
    }

    pub async fn font_paths(&self) -> Result<Vec<PathBuf>> {
        Ok(self.index().await?.paths())
    }

    pub async fn font_names(&self) -> Result<Vec<String>> {
        Ok(self.index().await?.names())
    }

    pub async fn path_by_name(&self, name: &str) -> Result<Option<PathBuf>> {
        Ok(self.index().await?.path_by_name(name).map(Path::to_path_buf))
    }

    pub async fn paths_by_name(&self) -> Result<BTreeMap<String, PathBuf>> {
        Ok(self.index().await?.paths_by_name())
    }

    /// Whether a scan has been memoized.
    pub fn is_loaded(&self) -> bool {
        self.index.get().is_some()
    }
}

fn scan(scanner: &dyn FontScanner) -> Result<CatalogIndex> {
    let installed: Vec<Vec<PathBuf>> = FontCategory::ALL
        .par_iter()
        .map(|category| scanner.list_installed_fonts(*category))
        .collect::<Result<_>>()?;
    let bundled = scanner.list_bundled_fonts()?;

    let index = CatalogIndex::from_paths(installed.into_iter().flatten().chain(bundled));
    debug!(target: "mailglyph::fonts", "font catalog scanned: {} fonts", index.len());
    Ok(index)
}
