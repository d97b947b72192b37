// this_file: crates/mailglyph-fontdb/src/resolver.rs

//! Resolves a font name or path to a concrete font file.
//!
//! Three tiers, tried in order:
//! 1. an input with a supported extension must name an existing file;
//! 2. otherwise `<dir>/<basename>.<ext>` is probed for every supported
//!    extension, the first extension in priority order winning;
//! 3. inputs without a path separator fall back to a case-insensitive
//!    Levenshtein match against the catalog names.

use crate::catalog::FontCatalog;
use dashmap::DashMap;
use log::{debug, trace};
use mailglyph_core::{
    has_supported_extension, MailGlyphError, ResolvedFont, Result, SUPPORTED_FONT_EXTENSIONS,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct FontResolver {
    catalog: Arc<FontCatalog>,
    closest: DashMap<String, String>,
}

impl FontResolver {
    pub fn new(catalog: Arc<FontCatalog>) -> Self {
        Self {
            catalog,
            closest: DashMap::new(),
        }
    }

    pub fn catalog(&self) -> &Arc<FontCatalog> {
        &self.catalog
    }

    /// Resolve `name_or_path` to a font name and absolute path.
    ///
    /// Must be called from within a tokio runtime; probes run as spawned tasks.
    pub async fn resolve(&self, name_or_path: &str) -> Result<ResolvedFont> {
        let input = Path::new(name_or_path);

        if has_supported_extension(input) {
            let path = std::path::absolute(input)?;
            return match tokio::fs::metadata(&path).await {
                Ok(meta) if meta.is_file() => {
                    debug!(target: "mailglyph::fonts", "resolved {name_or_path:?} directly");
                    Ok(ResolvedFont {
                        name: file_stem(&path),
                        path,
                    })
                }
                _ => Err(MailGlyphError::FontFileNotFound { path }),
            };
        }

        let absolute = std::path::absolute(input)?;
        if let Some(path) = probe_extensions(&absolute).await? {
            debug!(
                target: "mailglyph::fonts",
                "resolved {name_or_path:?} by probing to {}",
                path.display()
            );
            return Ok(ResolvedFont {
                name: file_stem(&absolute),
                path,
            });
        }

        if is_path_like(name_or_path) {
            return Err(MailGlyphError::FontPathNotFound {
                input: name_or_path.to_string(),
            });
        }

        let name = self.closest_font_name(name_or_path).await?;
        let path = self.font_path_by_name(&name).await?;
        debug!(target: "mailglyph::fonts", "resolved {name_or_path:?} by name to {name:?}");
        Ok(ResolvedFont { name, path })
    }

    /// Catalog name closest to `query`, memoized per query.
    pub async fn closest_font_name(&self, query: &str) -> Result<String> {
        if let Some(hit) = self.closest.get(query) {
            return Ok(hit.value().clone());
        }

        let names = self.catalog.font_names().await?;
        let name = closest_match(query, &names)
            .ok_or_else(|| MailGlyphError::NoCloseMatch {
                query: query.to_string(),
            })?
            .to_string();

        self.closest.insert(query.to_string(), name.clone());
        Ok(name)
    }

    /// Exact catalog lookup.
    pub async fn font_path_by_name(&self, name: &str) -> Result<PathBuf> {
        self.catalog
            .path_by_name(name)
            .await?
            .ok_or_else(|| MailGlyphError::UnknownFontName {
                name: name.to_string(),
            })
    }
}

/// Spawn one probe per extension on the input's stem, then take the first
/// hit in priority order.
async fn probe_extensions(base: &Path) -> Result<Option<PathBuf>> {
    let stem = file_stem(base);
    if stem.is_empty() {
        return Ok(None);
    }
    let dir = base.parent().map(Path::to_path_buf).unwrap_or_default();

    let probes: Vec<_> = SUPPORTED_FONT_EXTENSIONS
        .iter()
        .map(|ext| {
            let candidate = dir.join(format!("{stem}.{ext}"));
            tokio::spawn(async move {
                let hit = matches!(tokio::fs::metadata(&candidate).await, Ok(meta) if meta.is_file());
                trace!(target: "mailglyph::fonts", "probe {} hit={hit}", candidate.display());
                hit.then_some(candidate)
            })
        })
        .collect();

    let mut found = None;
    for probe in probes {
        let hit = probe
            .await
            .map_err(|err| MailGlyphError::Task(err.to_string()))?;
        if found.is_none() {
            found = hit;
        }
    }
    Ok(found)
}

fn is_path_like(input: &str) -> bool {
    input.contains('/') || input.contains(std::path::MAIN_SEPARATOR)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Best candidate by `(distance, name)`, rejected when the distance exceeds
/// half the query length.
pub fn closest_match<'a>(query: &str, names: &'a [String]) -> Option<&'a str> {
    let lowered = query.to_lowercase();
    let (distance, name) = names
        .iter()
        .map(|name| (levenshtein(&lowered, &name.to_lowercase()), name.as_str()))
        .min()?;

    let limit = query.chars().count() as f64 / 2.0;
    (distance as f64 <= limit).then_some(name)
}

/// Character-level edit distance.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailglyph_core::{FontCategory, FontScanner};
    use std::fs;

    struct NamedScanner(Vec<PathBuf>);

    impl FontScanner for NamedScanner {
        fn list_installed_fonts(&self, category: FontCategory) -> Result<Vec<PathBuf>> {
            Ok(if category == FontCategory::System {
                self.0.clone()
            } else {
                Vec::new()
            })
        }

        fn list_bundled_fonts(&self) -> Result<Vec<PathBuf>> {
            Ok(Vec::new())
        }
    }

    fn resolver(paths: &[&str]) -> FontResolver {
        let _ = env_logger::builder().is_test(true).try_init();
        let scanner = NamedScanner(paths.iter().map(PathBuf::from).collect());
        FontResolver::new(Arc::new(FontCatalog::new(Arc::new(scanner))))
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("gorgia", "georgia"), 1);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("ärial", "arial"), 1);
    }

    #[test]
    fn threshold_accepts_half_length() {
        let names = vec!["abcd".to_string()];
        // distance 2, length 4
        assert_eq!(closest_match("abxy", &names), Some("abcd"));
        // distance 3, length 4
        assert_eq!(closest_match("axyz", &names), None);
        assert_eq!(closest_match("anything", &[]), None);
    }

    #[test]
    fn ties_break_by_name() {
        let names = vec!["Bbc".to_string(), "Abc".to_string()];
        assert_eq!(closest_match("xbc", &names), Some("Abc"));
    }

    #[tokio::test]
    async fn fuzzy_match_finds_georgia() {
        let resolver = resolver(&["/fonts/Arial.ttf", "/fonts/Georgia.ttf"]);
        let resolved = resolver.resolve("Gorgia").await.unwrap();
        assert_eq!(resolved.name, "Georgia");
        assert_eq!(resolved.path, PathBuf::from("/fonts/Georgia.ttf"));
        assert_eq!(resolver.closest_font_name("gorgia").await.unwrap(), "Georgia");
    }

    #[tokio::test]
    async fn fuzzy_match_rejects_distant_names() {
        let resolver = resolver(&["/fonts/Arial.ttf", "/fonts/Georgia.ttf"]);
        let err = resolver.resolve("Foo Bar Baz Beep").await.unwrap_err();
        assert!(matches!(err, MailGlyphError::NoCloseMatch { .. }));
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn empty_catalog_rejects() {
        let err = resolver(&[]).closest_font_name("Arial").await.unwrap_err();
        assert!(matches!(err, MailGlyphError::NoCloseMatch { .. }));
    }

    #[tokio::test]
    async fn probing_prefers_extension_priority() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("name.woff"), b"woff").unwrap();
        fs::write(dir.path().join("name.otf"), b"otf").unwrap();

        let input = dir.path().join("name");
        let resolved = resolver(&[])
            .resolve(input.to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(resolved.name, "name");
        assert_eq!(resolved.path, dir.path().join("name.otf"));
    }

    #[tokio::test]
    async fn probing_skips_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("face.otf")).unwrap();
        fs::write(dir.path().join("face.TTF"), b"ttf").unwrap();

        let input = dir.path().join("face");
        let resolved = resolver(&[])
            .resolve(input.to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(resolved.path, dir.path().join("face.TTF"));
    }

    #[tokio::test]
    async fn unsupported_extension_is_replaced_when_probing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Font.otf"), b"otf").unwrap();

        let input = dir.path().join("Font.Otf");
        let resolved = resolver(&[])
            .resolve(input.to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(resolved.name, "Font");
        assert_eq!(resolved.path, dir.path().join("Font.otf"));

        let dotted = dir.path().join("Font.Regular");
        let resolved = resolver(&[])
            .resolve(dotted.to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(resolved.name, "Font");
        assert_eq!(resolved.path, dir.path().join("Font.otf"));
    }

    #[tokio::test]
    async fn direct_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("Present.ttf");
        fs::write(&present, b"ttf").unwrap();

        let resolved = resolver(&[])
            .resolve(present.to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(resolved.name, "Present");
        assert_eq!(resolved.path, present);

        let missing = dir.path().join("Missing.otf");
        let err = resolver(&[])
            .resolve(missing.to_str().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, MailGlyphError::FontFileNotFound { .. }));
    }

    #[tokio::test]
    async fn path_like_input_does_not_fall_through() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("Georgia");
        let resolver = resolver(&["/fonts/Georgia.ttf"]);
        let err = resolver.resolve(input.to_str().unwrap()).await.unwrap_err();
        assert!(matches!(err, MailGlyphError::FontPathNotFound { .. }));
    }

    #[tokio::test]
    async fn unknown_exact_name_is_not_found() {
        let err = resolver(&["/fonts/Arial.ttf"])
            .font_path_by_name("Arail")
            .await
            .unwrap_err();
        assert!(matches!(err, MailGlyphError::UnknownFontName { .. }));
    }
}
