// this_file: backends/mailglyph-core/src/cache.rs

//! Content-addressable cache of rendered output.

use crate::{MailGlyphError, OperationKind, RenderRequest, Result};
use dashmap::DashMap;
use log::debug;
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Hex SHA-256 of `"<operation>:<canonical request JSON>"`.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derive the key for rendering `request` as `operation`.
    pub fn new(operation: OperationKind, request: &RenderRequest) -> Result<Self> {
        let canonical = serde_json::to_string(request)
            .map_err(|err| MailGlyphError::render(format!("cannot encode cache key: {err}")))?;
        let mut hasher = Sha256::new();
        hasher.update(operation.to_string().as_bytes());
        hasher.update(b":");
        hasher.update(canonical.as_bytes());
        Ok(Self(format!("{:x}", hasher.finalize())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Append-only store of rendered strings shared by every render call.
///
/// Entries are inserted whole, so readers either miss or see the complete value.
/// Concurrent misses on the same key may both render and both insert; the
/// values are identical.
#[derive(Default)]
pub struct RenderCache {
    entries: DashMap<CacheKey, Arc<str>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl RenderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a rendered value.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<str>> {
        match self.entries.get(key) {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(target: "mailglyph::cache", "hit {key}");
                Some(entry.value().clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!(target: "mailglyph::cache", "miss {key}");
                None
            }
        }
    }

    /// Store a rendered value and return the shared copy.
    pub fn insert(&self, key: CacheKey, value: String) -> Arc<str> {
        let value: Arc<str> = Arc::from(value);
        debug!(target: "mailglyph::cache", "store {key} ({} bytes)", value.len());
        self.entries.insert(key, value.clone());
        value
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Anchor, OutlineConfig};
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn request() -> RenderRequest {
        RenderRequest {
            text: "Hello World".to_string(),
            font_size: 24,
            font_color: "#000".to_string(),
            background_color: "transparent".to_string(),
            supports_fallback: true,
            resize_to_font_size: false,
            trim: false,
            trim_tolerance: 10,
            attrs: BTreeMap::new(),
            outline: OutlineConfig {
                x: 0.0,
                y: 0.0,
                anchor: Anchor::parse("left top"),
                font_size: 24.0,
                kerning: true,
                attributes: BTreeMap::from([("fill".to_string(), "#000".to_string())]),
            },
            font_name: "DejaVuSans".to_string(),
            font_path: PathBuf::from("/fonts/DejaVuSans.ttf"),
        }
    }

    #[test]
    fn keys_are_stable_and_operation_specific() {
        let req = request();
        let a = CacheKey::new(OperationKind::Vector, &req).unwrap();
        let b = CacheKey::new(OperationKind::Vector, &req.clone()).unwrap();
        let c = CacheKey::new(OperationKind::raster(1.0), &req).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.as_str().len(), 64);
    }

    #[test]
    fn keys_follow_request_contents() {
        let req = request();
        let mut other = req.clone();
        other.attrs.insert("class".to_string(), "headline".to_string());
        assert_ne!(
            CacheKey::new(OperationKind::Vector, &req).unwrap(),
            CacheKey::new(OperationKind::Vector, &other).unwrap()
        );
    }

    #[test]
    fn insert_then_get_counts_hits_and_misses() {
        let cache = RenderCache::new();
        let key = CacheKey::new(OperationKind::Vector, &request()).unwrap();
        assert!(cache.get(&key).is_none());
        cache.insert(key.clone(), "<svg/>".to_string());
        assert_eq!(cache.get(&key).as_deref(), Some("<svg/>"));
        assert_eq!(
            cache.stats(),
            CacheStats {
                entries: 1,
                hits: 1,
                misses: 1
            }
        );
    }
}
