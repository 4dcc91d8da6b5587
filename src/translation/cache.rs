/*!
 * Translation cache tiers.
 *
 * Two tiers share the same key space: a process-lifetime session cache and a
 * durable translation memory backed by a JSON file. The orchestrator probes
 * the session tier first and writes fresh translations through to both.
 */

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, warn};
use parking_lot::{Mutex, RwLock};

/// Build the composite cache key identifying one unit of translatable work
pub fn make_cache_key(source_language: &str, target_language: &str, text: &str) -> String {
    format!("{}::{}::{}", source_language, target_language, text)
}

/// Process-lifetime cache tier, cleared when the process exits
pub struct SessionCache {
    /// Internal cache storage
    cache: Arc<RwLock<HashMap<String, String>>>,

    /// Cache hit counter
    hits: Arc<RwLock<usize>>,

    /// Cache miss counter
    misses: Arc<RwLock<usize>>,
}

impl SessionCache {
    /// Create a new empty session cache
    pub fn new() -> Self {
        Self {
            cache: Arc::new(RwLock::new(HashMap::new())),
            hits: Arc::new(RwLock::new(0)),
            misses: Arc::new(RwLock::new(0)),
        }
    }

    /// Get a translation from the cache
    pub fn get(&self, key: &str) -> Option<String> {
        let cache = self.cache.read();

        match cache.get(key) {
            Some(translation) => {
                let mut hits = self.hits.write();
                *hits += 1;

                debug!("Session cache hit for '{}'", truncate_text(key, 40));
                Some(translation.clone())
            }
            None => {
                let mut misses = self.misses.write();
                *misses += 1;

                debug!("Session cache miss for '{}'", truncate_text(key, 40));
                None
            }
        }
    }

    /// Store a translation in the cache
    pub fn set(&self, key: &str, translation: &str) {
        let mut cache = self.cache.write();
        cache.insert(key.to_string(), translation.to_string());
    }

    /// Get cache statistics as (hits, misses, hit rate)
    pub fn stats(&self) -> (usize, usize, f64) {
        let hits = *self.hits.read();
        let misses = *self.misses.read();
        let total = hits + misses;

        let hit_rate = if total > 0 {
            hits as f64 / total as f64
        } else {
            0.0
        };

        (hits, misses, hit_rate)
    }

    /// Get the number of entries in the cache
    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }

    /// Clear the cache and its counters
    pub fn clear(&self) {
        self.cache.write().clear();
        *self.hits.write() = 0;
        *self.misses.write() = 0;
    }
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for SessionCache {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            hits: self.hits.clone(),
            misses: self.misses.clone(),
        }
    }
}

/// Mutable state of the durable memory, guarded by one lock so a flush
/// never observes a half-applied mutation
struct MemoryInner {
    data: HashMap<String, String>,
    dirty: bool,
}

/// Durable cache tier backed by a flat JSON key/value file.
///
/// The file is loaded eagerly at construction; an absent or corrupt file is
/// treated as an empty store, never a startup failure. Writes are lazy: `set`
/// only mutates memory and marks the store dirty, `flush` performs the actual
/// file write when dirty.
pub struct TranslationMemory {
    /// Location of the backing file
    path: PathBuf,

    /// Whether every `set` triggers a flush
    auto_flush: bool,

    inner: Mutex<MemoryInner>,
}

impl TranslationMemory {
    /// Open a translation memory with auto-flush enabled
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_auto_flush(path, true)
    }

    /// Open a translation memory with an explicit auto-flush setting
    pub fn with_auto_flush(path: impl Into<PathBuf>, auto_flush: bool) -> Self {
        let path = path.into();
        let data = Self::load(&path);

        Self {
            path,
            auto_flush,
            inner: Mutex::new(MemoryInner { data, dirty: false }),
        }
    }

    /// Load the backing file, treating any failure as an empty store
    fn load(path: &PathBuf) -> HashMap<String, String> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => {
                debug!("Translation memory file {} not found, starting empty", path.display());
                return HashMap::new();
            }
        };

        match serde_json::from_str::<HashMap<String, String>>(&content) {
            Ok(data) => {
                debug!("Loaded {} translation memory entries from {}", data.len(), path.display());
                data
            }
            Err(e) => {
                warn!("Translation memory file {} is corrupt ({}), starting empty", path.display(), e);
                HashMap::new()
            }
        }
    }

    /// Get a translation from the durable store
    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.lock().data.get(key).cloned()
    }

    /// Store a translation, marking the store dirty.
    ///
    /// With auto-flush enabled a failed file write is logged and swallowed;
    /// the entry stays in memory and dirty, so a later flush retries it.
    pub fn set(&self, key: &str, translation: &str) {
        {
            let mut inner = self.inner.lock();
            inner.data.insert(key.to_string(), translation.to_string());
            inner.dirty = true;
        }
        if self.auto_flush {
            if let Err(e) = self.flush() {
                warn!("Failed to flush translation memory: {}", e);
            }
        }
    }

    /// Write the store to disk if dirty, then clear the dirty flag
    pub fn flush(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        if !inner.dirty {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create memory directory: {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(&inner.data)
            .context("Failed to serialize translation memory")?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write translation memory: {}", self.path.display()))?;

        inner.dirty = false;
        Ok(())
    }

    /// Get the number of entries in the store
    pub fn len(&self) -> usize {
        self.inner.lock().data.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.inner.lock().data.is_empty()
    }

    /// Whether unwritten mutations are pending
    pub fn is_dirty(&self) -> bool {
        self.inner.lock().dirty
    }

    /// Path of the backing file
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

/// Truncate text to a maximum length with ellipsis
fn truncate_text(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        text.to_string()
    } else {
        format!("{}...", text.chars().take(max_length).collect::<String>())
    }
}
