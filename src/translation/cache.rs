/*!
 * Per-translator model cache.
 *
 * Maps an ordered language pair to the model that was successfully loaded
 * for it. Entries are populated lazily and never evicted; the number of
 * pairs is bounded by the supported language set. The lock is never held
 * while a model loads, so two concurrent first uses of a pair may both load
 * it. The second insert simply overwrites the first.
 */

use log::{debug, warn};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::language_utils::LanguagePair;

/// Upper bound on cached pairs (5 languages, 20 ordered pairs)
pub const MAX_CACHED_PAIRS: usize = 20;

/// Cache of loaded translation models keyed by language pair
#[derive(Debug)]
pub struct ModelCache {
    /// Internal cache storage
    models: Arc<RwLock<HashMap<LanguagePair, String>>>,

    /// Cache hit counter
    hits: Arc<AtomicUsize>,

    /// Cache miss counter
    misses: Arc<AtomicUsize>,
}

impl ModelCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            models: Arc::new(RwLock::new(HashMap::new())),
            hits: Arc::new(AtomicUsize::new(0)),
            misses: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Model loaded for a pair, if any
    pub fn get(&self, pair: &LanguagePair) -> Option<String> {
        let models = self.models.read();
        match models.get(pair) {
            Some(model) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(model.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Record a loaded model for a pair
    pub fn insert(&self, pair: LanguagePair, model: String) {
        let mut models = self.models.write();
        if models.len() >= MAX_CACHED_PAIRS && !models.contains_key(&pair) {
            warn!("Model cache is full, not caching {}", pair);
            return;
        }
        debug!("Cached model {} for {}", model, pair);
        models.insert(pair, model);
    }

    /// Return the cached model for a pair or run `load` to obtain one
    ///
    /// `load` returns `None` on failure; failures are not cached, so the next
    /// call tries again.
    pub async fn get_or_load<F, Fut>(&self, pair: LanguagePair, load: F) -> Option<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<String>>,
    {
        if let Some(model) = self.get(&pair) {
            return Some(model);
        }

        let model = load().await?;
        self.insert(pair, model.clone());
        Some(model)
    }

    /// Get cache statistics (hits, misses, hit rate)
    pub fn stats(&self) -> (usize, usize, f64) {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;

        let hit_rate = if total > 0 { hits as f64 / total as f64 } else { 0.0 };

        (hits, misses, hit_rate)
    }

    /// Clear the cache
    pub fn clear(&self) {
        self.models.write().clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        debug!("Model cache cleared");
    }

    /// Get the number of entries in the cache
    pub fn len(&self) -> usize {
        self.models.read().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.models.read().is_empty()
    }
}

impl Default for ModelCache {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for ModelCache {
    fn clone(&self) -> Self {
        Self {
            models: self.models.clone(),
            hits: self.hits.clone(),
            misses: self.misses.clone(),
        }
    }
}
