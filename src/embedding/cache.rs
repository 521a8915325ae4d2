//! Embedding cache.
//!
//! The pipeline embeds the same hypothesis text in three different stages
//! per iteration (ranking, refinement, memory correlation), so caching
//! vectors avoids repeated model calls without changing any result.
//!
//! Cache keys are SHA-256 hashes of `text + model id`: different texts get
//! different keys, and two backends producing different vectors never share
//! an entry. The cache is bounded by entry count; when full, the least
//! recently used entry is dropped.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::Embedder;
use crate::types::{AppError, Result};

// ============================================================================
// Cache Types
// ============================================================================

/// Statistics for cache performance monitoring
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of entries in cache
    pub entry_count: usize,
    /// Number of evictions due to capacity
    pub evictions: u64,
}

impl CacheStats {
    /// Calculate hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// Configuration for the embedding cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Whether the cache is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Maximum number of cached vectors
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

fn default_enabled() -> bool {
    true
}

fn default_max_entries() -> usize {
    4096
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_entries: default_max_entries(),
        }
    }
}

// ============================================================================
// Embedding Cache
// ============================================================================

#[derive(Debug, Clone)]
struct CacheEntry {
    embedding: Vec<f32>,
    last_accessed: Instant,
}

/// In-memory LRU cache for embedding vectors.
///
/// Thread-safe via `parking_lot::RwLock`; hit/miss/eviction counters are
/// relaxed atomics.
pub struct EmbeddingCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    config: CacheConfig,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl EmbeddingCache {
    /// Create a cache with the given configuration
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            config,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Create a cache with default configuration
    pub fn with_defaults() -> Self {
        Self::new(CacheConfig::default())
    }

    /// Compute the cache key for the given text under the given model
    pub fn compute_key(text: &str, model: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        hasher.update(b"|");
        hasher.update(model.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Get a vector from the cache, refreshing its recency
    pub fn get(&self, key: &str) -> Option<Vec<f32>> {
        if !self.config.enabled {
            return None;
        }

        let mut entries = self.entries.write();
        match entries.get_mut(key) {
            Some(entry) => {
                entry.last_accessed = Instant::now();
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.embedding.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store a vector, evicting the least recently used entries when full
    pub fn set(&self, key: &str, embedding: Vec<f32>) {
        if !self.config.enabled || self.config.max_entries == 0 {
            return;
        }

        let mut entries = self.entries.write();

        while !entries.contains_key(key) && entries.len() >= self.config.max_entries {
            let lru_key = entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_accessed)
                .map(|(key, _)| key.clone());
            match lru_key {
                Some(lru) => {
                    entries.remove(&lru);
                    self.evictions.fetch_add(1, Ordering::Relaxed);
                }
                None => break,
            }
        }

        entries.insert(
            key.to_string(),
            CacheEntry {
                embedding,
                last_accessed: Instant::now(),
            },
        );
    }

    /// Remove all entries
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Number of cached vectors
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the cache holds no vectors
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Snapshot of cache counters
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entry_count: self.len(),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

// ============================================================================
// Caching Embedder
// ============================================================================

/// Decorates any [`Embedder`] with the embedding cache.
///
/// Cache hits skip the backend entirely; misses are batched into a single
/// backend call, with duplicate texts within a batch embedded once.
pub struct CachingEmbedder {
    inner: Arc<dyn Embedder>,
    cache: EmbeddingCache,
}

impl CachingEmbedder {
    /// Wrap `inner` with a cache built from `config`
    pub fn new(inner: Arc<dyn Embedder>, config: CacheConfig) -> Self {
        Self {
            inner,
            cache: EmbeddingCache::new(config),
        }
    }

    /// Snapshot of cache counters
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

#[async_trait]
impl Embedder for CachingEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut results: Vec<Option<Vec<f32>>> = vec![None; texts.len()];

        // Indices of texts that missed, grouped by key so a text repeated
        // within the batch hits the backend once.
        let mut miss_indices: HashMap<String, Vec<usize>> = HashMap::new();
        let mut miss_keys: Vec<String> = Vec::new();
        let mut miss_texts: Vec<String> = Vec::new();

        for (i, text) in texts.iter().enumerate() {
            let key = EmbeddingCache::compute_key(text, self.inner.model_id());
            if let Some(hit) = self.cache.get(&key) {
                results[i] = Some(hit);
                continue;
            }
            let indices = miss_indices.entry(key.clone()).or_default();
            if indices.is_empty() {
                miss_keys.push(key);
                miss_texts.push(text.clone());
            }
            indices.push(i);
        }

        if !miss_texts.is_empty() {
            let embedded = self.inner.embed(&miss_texts).await?;
            if embedded.len() != miss_texts.len() {
                return Err(AppError::Embedding(format!(
                    "backend returned {} vectors for {} inputs",
                    embedded.len(),
                    miss_texts.len()
                )));
            }
            for (key, vector) in miss_keys.iter().zip(embedded) {
                self.cache.set(key, vector.clone());
                for &i in &miss_indices[key] {
                    results[i] = Some(vector.clone());
                }
            }
        }

        results
            .into_iter()
            .map(|r| {
                r.ok_or_else(|| AppError::Embedding("cache fill left a gap in batch".to_string()))
            })
            .collect()
    }

    fn model_id(&self) -> &str {
        self.inner.model_id()
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashEmbedder;
    use std::sync::atomic::AtomicUsize;

    struct CountingEmbedder {
        inner: HashEmbedder,
        calls: AtomicUsize,
        texts_embedded: AtomicUsize,
    }

    impl CountingEmbedder {
        fn new() -> Self {
            Self {
                inner: HashEmbedder::new(32),
                calls: AtomicUsize::new(0),
                texts_embedded: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Embedder for CountingEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            self.texts_embedded.fetch_add(texts.len(), Ordering::Relaxed);
            self.inner.embed(texts).await
        }

        fn model_id(&self) -> &str {
            self.inner.model_id()
        }

        fn dimension(&self) -> usize {
            self.inner.dimension()
        }
    }

    #[test]
    fn key_depends_on_text_and_model() {
        let k1 = EmbeddingCache::compute_key("hello", "model-a");
        let k2 = EmbeddingCache::compute_key("hello", "model-a");
        let k3 = EmbeddingCache::compute_key("hello", "model-b");
        let k4 = EmbeddingCache::compute_key("world", "model-a");
        assert_eq!(k1, k2);
        assert_ne!(k1, k3);
        assert_ne!(k1, k4);
    }

    #[test]
    fn set_then_get_returns_vector() {
        let cache = EmbeddingCache::with_defaults();
        assert!(cache.get("k").is_none());
        cache.set("k", vec![1.0, 2.0]);
        assert_eq!(cache.get("k").unwrap(), vec![1.0, 2.0]);
        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn lru_entry_is_evicted_when_full() {
        let cache = EmbeddingCache::new(CacheConfig {
            enabled: true,
            max_entries: 2,
        });
        cache.set("a", vec![1.0]);
        cache.set("b", vec![2.0]);
        // Touch "a" so "b" becomes the oldest.
        assert!(cache.get("a").is_some());
        cache.set("c", vec![3.0]);

        assert!(cache.get("b").is_none());
        assert!(cache.get("a").is_some());
        assert!(cache.get("c").is_some());
        assert_eq!(cache.stats().evictions, 1);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn overwriting_existing_key_does_not_evict() {
        let cache = EmbeddingCache::new(CacheConfig {
            enabled: true,
            max_entries: 2,
        });
        cache.set("a", vec![1.0]);
        cache.set("b", vec![2.0]);
        cache.set("a", vec![9.0]);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.stats().evictions, 0);
        assert_eq!(cache.get("a").unwrap(), vec![9.0]);
    }

    #[test]
    fn disabled_cache_stores_nothing() {
        let cache = EmbeddingCache::new(CacheConfig {
            enabled: false,
            max_entries: 16,
        });
        cache.set("k", vec![1.0]);
        assert!(cache.get("k").is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn repeated_embeds_hit_the_cache() {
        let counting = Arc::new(CountingEmbedder::new());
        let embedder = CachingEmbedder::new(counting.clone(), CacheConfig::default());

        let texts = vec!["the same text".to_string()];
        let first = embedder.embed(&texts).await.unwrap();
        let second = embedder.embed(&texts).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(counting.calls.load(Ordering::Relaxed), 1);
        assert_eq!(embedder.cache_stats().hits, 1);
    }

    #[tokio::test]
    async fn duplicates_in_one_batch_are_embedded_once() {
        let counting = Arc::new(CountingEmbedder::new());
        let embedder = CachingEmbedder::new(counting.clone(), CacheConfig::default());

        let texts = vec![
            "alpha".to_string(),
            "beta".to_string(),
            "alpha".to_string(),
        ];
        let vectors = embedder.embed(&texts).await.unwrap();

        assert_eq!(vectors.len(), 3);
        assert_eq!(vectors[0], vectors[2]);
        assert_eq!(counting.texts_embedded.load(Ordering::Relaxed), 2);
    }

    #[tokio::test]
    async fn mixed_hit_miss_batch_preserves_order() {
        let counting = Arc::new(CountingEmbedder::new());
        let embedder = CachingEmbedder::new(counting.clone(), CacheConfig::default());

        embedder.embed(&["cached".to_string()]).await.unwrap();

        let texts = vec!["fresh".to_string(), "cached".to_string()];
        let vectors = embedder.embed(&texts).await.unwrap();
        let direct = HashEmbedder::new(32)
            .embed(&texts)
            .await
            .unwrap();

        assert_eq!(vectors, direct);
        // Second call embedded only the miss.
        assert_eq!(counting.texts_embedded.load(Ordering::Relaxed), 2);
    }
}
