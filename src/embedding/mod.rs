//! Embedding backends and vector similarity.
//!
//! This module provides the [`Embedder`] trait that abstracts over sentence
//! embedding backends, plus the cosine similarity metric every ranking
//! decision in the pipeline is built on.
//!
//! Two backends exist:
//!
//! - [`HashEmbedder`] - deterministic token-hashing vectors, no model
//!   downloads, always available. The default.
//! - `FastEmbedder` - real ONNX sentence embeddings via fastembed, behind
//!   the `local-embeddings` feature.
//!
//! # Example
//!
//! ```rust,ignore
//! use mira::embedding::EmbeddingProvider;
//!
//! let embedder = EmbeddingProvider::default().create_embedder()?;
//! let vectors = embedder.embed(&["hello world".to_string()]).await?;
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::{AppError, Result};

pub mod cache;
pub mod hashing;

#[cfg(feature = "local-embeddings")]
pub mod fastembed;

pub use cache::{CacheConfig, CacheStats, CachingEmbedder};
pub use hashing::HashEmbedder;

#[cfg(feature = "local-embeddings")]
pub use self::fastembed::{EmbeddingModelType, FastEmbedder};

// ============================================================================
// Embedder Trait
// ============================================================================

/// Abstract sentence embedding backend.
///
/// Implementations map each input text to one fixed-dimension vector;
/// the output preserves input order and length.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embeds a batch of texts, one vector per input.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Stable identifier of the backing model. Part of the cache key, so
    /// two backends producing different vectors must report different ids.
    fn model_id(&self) -> &str;

    /// Dimensionality of the vectors this backend produces.
    fn dimension(&self) -> usize;
}

// ============================================================================
// Embedding Provider
// ============================================================================

/// Embedding backend configuration.
///
/// Deserialized from the `[embedding]` section of `mira.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum EmbeddingProvider {
    /// Deterministic token-hashing embedder (no model downloads).
    HashFallback {
        /// Vector dimension of the hashed representation.
        #[serde(default = "default_hash_dimension")]
        dimension: usize,
    },
    /// fastembed ONNX models (requires the `local-embeddings` feature).
    #[cfg(feature = "local-embeddings")]
    FastEmbed {
        /// Which fastembed model to load.
        #[serde(default)]
        model: EmbeddingModelType,
        /// Show download progress when fetching model weights.
        #[serde(default = "default_show_progress")]
        show_download_progress: bool,
    },
}

fn default_hash_dimension() -> usize {
    256
}

#[cfg(feature = "local-embeddings")]
fn default_show_progress() -> bool {
    true
}

impl Default for EmbeddingProvider {
    fn default() -> Self {
        EmbeddingProvider::HashFallback {
            dimension: default_hash_dimension(),
        }
    }
}

impl EmbeddingProvider {
    /// Create an embedder from this provider configuration.
    ///
    /// Model weights are loaded lazily on first use, so this never touches
    /// the network.
    pub fn create_embedder(&self) -> Result<Arc<dyn Embedder>> {
        match self {
            EmbeddingProvider::HashFallback { dimension } => {
                if *dimension == 0 {
                    return Err(AppError::Config(
                        "embedding.dimension must be at least 1".to_string(),
                    ));
                }
                Ok(Arc::new(HashEmbedder::new(*dimension)))
            }
            #[cfg(feature = "local-embeddings")]
            EmbeddingProvider::FastEmbed {
                model,
                show_download_progress,
            } => Ok(Arc::new(FastEmbedder::new(*model, *show_download_progress))),
        }
    }
}

// ============================================================================
// Cosine Similarity
// ============================================================================

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 means identical direction. Zero
/// vectors compare as 0.0 rather than NaN.
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "Vector dimensions must match");

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    // Manual loop unrolling for better performance
    let chunks = a.len() / 4;
    let remainder = a.len() % 4;

    for i in 0..chunks {
        let base = i * 4;
        dot += a[base] * b[base]
            + a[base + 1] * b[base + 1]
            + a[base + 2] * b[base + 2]
            + a[base + 3] * b[base + 3];
        norm_a += a[base] * a[base]
            + a[base + 1] * a[base + 1]
            + a[base + 2] * a[base + 2]
            + a[base + 3] * a[base + 3];
        norm_b += b[base] * b[base]
            + b[base + 1] * b[base + 1]
            + b[base + 2] * b[base + 2]
            + b[base + 3] * b[base + 3];
    }

    let start = chunks * 4;
    for i in 0..remainder {
        let idx = start + i;
        dot += a[idx] * b[idx];
        norm_a += a[idx] * a[idx];
        norm_b += b[idx] * b[idx];
    }

    let denom = (norm_a * norm_b).sqrt();
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}
