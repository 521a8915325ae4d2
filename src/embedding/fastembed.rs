//! fastembed ONNX embedding backend.
//!
//! Available behind the `local-embeddings` feature. Model weights are
//! downloaded on first use and loaded lazily, so constructing the backend
//! is free and configuration-only paths never touch the network.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use super::Embedder;
use crate::types::{AppError, Result};

// ============================================================================
// Embedding Model Types
// ============================================================================

/// Supported fastembed sentence embedding models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum EmbeddingModelType {
    /// BGE Small EN v1.5 - 384 dimensions, good balance of speed and quality
    #[default]
    BgeSmallEnV15,
    /// BGE Base EN v1.5 - 768 dimensions, higher quality, slower
    BgeBaseEnV15,
    /// All-MiniLM L6 v2 - 384 dimensions, fastest
    AllMiniLmL6V2,
}

impl EmbeddingModelType {
    /// Convert to fastembed's EmbeddingModel enum
    pub fn to_fastembed_model(&self) -> EmbeddingModel {
        match self {
            Self::BgeSmallEnV15 => EmbeddingModel::BGESmallENV15,
            Self::BgeBaseEnV15 => EmbeddingModel::BGEBaseENV15,
            Self::AllMiniLmL6V2 => EmbeddingModel::AllMiniLML6V2,
        }
    }

    /// Output dimensionality of this model
    pub fn dimension(&self) -> usize {
        match self {
            Self::BgeSmallEnV15 => 384,
            Self::BgeBaseEnV15 => 768,
            Self::AllMiniLmL6V2 => 384,
        }
    }
}

impl FromStr for EmbeddingModelType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "bge-small-en-v1.5" | "bge-small" => Ok(Self::BgeSmallEnV15),
            "bge-base-en-v1.5" | "bge-base" => Ok(Self::BgeBaseEnV15),
            "all-minilm-l6-v2" | "minilm" => Ok(Self::AllMiniLmL6V2),
            _ => Err(AppError::Config(format!(
                "Unknown embedding model: {}. Use one of: bge-small-en-v1.5, \
                 bge-base-en-v1.5, all-minilm-l6-v2",
                s
            ))),
        }
    }
}

impl std::fmt::Display for EmbeddingModelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::BgeSmallEnV15 => "bge-small-en-v1.5",
            Self::BgeBaseEnV15 => "bge-base-en-v1.5",
            Self::AllMiniLmL6V2 => "all-minilm-l6-v2",
        };
        write!(f, "{}", name)
    }
}

// ============================================================================
// FastEmbed Backend
// ============================================================================

/// Embedding backend backed by a fastembed ONNX model.
///
/// The model is initialized on first embed call; initialization and
/// inference both run on the blocking thread pool.
pub struct FastEmbedder {
    model_type: EmbeddingModelType,
    show_download_progress: bool,
    id: String,
    model: OnceCell<Arc<tokio::sync::Mutex<TextEmbedding>>>,
}

impl FastEmbedder {
    /// Create a lazy backend for the given model
    pub fn new(model_type: EmbeddingModelType, show_download_progress: bool) -> Self {
        Self {
            id: model_type.to_string(),
            model_type,
            show_download_progress,
            model: OnceCell::new(),
        }
    }

    /// Get or initialize the embedding model
    async fn get_model(&self) -> Result<Arc<tokio::sync::Mutex<TextEmbedding>>> {
        self.model
            .get_or_try_init(|| async {
                let model_type = self.model_type;
                let show_progress = self.show_download_progress;
                tokio::task::spawn_blocking(move || {
                    let init_options = InitOptions::new(model_type.to_fastembed_model())
                        .with_show_download_progress(show_progress);
                    let model = TextEmbedding::try_new(init_options).map_err(|e| {
                        AppError::Embedding(format!("Failed to load {}: {}", model_type, e))
                    })?;
                    Ok(Arc::new(tokio::sync::Mutex::new(model)))
                })
                .await
                .map_err(|e| AppError::Embedding(format!("Model init task failed: {}", e)))?
            })
            .await
            .map(Arc::clone)
    }
}

#[async_trait]
impl Embedder for FastEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = self.get_model().await?;
        let batch: Vec<String> = texts.to_vec();

        tokio::task::spawn_blocking(move || {
            let mut model = model.blocking_lock();
            model
                .embed(batch, None)
                .map_err(|e| AppError::Embedding(format!("Embedding failed: {}", e)))
        })
        .await
        .map_err(|e| AppError::Embedding(format!("Embedding task failed: {}", e)))?
    }

    fn model_id(&self) -> &str {
        &self.id
    }

    fn dimension(&self) -> usize {
        self.model_type.dimension()
    }
}
