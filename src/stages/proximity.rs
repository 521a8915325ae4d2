//! Memory correlation stage.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use super::StageProcessor;
use crate::embedding::{cosine_similarity, Embedder};
use crate::memory::MemoryStore;
use crate::types::{AppError, ResearchRecord, Result};

/// Attaches the most similar past research result, when one is similar
/// enough.
///
/// The current hypothesis is compared against every stored query by
/// cosine similarity; only a strict excess over the threshold attaches
/// anything. Ties resolve to the first maximal key in the store's sorted
/// order, so the decision is deterministic for a given store state.
pub struct ProximityStage {
    store: Arc<RwLock<MemoryStore>>,
    embedder: Arc<dyn Embedder>,
    similarity_threshold: f32,
}

impl ProximityStage {
    /// Create the stage over a shared store and embedder.
    pub fn new(
        store: Arc<RwLock<MemoryStore>>,
        embedder: Arc<dyn Embedder>,
        similarity_threshold: f32,
    ) -> Self {
        Self {
            store,
            embedder,
            similarity_threshold,
        }
    }
}

#[async_trait]
impl StageProcessor for ProximityStage {
    fn name(&self) -> &'static str {
        "proximity"
    }

    async fn process(&self, mut record: ResearchRecord) -> Result<ResearchRecord> {
        let hypothesis = record.hypothesis.clone().ok_or_else(|| {
            AppError::Pipeline("proximity stage ran before a hypothesis existed".to_string())
        })?;

        // Snapshot the store before any await; the lock guard must not
        // live across suspension points.
        let (keys, summaries): (Vec<String>, Vec<String>) = {
            let store = self.store.read();
            if store.is_empty() {
                debug!("memory store is empty, nothing to correlate");
                return Ok(record);
            }
            store
                .iter()
                .map(|(key, report)| (key.clone(), report.final_summary.clone()))
                .unzip()
        };

        let mut batch = Vec::with_capacity(keys.len() + 1);
        batch.push(hypothesis);
        batch.extend(keys.iter().cloned());

        let vectors = self.embedder.embed(&batch).await?;
        if vectors.len() != batch.len() {
            return Err(AppError::Embedding(format!(
                "backend returned {} vectors for {} inputs",
                vectors.len(),
                batch.len()
            )));
        }

        let (hypothesis_vector, key_vectors) = vectors
            .split_first()
            .ok_or_else(|| AppError::Embedding("empty embedding batch".to_string()))?;

        let mut best = 0usize;
        let mut best_score = cosine_similarity(hypothesis_vector, &key_vectors[0]);
        for (i, vector) in key_vectors.iter().enumerate().skip(1) {
            let score = cosine_similarity(hypothesis_vector, vector);
            if score > best_score {
                best = i;
                best_score = score;
            }
        }

        if best_score > self.similarity_threshold {
            debug!(
                query = %keys[best],
                similarity = best_score,
                "attaching past research"
            );
            record.past_research = Some(summaries.into_iter().nth(best).unwrap_or_default());
        } else {
            debug!(
                similarity = best_score,
                threshold = self.similarity_threshold,
                "no stored research is similar enough"
            );
        }

        Ok(record)
    }
}
