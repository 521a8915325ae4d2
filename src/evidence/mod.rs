//! Evidence retrieval.
//!
//! One operation: given a text, return the single most semantically
//! relevant web snippet for it. Candidates come from the search provider,
//! relevance is cosine similarity between embeddings, and absence of
//! evidence is a normal outcome reported through [`NO_EVIDENCE`] rather
//! than an error.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::EvidenceConfig;
use crate::embedding::{cosine_similarity, Embedder};
use crate::search::SearchProvider;
use crate::types::{AppError, Result};

/// Sentinel returned when no usable evidence exists for a query.
///
/// Flows through the pipeline as ordinary text; its four words score 0
/// under the confidence heuristic, which routes the run into refinement.
pub const NO_EVIDENCE: &str = "No relevant result found.";

/// Selects the best snippet among fetched candidates.
pub struct EvidenceRetriever {
    search: Arc<dyn SearchProvider>,
    embedder: Arc<dyn Embedder>,
    config: EvidenceConfig,
}

impl EvidenceRetriever {
    /// Creates a retriever over the given collaborators.
    pub fn new(
        search: Arc<dyn SearchProvider>,
        embedder: Arc<dyn Embedder>,
        config: EvidenceConfig,
    ) -> Self {
        Self {
            search,
            embedder,
            config,
        }
    }

    /// Returns the candidate snippet most similar to `text`, or
    /// [`NO_EVIDENCE`] when nothing usable was found.
    ///
    /// Search failures degrade to [`NO_EVIDENCE`] with a warning; the run
    /// can still make progress without fresh evidence. Embedding failures
    /// propagate, since the failed batch contains `text` itself.
    ///
    /// Ties in similarity resolve to the earliest candidate in backend
    /// rank order, so identical inputs always select the same snippet.
    pub async fn best_evidence(&self, text: &str) -> Result<String> {
        let hits = match self.search.search(text, self.config.max_results).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!(error = %e, "web search failed, treating as no evidence");
                return Ok(NO_EVIDENCE.to_string());
            }
        };

        let candidates: Vec<String> = hits
            .into_iter()
            .map(|hit| hit.snippet)
            .filter(|snippet| snippet.chars().count() >= self.config.min_snippet_chars)
            .collect();

        if candidates.is_empty() {
            debug!("no candidate snippets survived filtering");
            return Ok(NO_EVIDENCE.to_string());
        }

        // One batch for the query and every candidate.
        let mut batch = Vec::with_capacity(candidates.len() + 1);
        batch.push(text.to_string());
        batch.extend(candidates.iter().cloned());

        let vectors = self.embedder.embed(&batch).await?;
        if vectors.len() != batch.len() {
            return Err(AppError::Embedding(format!(
                "backend returned {} vectors for {} inputs",
                vectors.len(),
                batch.len()
            )));
        }

        let (query_vector, candidate_vectors) = vectors
            .split_first()
            .ok_or_else(|| AppError::Embedding("empty embedding batch".to_string()))?;

        let mut best = 0usize;
        let mut best_score = cosine_similarity(query_vector, &candidate_vectors[0]);
        for (i, vector) in candidate_vectors.iter().enumerate().skip(1) {
            let score = cosine_similarity(query_vector, vector);
            if score > best_score {
                best = i;
                best_score = score;
            }
        }

        debug!(
            candidates = candidates.len(),
            selected = best,
            similarity = best_score,
            "selected best evidence"
        );

        let mut candidates = candidates;
        Ok(candidates.swap_remove(best))
    }
}

// ============================================================================
// Tests
// ============================================================================
