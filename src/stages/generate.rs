//! Hypothesis generation stage.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::StageProcessor;
use crate::evidence::EvidenceRetriever;
use crate::types::{ResearchRecord, Result};

/// Drafts the initial hypothesis from the best evidence for the raw query.
///
/// Owns `hypothesis` and `raw_data` and overwrites both, so stale values
/// from a previous iteration never leak forward. Evidence absence is not
/// special here; the sentinel text simply becomes part of the hypothesis.
pub struct GenerateStage {
    retriever: Arc<EvidenceRetriever>,
}

impl GenerateStage {
    /// Create the stage over a shared retriever.
    pub fn new(retriever: Arc<EvidenceRetriever>) -> Self {
        Self { retriever }
    }
}

#[async_trait]
impl StageProcessor for GenerateStage {
    fn name(&self) -> &'static str {
        "generate"
    }

    async fn process(&self, mut record: ResearchRecord) -> Result<ResearchRecord> {
        let evidence = self.retriever.best_evidence(&record.query).await?;
        debug!(chars = evidence.len(), "drafting hypothesis from evidence");

        record.hypothesis = Some(format!(
            "The evidence suggests an answer to '{}': {}",
            record.query, evidence
        ));
        record.raw_data = Some(evidence);
        Ok(record)
    }
}
