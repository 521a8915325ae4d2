//! Hypothesis refinement stage.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::StageProcessor;
use crate::evidence::EvidenceRetriever;
use crate::types::{AppError, ResearchRecord, Result};

/// Extends a weak hypothesis with a second round of evidence.
///
/// A no-op when the score already meets the confidence target. Otherwise
/// the refinement appends to the hypothesis rather than replacing it, so
/// refinement never loses text.
pub struct EvolveStage {
    retriever: Arc<EvidenceRetriever>,
    confidence_target: u8,
}

impl EvolveStage {
    /// Create the stage over a shared retriever.
    pub fn new(retriever: Arc<EvidenceRetriever>, confidence_target: u8) -> Self {
        Self {
            retriever,
            confidence_target,
        }
    }
}

#[async_trait]
impl StageProcessor for EvolveStage {
    fn name(&self) -> &'static str {
        "evolve"
    }

    async fn process(&self, mut record: ResearchRecord) -> Result<ResearchRecord> {
        let score = record.score.ok_or_else(|| {
            AppError::Pipeline("evolve stage ran before the hypothesis was ranked".to_string())
        })?;

        if score >= self.confidence_target {
            debug!(score, "confidence target met, skipping refinement");
            return Ok(record);
        }

        let hypothesis = record.hypothesis.clone().ok_or_else(|| {
            AppError::Pipeline("evolve stage ran before a hypothesis existed".to_string())
        })?;

        let evidence = self.retriever.best_evidence(&hypothesis).await?;
        debug!(score, "refining hypothesis with fresh evidence");

        record.refined_hypothesis = Some(format!(
            "{} Further verification shows: {}.",
            hypothesis, evidence
        ));
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EvidenceConfig;
    use crate::embedding::HashEmbedder;
    use crate::search::{SearchHit, SearchProvider};

    struct StaticSearch(&'static str);

    #[async_trait]
    impl SearchProvider for StaticSearch {
        async fn search(&self, _query: &str, _max_results: usize) -> Result<Vec<SearchHit>> {
            Ok(vec![SearchHit {
                title: "t".to_string(),
                url: "https://example.com".to_string(),
                snippet: self.0.to_string(),
            }])
        }
    }

    fn stage(snippet: &'static str) -> EvolveStage {
        EvolveStage::new(
            Arc::new(EvidenceRetriever::new(
                Arc::new(StaticSearch(snippet)),
                Arc::new(HashEmbedder::new(64)),
                EvidenceConfig {
                    max_results: 5,
                    min_snippet_chars: 1,
                },
            )),
            6,
        )
    }

    fn scored_record(score: u8) -> ResearchRecord {
        let mut record = ResearchRecord::new("q");
        record.hypothesis = Some("The evidence suggests an answer.".to_string());
        record.score = Some(score);
        record
    }

    #[tokio::test]
    async fn high_score_passes_through_unchanged() {
        let input = scored_record(6);
        let output = stage("unused evidence").process(input.clone()).await.unwrap();
        assert_eq!(output, input);
        assert!(output.refined_hypothesis.is_none());
    }

    #[tokio::test]
    async fn ten_passes_through_unchanged() {
        let output = stage("unused").process(scored_record(10)).await.unwrap();
        assert!(output.refined_hypothesis.is_none());
    }

    #[tokio::test]
    async fn low_score_appends_verification_evidence() {
        let output = stage("secondary corroborating snippet")
            .process(scored_record(5))
            .await
            .unwrap();

        assert_eq!(
            output.refined_hypothesis.as_deref(),
            Some(
                "The evidence suggests an answer. Further verification shows: \
                 secondary corroborating snippet."
            )
        );
        // The original hypothesis survives untouched.
        assert_eq!(
            output.hypothesis.as_deref(),
            Some("The evidence suggests an answer.")
        );
    }

    #[tokio::test]
    async fn zero_score_is_refined() {
        let output = stage("evidence text here").process(scored_record(0)).await.unwrap();
        assert!(output.refined_hypothesis.is_some());
    }

    #[tokio::test]
    async fn missing_score_is_a_pipeline_error() {
        let mut record = ResearchRecord::new("q");
        record.hypothesis = Some("h".to_string());

        let result = stage("x").process(record).await.unwrap_err();
        assert!(matches!(result, AppError::Pipeline(_)));
    }
}
