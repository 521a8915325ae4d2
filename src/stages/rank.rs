//! Confidence scoring stage.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::StageProcessor;
use crate::evidence::EvidenceRetriever;
use crate::types::{AppError, ResearchRecord, Result};

/// Confidence heuristic: whitespace word count of the supporting evidence,
/// floor-divided by 10, clamped to `[0, 10]`.
///
/// Deliberately crude. More prose from a second search pass means more
/// material backing the hypothesis; the arithmetic lives here so the
/// heuristic can be swapped without touching orchestration.
pub fn support_score(evidence: &str) -> u8 {
    let words = evidence.split_whitespace().count();
    std::cmp::min(words / 10, 10) as u8
}

/// Scores the hypothesis by searching for it verbatim and measuring how
/// much supporting prose comes back.
pub struct RankStage {
    retriever: Arc<EvidenceRetriever>,
}

impl RankStage {
    /// Create the stage over a shared retriever.
    pub fn new(retriever: Arc<EvidenceRetriever>) -> Self {
        Self { retriever }
    }
}

#[async_trait]
impl StageProcessor for RankStage {
    fn name(&self) -> &'static str {
        "rank"
    }

    async fn process(&self, mut record: ResearchRecord) -> Result<ResearchRecord> {
        let hypothesis = record.hypothesis.clone().ok_or_else(|| {
            AppError::Pipeline("rank stage ran before a hypothesis existed".to_string())
        })?;

        let evidence = self.retriever.best_evidence(&hypothesis).await?;
        let score = support_score(&evidence);
        info!(score, "ranked hypothesis confidence");

        record.score = Some(score);
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EvidenceConfig;
    use crate::embedding::HashEmbedder;
    use crate::search::{SearchHit, SearchProvider};
    use rstest::rstest;

    #[rstest]
    #[case("", 0)]
    #[case("one two three", 0)]
    #[case("No relevant result found.", 0)]
    fn short_evidence_scores_zero(#[case] evidence: &str, #[case] expected: u8) {
        assert_eq!(support_score(evidence), expected);
    }

    #[rstest]
    #[case(9, 0)]
    #[case(10, 1)]
    #[case(19, 1)]
    #[case(20, 2)]
    #[case(59, 5)]
    #[case(60, 6)]
    #[case(100, 10)]
    #[case(150, 10)]
    #[case(5000, 10)]
    fn word_counts_map_to_floor_divided_clamped_scores(
        #[case] words: usize,
        #[case] expected: u8,
    ) {
        let evidence = vec!["word"; words].join(" ");
        assert_eq!(support_score(&evidence), expected);
    }

    #[test]
    fn repeated_whitespace_does_not_inflate_the_count() {
        assert_eq!(support_score("a  b \t c \n d"), 0);
        let padded = vec!["word"; 30].join("   \t ");
        assert_eq!(support_score(&padded), 3);
    }

    struct WordsSearch(usize);

    #[async_trait]
    impl SearchProvider for WordsSearch {
        async fn search(&self, _query: &str, _max_results: usize) -> Result<Vec<SearchHit>> {
            Ok(vec![SearchHit {
                title: "t".to_string(),
                url: "https://example.com".to_string(),
                snippet: vec!["word"; self.0].join(" "),
            }])
        }
    }

    fn stage(evidence_words: usize) -> RankStage {
        RankStage::new(Arc::new(EvidenceRetriever::new(
            Arc::new(WordsSearch(evidence_words)),
            Arc::new(HashEmbedder::new(64)),
            EvidenceConfig {
                max_results: 5,
                min_snippet_chars: 1,
            },
        )))
    }

    #[tokio::test]
    async fn score_lands_on_the_record() {
        let mut record = ResearchRecord::new("q");
        record.hypothesis = Some("The evidence suggests an answer.".to_string());

        let record = stage(85).process(record).await.unwrap();
        assert_eq!(record.score, Some(8));
    }

    #[tokio::test]
    async fn long_evidence_clamps_at_ten() {
        let mut record = ResearchRecord::new("q");
        record.hypothesis = Some("hypothesis text".to_string());

        let record = stage(150).process(record).await.unwrap();
        assert_eq!(record.score, Some(10));
    }

    #[tokio::test]
    async fn missing_hypothesis_is_a_pipeline_error() {
        let result = stage(10).process(ResearchRecord::new("q")).await;
        assert!(matches!(result, Err(AppError::Pipeline(_))));
    }
}
