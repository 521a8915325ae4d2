//! Terminal verdict stage.

use async_trait::async_trait;
use tracing::info;

use super::StageProcessor;
use crate::types::{AppError, ResearchRecord, ResearchStatus, Result};

/// Collapses the accumulated record into a terminal verdict.
///
/// At or above the confidence target the original hypothesis becomes the
/// final summary with [`ResearchStatus::Completed`]; below it the refined
/// hypothesis from the evolve stage is promoted instead, with
/// [`ResearchStatus::NeedsRefinement`]. Either way the output is a fresh
/// record carrying only the query and the terminal fields, so no
/// intermediate stage data leaks into the result.
pub struct MetaReviewStage {
    confidence_target: u8,
}

impl MetaReviewStage {
    /// Create the stage with the confidence score a hypothesis must reach
    /// to be accepted as-is.
    pub fn new(confidence_target: u8) -> Self {
        Self { confidence_target }
    }
}

#[async_trait]
impl StageProcessor for MetaReviewStage {
    fn name(&self) -> &'static str {
        "meta-review"
    }

    async fn process(&self, record: ResearchRecord) -> Result<ResearchRecord> {
        let hypothesis = record.hypothesis.clone().ok_or_else(|| {
            AppError::Pipeline("meta-review ran before a hypothesis existed".to_string())
        })?;
        let score = record.score.ok_or_else(|| {
            AppError::Pipeline("meta-review ran before the hypothesis was ranked".to_string())
        })?;

        let (final_summary, status) = if score >= self.confidence_target {
            (hypothesis, ResearchStatus::Completed)
        } else {
            let refined = record.refined_hypothesis.clone().ok_or_else(|| {
                AppError::Pipeline(
                    "score below target but the evolve stage produced no refinement".to_string(),
                )
            })?;
            (refined, ResearchStatus::NeedsRefinement)
        };

        info!(score, target = self.confidence_target, %status, "finalized research verdict");

        let mut terminal = ResearchRecord::new(record.original_query);
        terminal.final_summary = Some(final_summary);
        terminal.status = Some(status);
        Ok(terminal)
    }
}
