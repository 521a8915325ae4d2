//! Pipeline stages.
//!
//! Six stage processors, each a transformation over the research record,
//! composed by the supervisor in fixed order:
//!
//! 1. [`GenerateStage`] - fetch evidence for the query, draft a hypothesis
//! 2. [`ReflectStage`] - check the hypothesis for linguistic coherence
//! 3. [`RankStage`] - score the hypothesis against secondary evidence
//! 4. [`EvolveStage`] - refine the hypothesis when the score falls short
//! 5. [`ProximityStage`] - attach sufficiently similar past research
//! 6. [`MetaReviewStage`] - emit the terminal summary and verdict
//!
//! Stages never construct collaborators; retrievers, parsers, stores, and
//! embedders are injected at wiring time and shared across stages.

use async_trait::async_trait;

use crate::types::{ResearchRecord, Result};

pub mod evolve;
pub mod generate;
pub mod proximity;
pub mod rank;
pub mod reflect;
pub mod review;

pub use evolve::EvolveStage;
pub use generate::GenerateStage;
pub use proximity::ProximityStage;
pub use rank::{support_score, RankStage};
pub use reflect::ReflectStage;
pub use review::MetaReviewStage;

/// One transformation over the research record.
///
/// A stage consumes the record and returns the enriched replacement.
/// Preconditions on the incoming record (which fields must already be
/// populated) are part of each stage's contract; violations are
/// [`crate::types::AppError::Pipeline`] errors, since only a supervisor
/// bug can produce them.
#[async_trait]
pub trait StageProcessor: Send + Sync {
    /// Stage name as it appears in logs.
    fn name(&self) -> &'static str;

    /// Transform the record.
    async fn process(&self, record: ResearchRecord) -> Result<ResearchRecord>;
}
