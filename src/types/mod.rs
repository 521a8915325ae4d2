use serde::{Deserialize, Serialize};

// ============= Research Record Types =============

/// Terminal status of a research run, set only by the meta-review stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResearchStatus {
    /// Confidence reached the target; the hypothesis stands as-is.
    Completed,
    /// Confidence fell short; the refined hypothesis is the best available.
    NeedsRefinement,
}

impl std::fmt::Display for ResearchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResearchStatus::Completed => write!(f, "Completed"),
            ResearchStatus::NeedsRefinement => write!(f, "NeedsRefinement"),
        }
    }
}

/// The single record threaded through every pipeline stage.
///
/// Created with only the query populated, then enriched stage by stage.
/// The meta-review stage replaces it wholesale with a terminal projection,
/// after which only `query`, `original_query`, `final_summary`, and `status`
/// carry meaning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResearchRecord {
    /// Working copy of the research question.
    pub query: String,
    /// Canonical copy of the initial query. Never mutated after creation;
    /// the supervisor re-asserts `query == original_query` after every stage.
    pub original_query: String,
    /// Current best-effort answer text. Populated by the generate stage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hypothesis: Option<String>,
    /// Evidence snippet backing the hypothesis. Populated by the generate stage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_data: Option<String>,
    /// Whether the hypothesis passed the linguistic well-formedness check.
    /// Populated by the reflect stage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coherent: Option<bool>,
    /// Confidence in `[0, 10]` derived from secondary evidence volume.
    /// Populated by the rank stage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    /// Present only when the score fell below the confidence target.
    /// Populated by the evolve stage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refined_hypothesis: Option<String>,
    /// Final summary of a sufficiently similar past run, when one exists.
    /// Populated by the proximity stage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub past_research: Option<String>,
    /// Terminal verdict. Populated by the meta-review stage only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ResearchStatus>,
    /// Terminal user-facing payload. Populated by the meta-review stage only.
    #[serde(
        rename = "Final Research Summary",
        skip_serializing_if = "Option::is_none"
    )]
    pub final_summary: Option<String>,
}

impl ResearchRecord {
    /// Creates a fresh record for `query` with every stage field unset.
    pub fn new(query: impl Into<String>) -> Self {
        let query = query.into();
        Self {
            original_query: query.clone(),
            query,
            hypothesis: None,
            raw_data: None,
            coherent: None,
            score: None,
            refined_hypothesis: None,
            past_research: None,
            status: None,
            final_summary: None,
        }
    }

    /// True once the meta-review stage has produced a terminal verdict.
    pub fn is_terminal(&self) -> bool {
        self.status.is_some() && self.final_summary.is_some()
    }

    /// Projects the terminal fields into a persistable report.
    ///
    /// Fails with [`AppError::Pipeline`] if the record has not passed
    /// through the meta-review stage yet.
    pub fn to_report(&self) -> Result<ResearchReport> {
        let final_summary = self.final_summary.clone().ok_or_else(|| {
            AppError::Pipeline("record has no final summary to report".to_string())
        })?;
        let status = self
            .status
            .ok_or_else(|| AppError::Pipeline("record has no terminal status".to_string()))?;
        Ok(ResearchReport {
            final_summary,
            status,
        })
    }
}

/// Terminal projection of a run, persisted to the memory store keyed by
/// the original query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResearchReport {
    /// The record's final user-facing summary.
    #[serde(rename = "Final Research Summary")]
    pub final_summary: String,
    /// The run's terminal verdict.
    pub status: ResearchStatus,
}

// ============= Error Types =============

/// Error taxonomy for the research pipeline.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Web search backend failure. Degraded to the no-evidence sentinel at
    /// the retriever boundary, so it rarely escapes.
    #[error("Search error: {0}")]
    Search(String),

    /// Embedding backend failure. Fails the run; the failed batch always
    /// contains the query or hypothesis itself.
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Linguistic parser failure. Degraded to `coherent = false` at the
    /// reflect boundary.
    #[error("Parsing error: {0}")]
    Parsing(String),

    /// Memory store load or save failure.
    #[error("Store error: {0}")]
    Store(String),

    /// Internal stage-ordering violation, such as the terminal stage
    /// running without its preconditions. Never recoverable.
    #[error("Pipeline error: {0}")]
    Pipeline(String),

    /// Rejected caller input, such as a blank query.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration file or value problem.
    #[error("Config error: {0}")]
    Config(String),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, AppError>;
