//! The supervisor state machine.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use uuid::Uuid;

use crate::config::{MiraConfig, ResearchConfig};
use crate::embedding::Embedder;
use crate::evidence::EvidenceRetriever;
use crate::memory::MemoryStore;
use crate::stages::{
    EvolveStage, GenerateStage, MetaReviewStage, ProximityStage, RankStage, ReflectStage,
    StageProcessor,
};
use crate::syntax::SyntaxParser;
use crate::types::{AppError, ResearchRecord, ResearchStatus, Result};

// ============================================================================
// Run State
// ============================================================================

/// Where a research run stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunState {
    /// Mid-run, on the given zero-based iteration.
    Running(u32),
    /// The verdict reached the confidence target.
    Completed,
    /// The iteration bound elapsed without a completed verdict. The last
    /// computed record still stands as the output; exhaustion is a soft cap,
    /// not a failure.
    Exhausted,
}

impl RunState {
    /// True once the run can no longer advance.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Completed | RunState::Exhausted)
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunState::Running(iteration) => write!(f, "Running({iteration})"),
            RunState::Completed => write!(f, "Completed"),
            RunState::Exhausted => write!(f, "Exhausted"),
        }
    }
}

// ============================================================================
// Run Outcome
// ============================================================================

/// Everything a caller learns from one research run.
///
/// Only the record is ever persisted; the rest is metadata for callers
/// and the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct ResearchOutcome {
    /// The final record, terminal whenever at least one iteration ran.
    pub record: ResearchRecord,
    /// Terminal state of the run.
    pub state: RunState,
    /// Number of full pipeline iterations executed.
    pub iterations: u32,
    /// Identifier for correlating logs of this run.
    pub run_id: Uuid,
    /// Wall-clock duration of the run.
    pub duration_ms: u64,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
}

// ============================================================================
// Supervisor
// ============================================================================

/// Drives the six-stage pipeline over a single query.
///
/// The stages are constructed once, in fixed order, from the injected
/// collaborators. Each iteration threads the record through all six; the
/// loop ends early on a `Completed` verdict and is bounded by
/// `research.max_iterations` otherwise. After the loop, completed runs are
/// written to the memory store when `research.persist_on_completion` is
/// enabled; exhausted runs are never persisted.
pub struct Supervisor {
    stages: Vec<Box<dyn StageProcessor>>,
    store: Arc<RwLock<MemoryStore>>,
    config: ResearchConfig,
}

impl Supervisor {
    /// Wires the pipeline from its collaborators.
    pub fn new(
        retriever: Arc<EvidenceRetriever>,
        parser: Arc<dyn SyntaxParser>,
        embedder: Arc<dyn Embedder>,
        store: Arc<RwLock<MemoryStore>>,
        config: &MiraConfig,
    ) -> Self {
        let stages: Vec<Box<dyn StageProcessor>> = vec![
            Box::new(GenerateStage::new(retriever.clone())),
            Box::new(ReflectStage::new(parser)),
            Box::new(RankStage::new(retriever.clone())),
            Box::new(EvolveStage::new(
                retriever,
                config.research.confidence_target,
            )),
            Box::new(ProximityStage::new(
                store.clone(),
                embedder,
                config.memory.similarity_threshold,
            )),
            Box::new(MetaReviewStage::new(config.research.confidence_target)),
        ];

        Self {
            stages,
            store,
            config: config.research.clone(),
        }
    }

    /// Runs the research loop for `query` until completion or exhaustion.
    ///
    /// A blank query is rejected up front with [`AppError::InvalidInput`].
    /// Stage errors abort the run and propagate unchanged.
    pub async fn run(&self, query: &str) -> Result<ResearchOutcome> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidInput(
                "research query must not be blank".to_string(),
            ));
        }

        let run_id = Uuid::new_v4();
        let started = Instant::now();
        let original_query = query.to_string();

        tracing::info!(%run_id, query = %original_query, "starting research run");

        let mut record = ResearchRecord::new(query);
        let mut state = RunState::Running(0);
        let mut iterations = 0u32;

        for iteration in 0..self.config.max_iterations {
            state = RunState::Running(iteration);
            tracing::info!(
                "Research iteration {}/{}",
                iteration + 1,
                self.config.max_iterations
            );

            for stage in &self.stages {
                tracing::debug!(stage = stage.name(), "running stage");
                record = stage.process(record).await?;
                // The query is the run's identity; no stage may change it.
                record.query = original_query.clone();
                record.original_query = original_query.clone();
            }
            iterations = iteration + 1;

            if record.status == Some(ResearchStatus::Completed) {
                state = RunState::Completed;
                break;
            }
        }

        if state != RunState::Completed {
            state = RunState::Exhausted;
        }

        if state == RunState::Completed && self.config.persist_on_completion {
            let report = record.to_report()?;
            self.store
                .write()
                .insert(record.original_query.clone(), report)?;
            tracing::debug!(query = %original_query, "persisted completed research");
        }

        let duration_ms = started.elapsed().as_millis() as u64;
        tracing::info!(%run_id, iterations, %state, duration_ms, "research run finished");

        Ok(ResearchOutcome {
            record,
            state,
            iterations,
            run_id,
            duration_ms,
            finished_at: Utc::now(),
        })
    }
}
