//! # M.I.R.A - Multi-stage Iterative Research Assistant
//!
//! An iterative research pipeline built in Rust: a supervisor threads one
//! research question through six stages (generate, reflect, rank, evolve,
//! correlate, review) until the answer is confident or the iteration bound
//! is reached, and remembers completed answers for later runs.
//!
//! ## Overview
//!
//! M.I.R.A can be used in two ways:
//!
//! 1. **As a command-line tool** - Run the `mira` binary
//! 2. **As a library** - Import the pipeline into your own Rust project
//!
//! ## Quick Start (Library Usage)
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! mira-research = "0.1"
//! ```
//!
//! ### Basic Example
//!
//! ```rust,ignore
//! use mira::config::MiraConfig;
//! use mira::embedding::Embedder;
//! use mira::evidence::EvidenceRetriever;
//! use mira::memory::MemoryStore;
//! use mira::research::Supervisor;
//! use mira::search::DuckDuckGoSearch;
//! use mira::syntax::HeuristicParser;
//! use parking_lot::RwLock;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = MiraConfig::default();
//!     let embedder: Arc<dyn Embedder> = config.embedding.create_embedder()?;
//!     let retriever = Arc::new(EvidenceRetriever::new(
//!         Arc::new(DuckDuckGoSearch::new()),
//!         embedder.clone(),
//!         config.evidence.clone(),
//!     ));
//!     let store = Arc::new(RwLock::new(MemoryStore::open(&config.memory.path)?));
//!
//!     let supervisor = Supervisor::new(
//!         retriever,
//!         Arc::new(HeuristicParser::new()),
//!         embedder,
//!         store,
//!         &config,
//!     );
//!
//!     let outcome = supervisor.run("what is the rust borrow checker").await?;
//!     println!("{}", outcome.record.final_summary.unwrap_or_default());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `local-embeddings` | ONNX sentence embeddings via fastembed |
//!
//! Without `local-embeddings`, the deterministic token-hashing embedder is
//! used; it needs no model downloads and keeps runs reproducible.
//!
//! ## Modules
//!
//! - [`research`] - The supervisor loop and run outcomes
//! - [`stages`] - The six pipeline stage processors
//! - [`evidence`] - Evidence retrieval and best-candidate selection
//! - [`search`] - Web search providers
//! - [`embedding`] - Embedding backends, caching, and cosine similarity
//! - [`syntax`] - Rule-based linguistic coherence checking
//! - [`memory`] - The persistent research memory
//! - [`types`] - The research record and error handling
//!
//! ## Architecture
//!
//! The pipeline runs over a single mutable [`types::ResearchRecord`]: each
//! stage reads the fields earlier stages populated and writes its own, and
//! the supervisor re-asserts the record's query identity between stages.
//! The meta-review stage replaces the record with a terminal projection, so
//! one iteration's scratch state never leaks into the next run's output.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

/// Command-line parsing and terminal output.
pub mod cli;
/// TOML configuration for the pipeline.
pub mod config;
/// Embedding backends and cosine similarity.
pub mod embedding;
/// Evidence retrieval over search and embeddings.
pub mod evidence;
/// Persistent research memory.
pub mod memory;
/// The supervisor loop.
pub mod research;
/// Web search providers.
pub mod search;
/// The six pipeline stages.
pub mod stages;
/// Rule-based linguistic analysis.
pub mod syntax;
/// Core types (records, reports, errors).
pub mod types;

// Re-export commonly used types
pub use config::MiraConfig;
pub use embedding::{cosine_similarity, Embedder, EmbeddingProvider, HashEmbedder};
pub use evidence::{EvidenceRetriever, NO_EVIDENCE};
pub use memory::MemoryStore;
pub use research::{ResearchOutcome, RunState, Supervisor};
pub use search::{DuckDuckGoSearch, SearchHit, SearchProvider};
pub use stages::StageProcessor;
pub use syntax::{HeuristicParser, SyntaxParser};
pub use types::{AppError, ResearchRecord, ResearchReport, ResearchStatus, Result};
