//! Research orchestration.
//!
//! The [`Supervisor`] drives one query through the six pipeline stages in
//! fixed order, repeating up to a configured iteration bound until the
//! meta-review verdict reads `Completed`:
//!
//! 1. Generate - fetch evidence, draft a hypothesis
//! 2. Reflect - check linguistic coherence
//! 3. Rank - score the hypothesis against secondary evidence
//! 4. Evolve - refine the hypothesis when the score falls short
//! 5. Proximity - attach sufficiently similar past research
//! 6. Meta-review - emit the terminal summary and verdict
//!
//! # Usage
//!
//! ```ignore
//! use mira::research::Supervisor;
//!
//! let supervisor = Supervisor::new(retriever, parser, embedder, store, &config);
//! let outcome = supervisor
//!     .run("What are the latest developments in quantum computing?")
//!     .await?;
//!
//! println!("{}", outcome.record.final_summary.unwrap_or_default());
//! ```

/// Supervisor loop, run states, and run outcomes.
pub mod supervisor;

pub use supervisor::{ResearchOutcome, RunState, Supervisor};
