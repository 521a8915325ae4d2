//! Integration tests for the research memory
//!
//! Completed research must survive a process restart through the JSON
//! store, exhausted research must never be written, and the persistence
//! policy must be honored.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use mira::config::MiraConfig;
use mira::embedding::{Embedder, HashEmbedder};
use mira::evidence::EvidenceRetriever;
use mira::memory::MemoryStore;
use mira::research::{ResearchOutcome, RunState, Supervisor};
use mira::search::{SearchHit, SearchProvider};
use mira::syntax::HeuristicParser;
use mira::types::{ResearchStatus, Result};

struct FixedSearch(Vec<SearchHit>);

#[async_trait]
impl SearchProvider for FixedSearch {
    async fn search(&self, _query: &str, _max_results: usize) -> Result<Vec<SearchHit>> {
        Ok(self.0.clone())
    }
}

fn evidence_hit(words: usize) -> SearchHit {
    SearchHit {
        title: "result".to_string(),
        url: "https://example.com/result".to_string(),
        snippet: vec!["finding"; words].join(" "),
    }
}

/// Runs one research pipeline against the store at `path`.
async fn run_research(
    path: &Path,
    hits: Vec<SearchHit>,
    persist: bool,
    query: &str,
) -> ResearchOutcome {
    let mut config = MiraConfig::default();
    config.research.persist_on_completion = persist;

    let embedder: Arc<dyn Embedder> = Arc::new(HashEmbedder::new(256));
    let retriever = Arc::new(EvidenceRetriever::new(
        Arc::new(FixedSearch(hits)),
        embedder.clone(),
        config.evidence.clone(),
    ));
    let store = Arc::new(RwLock::new(MemoryStore::open(path).unwrap()));
    let supervisor = Supervisor::new(
        retriever,
        Arc::new(HeuristicParser::new()),
        embedder,
        store,
        &config,
    );
    supervisor.run(query).await.unwrap()
}

#[tokio::test]
async fn completed_research_survives_reopening_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("memory.json");

    let outcome = run_research(&path, vec![evidence_hit(90)], true, "why is the sky blue").await;
    assert_eq!(outcome.state, RunState::Completed);

    let store = MemoryStore::open(&path).unwrap();
    assert_eq!(store.len(), 1);
    let report = store.get("why is the sky blue").unwrap();
    assert_eq!(report.status, ResearchStatus::Completed);
    assert_eq!(
        Some(report.final_summary.as_str()),
        outcome.record.final_summary.as_deref()
    );
}

#[tokio::test]
async fn exhausted_research_is_never_written() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("memory.json");

    let outcome = run_research(&path, vec![], true, "nothing to find").await;
    assert_eq!(outcome.state, RunState::Exhausted);

    let store = MemoryStore::open(&path).unwrap();
    assert!(store.is_empty());
}

#[tokio::test]
async fn persistence_policy_can_disable_writes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("memory.json");

    let outcome = run_research(&path, vec![evidence_hit(90)], false, "keep this private").await;
    assert_eq!(outcome.state, RunState::Completed);

    let store = MemoryStore::open(&path).unwrap();
    assert!(store.is_empty());
}

#[tokio::test]
async fn repeat_research_overwrites_the_stored_entry() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("memory.json");

    run_research(&path, vec![evidence_hit(70)], true, "recurring question").await;
    let second = run_research(&path, vec![evidence_hit(90)], true, "recurring question").await;
    assert_eq!(second.state, RunState::Completed);

    let store = MemoryStore::open(&path).unwrap();
    assert_eq!(store.len(), 1);
    let report = store.get("recurring question").unwrap();
    assert_eq!(
        Some(report.final_summary.as_str()),
        second.record.final_summary.as_deref()
    );
    // The second run saw ninety words of evidence, the first only seventy.
    assert!(report.final_summary.split_whitespace().count() > 70);
}

#[tokio::test]
async fn store_file_is_one_pretty_json_object() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("memory.json");

    run_research(&path, vec![evidence_hit(90)], true, "inspect the file").await;

    let raw = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let entry = value
        .as_object()
        .unwrap()
        .get("inspect the file")
        .unwrap()
        .as_object()
        .unwrap();
    assert!(entry.contains_key("Final Research Summary"));
    assert_eq!(entry.get("status").unwrap(), "Completed");
    // Pretty-printed, not a single line.
    assert!(raw.contains("\n  "));
}
