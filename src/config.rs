//! TOML-based configuration for M.I.R.A
//!
//! This module provides declarative configuration for the research loop,
//! evidence retrieval, research memory, and the embedding backend via a
//! TOML file (`mira.toml`).
//!
//! Every field has a default, so a missing file or an empty table yields a
//! fully working configuration. Environment variables override a small set
//! of fields after the file is parsed (`MIRA_MEMORY_PATH`).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::embedding::cache::CacheConfig;
use crate::embedding::EmbeddingProvider;
use crate::types::{AppError, Result};

/// Root configuration structure loaded from mira.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MiraConfig {
    /// Research loop settings
    #[serde(default)]
    pub research: ResearchConfig,

    /// Evidence retrieval settings
    #[serde(default)]
    pub evidence: EvidenceConfig,

    /// Research memory settings
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Embedding backend selection
    #[serde(default)]
    pub embedding: EmbeddingProvider,

    /// Embedding cache settings
    #[serde(default)]
    pub cache: CacheConfig,
}

// ============= Research Loop Configuration =============

/// Settings for the supervisor loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// Upper bound on pipeline iterations per run. The loop stops here even
    /// when the record still reads `NeedsRefinement`.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Score at or above which a hypothesis is accepted as-is.
    #[serde(default = "default_confidence_target")]
    pub confidence_target: u8,

    /// Whether completed runs are written back to the memory store.
    #[serde(default = "default_persist_on_completion")]
    pub persist_on_completion: bool,
}

fn default_max_iterations() -> u32 {
    3
}

fn default_confidence_target() -> u8 {
    6
}

fn default_persist_on_completion() -> bool {
    true
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            confidence_target: default_confidence_target(),
            persist_on_completion: default_persist_on_completion(),
        }
    }
}

// ============= Evidence Retrieval Configuration =============

/// Settings for evidence retrieval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceConfig {
    /// Candidate snippets fetched per retrieval call.
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Snippets shorter than this many characters are discarded as noise.
    #[serde(default = "default_min_snippet_chars")]
    pub min_snippet_chars: usize,
}

fn default_max_results() -> usize {
    5
}

fn default_min_snippet_chars() -> usize {
    50
}

impl Default for EvidenceConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            min_snippet_chars: default_min_snippet_chars(),
        }
    }
}

// ============= Memory Configuration =============

/// Settings for the research memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Path of the JSON file backing the research memory.
    #[serde(default = "default_memory_path")]
    pub path: String,

    /// Cosine similarity a stored query must strictly exceed for its result
    /// to be attached as past research.
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,
}

fn default_memory_path() -> String {
    "./data/research_memory.json".to_string()
}

fn default_similarity_threshold() -> f32 {
    0.7
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            path: default_memory_path(),
            similarity_threshold: default_similarity_threshold(),
        }
    }
}

// ============= Loading =============

impl MiraConfig {
    /// Loads configuration from a TOML file, falling back to defaults when
    /// the file does not exist. Environment overrides are applied last.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let mut config = if path.exists() {
            let content = fs::read_to_string(path)
                .map_err(|e| AppError::Config(format!("failed to read {}: {e}", path.display())))?;
            toml::from_str(&content)
                .map_err(|e| AppError::Config(format!("failed to parse {}: {e}", path.display())))?
        } else {
            debug!("config file {} not found, using defaults", path.display());
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("MIRA_MEMORY_PATH") {
            if !path.trim().is_empty() {
                self.memory.path = path;
            }
        }
    }

    /// Validates value ranges. Called by [`MiraConfig::load`]; call it
    /// directly when building a configuration in code.
    pub fn validate(&self) -> Result<()> {
        if self.research.max_iterations == 0 {
            return Err(AppError::Config(
                "research.max_iterations must be at least 1".to_string(),
            ));
        }
        if self.research.confidence_target > 10 {
            return Err(AppError::Config(
                "research.confidence_target must be in 0..=10".to_string(),
            ));
        }
        if self.evidence.max_results == 0 {
            return Err(AppError::Config(
                "evidence.max_results must be at least 1".to_string(),
            ));
        }
        if !self.memory.similarity_threshold.is_finite()
            || !(-1.0..=1.0).contains(&self.memory.similarity_threshold)
        {
            return Err(AppError::Config(
                "memory.similarity_threshold must be in [-1.0, 1.0]".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_documented_values() {
        let config = MiraConfig::default();
        assert_eq!(config.research.max_iterations, 3);
        assert_eq!(config.research.confidence_target, 6);
        assert!(config.research.persist_on_completion);
        assert_eq!(config.evidence.max_results, 5);
        assert_eq!(config.evidence.min_snippet_chars, 50);
        assert_eq!(config.memory.similarity_threshold, 0.7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_toml_parses_to_defaults() {
        let config: MiraConfig = toml::from_str("").unwrap();
        assert_eq!(config.research.max_iterations, 3);
        assert_eq!(config.memory.path, "./data/research_memory.json");
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let config: MiraConfig = toml::from_str(
            r#"
            [research]
            max_iterations = 5

            [memory]
            similarity_threshold = 0.9
            "#,
        )
        .unwrap();
        assert_eq!(config.research.max_iterations, 5);
        assert_eq!(config.research.confidence_target, 6);
        assert_eq!(config.memory.similarity_threshold, 0.9);
        assert_eq!(config.evidence.max_results, 5);
    }

    #[test]
    fn embedding_section_selects_backend() {
        let config: MiraConfig = toml::from_str(
            r#"
            [embedding]
            type = "hash-fallback"
            dimension = 128
            "#,
        )
        .unwrap();
        match config.embedding {
            EmbeddingProvider::HashFallback { dimension } => assert_eq!(dimension, 128),
            #[cfg(feature = "local-embeddings")]
            _ => panic!("expected hash-fallback backend"),
        }
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let mut config = MiraConfig::default();
        config.research.max_iterations = 0;
        assert!(matches!(config.validate(), Err(AppError::Config(_))));

        let mut config = MiraConfig::default();
        config.research.confidence_target = 11;
        assert!(matches!(config.validate(), Err(AppError::Config(_))));

        let mut config = MiraConfig::default();
        config.memory.similarity_threshold = 1.5;
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn load_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = MiraConfig::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.research.max_iterations, 3);
    }

    #[test]
    fn load_rejects_malformed_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mira.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "[research\nmax_iterations = ").unwrap();
        assert!(matches!(
            MiraConfig::load(&path),
            Err(AppError::Config(_))
        ));
    }
}
