//! Research memory.
//!
//! A durable mapping from query string to the final report of the last run
//! for that query. The proximity stage reads it to surface prior research
//! on similar questions; the supervisor writes it when a run completes.
//!
//! # On-Disk Format
//!
//! One JSON object per store, keys are the original query strings:
//!
//! ```json
//! {
//!   "what is the boiling point of water": {
//!     "Final Research Summary": "The evidence suggests ...",
//!     "status": "Completed"
//!   }
//! }
//! ```
//!
//! The whole mapping is rewritten on every insert; the file is a snapshot,
//! not an append-only log. A missing file opens as an empty store, while an
//! unreadable or corrupt file is an error: silently starting empty would
//! discard completed research.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::types::{AppError, ResearchReport, Result};

/// File-backed query-to-report mapping.
///
/// Keys enumerate in sorted order (`BTreeMap`), which keeps similarity
/// scans over stored queries deterministic.
#[derive(Debug)]
pub struct MemoryStore {
    path: PathBuf,
    entries: BTreeMap<String, ResearchReport>,
}

impl MemoryStore {
    /// Opens the store at `path`, reading existing entries if the file
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] if the file exists but cannot be read
    /// or parsed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let entries = if path.exists() {
            let json = std::fs::read_to_string(&path).map_err(|e| {
                AppError::Store(format!("Failed to read {}: {}", path.display(), e))
            })?;
            serde_json::from_str(&json).map_err(|e| {
                AppError::Store(format!("Failed to parse {}: {}", path.display(), e))
            })?
        } else {
            BTreeMap::new()
        };

        Ok(Self { path, entries })
    }

    /// Looks up the stored report for an exact query string.
    pub fn get(&self, query: &str) -> Option<&ResearchReport> {
        self.entries.get(query)
    }

    /// Inserts or overwrites the report for `query` and saves the store.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] if the file cannot be written.
    pub fn insert(&mut self, query: impl Into<String>, report: ResearchReport) -> Result<()> {
        self.entries.insert(query.into(), report);
        self.save()
    }

    /// Stored query strings in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    /// Stored entries in sorted key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ResearchReport)> {
        self.entries.iter()
    }

    /// Number of stored reports.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been stored yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The file backing this store.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the whole mapping to disk, creating parent directories as
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] if the directory cannot be created or
    /// the file cannot be written.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::Store(format!("Failed to create {}: {}", parent.display(), e))
                })?;
            }
        }

        let json = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| AppError::Store(format!("Failed to serialize memory store: {}", e)))?;
        std::fs::write(&self.path, json).map_err(|e| {
            AppError::Store(format!("Failed to write {}: {}", self.path.display(), e))
        })?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
