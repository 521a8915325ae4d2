//! Web search abstraction.
//!
//! The pipeline only needs "give me up to N text snippets for this query";
//! [`SearchProvider`] captures that, and [`DuckDuckGoSearch`] implements it
//! via daedra. Tests substitute scripted providers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::Result;

pub mod duckduckgo;

pub use duckduckgo::DuckDuckGoSearch;

/// One web search result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    /// Result page title.
    pub title: String,
    /// Result page URL.
    pub url: String,
    /// Text snippet describing the page. This is what the pipeline ranks
    /// and quotes as evidence.
    pub snippet: String,
}

/// Abstract web search backend.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Fetch up to `max_results` hits for `query`, in backend rank order.
    ///
    /// An empty result set is `Ok`; transport failures are
    /// [`crate::types::AppError::Search`].
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>>;
}
