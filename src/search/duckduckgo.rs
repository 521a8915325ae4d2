//! DuckDuckGo search backend via daedra.

use async_trait::async_trait;

use super::{SearchHit, SearchProvider};
use crate::types::{AppError, Result};

/// Web search provider backed by DuckDuckGo.
#[derive(Debug, Default)]
pub struct DuckDuckGoSearch;

impl DuckDuckGoSearch {
    /// Create a new DuckDuckGo provider.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        let search_args = daedra::SearchArgs {
            query: query.to_string(),
            options: Some(daedra::SearchOptions {
                num_results: max_results,
                ..Default::default()
            }),
        };

        match daedra::tools::search::perform_search(&search_args).await {
            Ok(response) => Ok(response
                .data
                .iter()
                .take(max_results)
                .map(|r| SearchHit {
                    title: r.title.clone(),
                    url: r.url.clone(),
                    snippet: r.description.clone(),
                })
                .collect()),
            Err(e) => Err(AppError::Search(format!("Search failed: {}", e))),
        }
    }
}
