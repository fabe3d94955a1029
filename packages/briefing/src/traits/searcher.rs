//! Web search provider trait.
//!
//! When local articles are too thin to answer a question, the augmenter
//! fans a single enhanced query out to every configured provider and merges
//! what comes back. Providers only have to turn a query into raw results;
//! filtering, ranking and deduplication happen above them.
//!
//! # Implementations
//!
//! - `TavilySearchProvider` - Tavily API
//! - `GoogleSearchProvider` - Google Custom Search
//! - `DuckDuckGoSearchProvider` - DuckDuckGo instant answers
//! - `MockSearchProvider` - For testing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One raw result from a search provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,

    /// Outlet or provider label
    pub source: String,

    pub published_at: Option<DateTime<Utc>>,
}

impl WebSearchResult {
    /// Create a result with no publish date.
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        snippet: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
            source: source.into(),
            published_at: None,
        }
    }

    /// Set the publish date.
    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = Some(published_at);
        self
    }
}

/// Open-web search provider.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Provider name, used in logs and error messages.
    fn name(&self) -> &str;

    /// Run one query and return whatever the provider found.
    ///
    /// An empty vector is a normal outcome; errors are reserved for
    /// transport or API failures.
    async fn search(&self, query: &str) -> Result<Vec<WebSearchResult>>;
}
