//! Read-only collaborator traits for stored articles and organizations.
//!
//! The briefing pipeline never writes articles; ingestion lives elsewhere.
//! Implementations only need to serve listings and point lookups.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::article::{Article, ArticleFilter};
use crate::types::organization::Organization;

/// Source of stored news articles.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// List articles matching `filter`, newest first.
    ///
    /// Returns the requested page and the total number of matches.
    async fn list_articles(&self, filter: &ArticleFilter) -> Result<(Vec<Article>, u64)>;

    /// Fetch one article by id.
    async fn get_article(&self, id: &str) -> Result<Option<Article>>;
}

/// Lookup of tracked organizations by name.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrganizationDirectory: Send + Sync {
    /// Find an organization by canonical name or alias (case-insensitive).
    async fn get_by_name(&self, name: &str) -> Result<Option<Organization>>;
}
