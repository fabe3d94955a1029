//! In-memory article store and organization directory.
//!
//! Good enough for development, demos and tests. Data is loaded once
//! (optionally from JSON seed files) and lost on restart.

use async_trait::async_trait;
use std::path::Path;
use std::sync::RwLock;

use crate::error::{BriefingError, Result};
use crate::traits::store::{ArticleStore, OrganizationDirectory};
use crate::types::article::{Article, ArticleFilter};
use crate::types::organization::Organization;

/// In-memory article storage.
pub struct MemoryArticleStore {
    articles: RwLock<Vec<Article>>,
}

impl Default for MemoryArticleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryArticleStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            articles: RwLock::new(Vec::new()),
        }
    }

    /// Create a store holding `articles`.
    pub fn with_articles(articles: Vec<Article>) -> Self {
        Self {
            articles: RwLock::new(articles),
        }
    }

    /// Load articles from a JSON array file.
    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            BriefingError::store(format!("failed to read {}: {}", path.display(), e))
        })?;
        let articles: Vec<Article> = serde_json::from_str(&raw)?;
        Ok(Self::with_articles(articles))
    }

    /// Add or replace an article (matched by id).
    pub fn insert(&self, article: Article) -> Result<()> {
        let mut articles = self
            .articles
            .write()
            .map_err(|_| BriefingError::store("article store lock poisoned"))?;

        match articles.iter_mut().find(|a| a.id == article.id) {
            Some(existing) => *existing = article,
            None => articles.push(article),
        }
        Ok(())
    }

    /// Number of stored articles.
    pub fn len(&self) -> usize {
        self.articles.read().map(|a| a.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ArticleStore for MemoryArticleStore {
    async fn list_articles(&self, filter: &ArticleFilter) -> Result<(Vec<Article>, u64)> {
        filter.validate()?;

        let articles = self
            .articles
            .read()
            .map_err(|_| BriefingError::store("article store lock poisoned"))?;

        let mut matched: Vec<&Article> = articles.iter().filter(|a| filter.matches(a)).collect();
        matched.sort_by(|a, b| b.published_at.cmp(&a.published_at));

        let total = matched.len() as u64;
        let page = matched
            .into_iter()
            .skip(filter.offset)
            .take(filter.limit)
            .cloned()
            .collect();

        Ok((page, total))
    }

    async fn get_article(&self, id: &str) -> Result<Option<Article>> {
        let articles = self
            .articles
            .read()
            .map_err(|_| BriefingError::store("article store lock poisoned"))?;
        Ok(articles.iter().find(|a| a.id == id).cloned())
    }
}

/// In-memory organization directory.
pub struct MemoryOrganizationDirectory {
    organizations: Vec<Organization>,
}

impl Default for MemoryOrganizationDirectory {
    fn default() -> Self {
        Self::new(Organization::default_roster())
    }
}

impl MemoryOrganizationDirectory {
    pub fn new(organizations: Vec<Organization>) -> Self {
        Self { organizations }
    }

    /// Load organizations from a JSON array file.
    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            BriefingError::store(format!("failed to read {}: {}", path.display(), e))
        })?;
        let organizations: Vec<Organization> = serde_json::from_str(&raw)?;
        Ok(Self::new(organizations))
    }

    /// Every organization in the directory.
    pub fn organizations(&self) -> &[Organization] {
        &self.organizations
    }
}

#[async_trait]
impl OrganizationDirectory for MemoryOrganizationDirectory {
    async fn get_by_name(&self, name: &str) -> Result<Option<Organization>> {
        Ok(self
            .organizations
            .iter()
            .find(|o| o.is_named(name))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn article(id: &str, org: &str, days_ago: i64) -> Article {
        Article::new(format!("Story {}", id), "", format!("https://example.com/{}", id))
            .with_id(id)
            .with_organization(org)
            .with_published_at(Utc::now() - Duration::days(days_ago))
    }

    #[tokio::test]
    async fn test_list_newest_first_with_total() {
        let store = MemoryArticleStore::with_articles(vec![
            article("old", "Lockheed Martin", 20),
            article("new", "Lockheed Martin", 1),
            article("mid", "Lockheed Martin", 5),
            article("other", "Raytheon Technologies", 2),
        ]);

        let filter = ArticleFilter::with_limit(2).for_organization("Lockheed Martin");
        let (page, total) = store.list_articles(&filter).await.unwrap();

        assert_eq!(total, 3);
        let ids: Vec<_> = page.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid"]);
    }

    #[tokio::test]
    async fn test_list_with_offset() {
        let store = MemoryArticleStore::with_articles(vec![
            article("a", "Lockheed Martin", 1),
            article("b", "Lockheed Martin", 2),
            article("c", "Lockheed Martin", 3),
        ]);

        let mut filter = ArticleFilter::with_limit(10);
        filter.offset = 2;
        let (page, total) = store.list_articles(&filter).await.unwrap();

        assert_eq!(total, 3);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, "c");
    }

    #[tokio::test]
    async fn test_invalid_filter_is_rejected() {
        let store = MemoryArticleStore::new();
        let result = store.list_articles(&ArticleFilter::with_limit(5000)).await;
        assert!(matches!(result, Err(BriefingError::Store(_))));
    }

    #[tokio::test]
    async fn test_insert_replaces_by_id() {
        let store = MemoryArticleStore::new();
        store.insert(article("a", "Lockheed Martin", 1)).unwrap();
        store
            .insert(article("a", "Raytheon Technologies", 1))
            .unwrap();

        assert_eq!(store.len(), 1);
        let found = store.get_article("a").await.unwrap().unwrap();
        assert_eq!(found.primary_organization(), "Raytheon Technologies");
        assert!(store.get_article("zzz").await.unwrap().is_none());
    }

    #[test]
    fn test_directory_resolves_aliases() {
        let directory = MemoryOrganizationDirectory::default();

        let org = tokio_test::block_on(directory.get_by_name("Pentagon"))
            .unwrap()
            .unwrap();
        assert_eq!(org.name, "US War Department");
        assert!(tokio_test::block_on(directory.get_by_name("Boeing"))
            .unwrap()
            .is_none());
    }
}
