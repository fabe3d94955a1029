//! Stored news articles and the filter used to list them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{BriefingError, Result};

/// Maximum page size a store will serve in one listing.
pub const MAX_PAGE_SIZE: usize = 1000;

/// A news article about one or more tracked organizations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub source_url: String,

    /// Canonical names of the organizations this article is about
    #[serde(default)]
    pub organizations: Vec<String>,

    pub published_at: DateTime<Utc>,

    /// Ingest-time relevance (0.0-1.0)
    pub relevance_score: f64,

    #[serde(default)]
    pub feed_source: String,

    /// Full body, when the feed provided one
    #[serde(default)]
    pub content: Option<String>,
}

impl Article {
    /// Create an article with a fresh id, published now.
    pub fn new(
        title: impl Into<String>,
        summary: impl Into<String>,
        source_url: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            summary: summary.into(),
            source_url: source_url.into(),
            organizations: Vec::new(),
            published_at: Utc::now(),
            relevance_score: 0.5,
            feed_source: String::new(),
            content: None,
        }
    }

    /// Set the id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Tag with an organization.
    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organizations.push(organization.into());
        self
    }

    /// Set the publish date.
    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = published_at;
        self
    }

    /// Set the stored relevance, clamped to [0, 1].
    pub fn with_relevance(mut self, relevance: f64) -> Self {
        self.relevance_score = relevance.clamp(0.0, 1.0);
        self
    }

    /// Set the body.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Primary organization, or `"Unknown"` for untagged articles.
    pub fn primary_organization(&self) -> &str {
        self.organizations
            .first()
            .map(|s| s.as_str())
            .unwrap_or("Unknown")
    }

    /// Whether this article is tagged with `organization` (case-insensitive).
    pub fn is_about(&self, organization: &str) -> bool {
        self.organizations
            .iter()
            .any(|o| o.eq_ignore_ascii_case(organization))
    }
}

/// Filter for listing articles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleFilter {
    /// Only articles tagged with this organization
    pub organization: Option<String>,

    /// Only articles published at or after this instant
    pub start_date: Option<DateTime<Utc>>,

    /// Only articles published at or before this instant
    pub end_date: Option<DateTime<Utc>>,

    /// Only articles with at least this stored relevance
    pub min_relevance: Option<f64>,

    pub limit: usize,
    pub offset: usize,
}

impl ArticleFilter {
    /// Create a filter returning at most `limit` articles.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit,
            ..Default::default()
        }
    }

    /// Scope to one organization.
    pub fn for_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    /// Set the date range.
    pub fn between(mut self, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    /// Set the minimum stored relevance.
    pub fn with_min_relevance(mut self, min: f64) -> Self {
        self.min_relevance = Some(min);
        self
    }

    /// Reject filters no store should have to interpret.
    pub fn validate(&self) -> Result<()> {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(BriefingError::store("filter start date is after end date"));
            }
        }
        if let Some(min) = self.min_relevance {
            if !(0.0..=1.0).contains(&min) {
                return Err(BriefingError::store(format!(
                    "filter min_relevance {} outside [0, 1]",
                    min
                )));
            }
        }
        if self.limit > MAX_PAGE_SIZE {
            return Err(BriefingError::store(format!(
                "filter limit {} exceeds {}",
                self.limit, MAX_PAGE_SIZE
            )));
        }
        Ok(())
    }

    /// Whether an article passes every predicate (ignores paging).
    pub fn matches(&self, article: &Article) -> bool {
        if let Some(org) = &self.organization {
            if !article.is_about(org) {
                return false;
            }
        }
        if let Some(start) = self.start_date {
            if article.published_at < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if article.published_at > end {
                return false;
            }
        }
        if let Some(min) = self.min_relevance {
            if article.relevance_score < min {
                return false;
            }
        }
        true
    }
}
