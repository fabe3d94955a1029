//! Evidence - the unified shape of local articles and web results.
//!
//! Everything the synthesizer sees is an [`EvidenceItem`], so it never needs
//! to know where a piece of material came from beyond the origin tag used
//! to group the prompt context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::article::Article;

/// Where a piece of evidence came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "origin", rename_all = "snake_case")]
pub enum EvidenceOrigin {
    /// A stored news article
    Local {
        article_id: String,
        organization: String,
    },

    /// A live web search result
    Web {
        /// Source label (outlet or provider)
        source: String,
    },
}

/// A normalized unit of supporting material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceItem {
    #[serde(flatten)]
    pub origin: EvidenceOrigin,

    pub title: String,

    /// Article summary or search snippet
    pub summary: String,

    pub url: String,
    pub published_at: Option<DateTime<Utc>>,

    /// Always within [0, 1]
    relevance: f64,
}

impl EvidenceItem {
    /// Evidence from a stored article with a computed relevance.
    pub fn from_article(article: &Article, relevance: f64) -> Self {
        Self {
            origin: EvidenceOrigin::Local {
                article_id: article.id.clone(),
                organization: article.primary_organization().to_string(),
            },
            title: article.title.clone(),
            summary: article.summary.clone(),
            url: article.source_url.clone(),
            published_at: Some(article.published_at),
            relevance: clamp_relevance(relevance),
        }
    }

    /// Evidence from a web result with a computed relevance.
    pub fn from_web(
        title: impl Into<String>,
        url: impl Into<String>,
        snippet: impl Into<String>,
        source: impl Into<String>,
        published_at: Option<DateTime<Utc>>,
        relevance: f64,
    ) -> Self {
        Self {
            origin: EvidenceOrigin::Web {
                source: source.into(),
            },
            title: title.into(),
            summary: snippet.into(),
            url: url.into(),
            published_at,
            relevance: clamp_relevance(relevance),
        }
    }

    /// Relevance score in [0, 1].
    pub fn relevance(&self) -> f64 {
        self.relevance
    }

    pub fn is_local(&self) -> bool {
        matches!(self.origin, EvidenceOrigin::Local { .. })
    }

    pub fn is_web(&self) -> bool {
        matches!(self.origin, EvidenceOrigin::Web { .. })
    }
}

/// Clamp a raw score into [0, 1]; NaN collapses to 0.
pub fn clamp_relevance(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

/// Stable sort by relevance, highest first.
///
/// Ties keep their incoming order.
pub fn sort_by_relevance(items: &mut [EvidenceItem]) {
    items.sort_by(|a, b| {
        b.relevance
            .partial_cmp(&a.relevance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Mean relevance, or 0 for an empty slice.
pub fn mean_relevance<'a>(items: impl IntoIterator<Item = &'a EvidenceItem>) -> f64 {
    let (sum, count) = items
        .into_iter()
        .fold((0.0, 0usize), |(s, c), e| (s + e.relevance, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
