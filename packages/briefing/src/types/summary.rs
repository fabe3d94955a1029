//! Article summaries and cache bookkeeping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Generated digest content, before it is stamped by the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryContent {
    pub original_title: String,
    pub summary: String,
    pub source_url: String,
}

/// A cached article digest.
///
/// Only the summary cache creates or mutates these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedSummary {
    pub article_id: String,
    pub original_title: String,
    pub summary: String,
    pub source_url: String,
    pub cached_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CachedSummary {
    /// Whether the entry is past its expiry at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Response for a summarisation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleSummary {
    pub article_id: String,
    pub original_title: String,
    pub summary: String,
    pub source_url: String,

    #[serde(rename = "processing_time_ms", with = "super::duration_ms")]
    pub processing_time: Duration,

    /// Whether this came from the cache rather than a fresh generation
    pub cached: bool,
}

impl ArticleSummary {
    pub fn from_cached(entry: CachedSummary, processing_time: Duration, cached: bool) -> Self {
        Self {
            article_id: entry.article_id,
            original_title: entry.original_title,
            summary: entry.summary,
            source_url: entry.source_url,
            processing_time,
            cached,
        }
    }
}

/// Entry counts reported by the summary cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub active_entries: usize,
    pub expired_entries: usize,
}
