//! TTL cache for generated article summaries.
//!
//! Entries expire lazily on read and are also swept by a background task so
//! the map does not grow without bound. All access goes through one
//! `RwLock`; the lock is never held across an await point.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::types::summary::{CacheStats, CachedSummary, SummaryContent};

/// Concurrent map from article id to cached summary.
pub struct SummaryCache {
    entries: RwLock<HashMap<String, CachedSummary>>,
    clock: Arc<dyn Clock>,
}

impl Default for SummaryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SummaryCache {
    /// Create an empty cache on the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty cache on a custom clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    fn read(&self) -> Option<RwLockReadGuard<'_, HashMap<String, CachedSummary>>> {
        match self.entries.read() {
            Ok(guard) => Some(guard),
            Err(_) => {
                warn!("summary cache lock poisoned");
                None
            }
        }
    }

    fn write(&self) -> Option<RwLockWriteGuard<'_, HashMap<String, CachedSummary>>> {
        match self.entries.write() {
            Ok(guard) => Some(guard),
            Err(_) => {
                warn!("summary cache lock poisoned");
                None
            }
        }
    }

    /// Get a live entry.
    ///
    /// An expired entry is removed and reported as a miss.
    pub fn get(&self, article_id: &str) -> Option<CachedSummary> {
        let now = self.clock.now();

        {
            let entries = self.read()?;
            match entries.get(article_id) {
                None => return None,
                Some(entry) if !entry.is_expired(now) => return Some(entry.clone()),
                Some(_) => {}
            }
        }

        let mut entries = self.write()?;
        // Re-check under the write lock; a concurrent set may have refreshed it
        if entries
            .get(article_id)
            .is_some_and(|entry| entry.is_expired(now))
        {
            entries.remove(article_id);
            debug!(article_id, "evicted expired summary");
            return None;
        }
        entries.get(article_id).cloned()
    }

    /// Insert or replace the entry for `article_id`, valid for `ttl`.
    pub fn set(&self, article_id: &str, content: SummaryContent, ttl: Duration) -> CachedSummary {
        let cached_at = self.clock.now();
        let entry = CachedSummary {
            article_id: article_id.to_string(),
            original_title: content.original_title,
            summary: content.summary,
            source_url: content.source_url,
            cached_at,
            expires_at: expiry(cached_at, ttl),
        };

        if let Some(mut entries) = self.write() {
            entries.insert(article_id.to_string(), entry.clone());
        }
        entry
    }

    /// Remove the entry for `article_id`, if any.
    pub fn delete(&self, article_id: &str) -> bool {
        self.write()
            .map(|mut entries| entries.remove(article_id).is_some())
            .unwrap_or(false)
    }

    /// Remove every entry.
    pub fn clear(&self) {
        if let Some(mut entries) = self.write() {
            entries.clear();
        }
    }

    /// Current entry counts.
    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        let Some(entries) = self.read() else {
            return CacheStats::default();
        };

        let expired = entries.values().filter(|e| e.is_expired(now)).count();
        CacheStats {
            total_entries: entries.len(),
            active_entries: entries.len() - expired,
            expired_entries: expired,
        }
    }

    /// Remove every expired entry and return how many were dropped.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let Some(mut entries) = self.write() else {
            return 0;
        };

        let before = entries.len();
        entries.retain(|_, e| !e.is_expired(now));
        before - entries.len()
    }

    /// Run [`sweep_expired`](Self::sweep_expired) every `interval` until
    /// `cancel` fires.
    pub fn spawn_sweeper(
        self: Arc<Self>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!("summary cache sweeper stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        let removed = self.sweep_expired();
                        if removed > 0 {
                            debug!(removed, "swept expired summaries");
                        }
                    }
                }
            }
        })
    }
}

fn expiry(cached_at: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| cached_at.checked_add_signed(ttl))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ManualClock;

    fn content(title: &str) -> SummaryContent {
        SummaryContent {
            original_title: title.to_string(),
            summary: format!("Digest of {}", title),
            source_url: "https://example.com/a".to_string(),
        }
    }

    #[test]
    fn test_set_then_get() {
        let cache = SummaryCache::new();
        cache.set("a1", content("RTX Q3"), Duration::from_secs(60));

        let entry = cache.get("a1").unwrap();
        assert_eq!(entry.original_title, "RTX Q3");
        assert!(entry.expires_at > entry.cached_at);
        assert!(cache.get("missing").is_none());
    }

    #[test]
    fn test_expired_entry_is_evicted_on_read() {
        let clock = Arc::new(ManualClock::new());
        let cache = SummaryCache::with_clock(clock.clone());
        cache.set("a1", content("RTX Q3"), Duration::from_secs(60));

        clock.advance(Duration::from_secs(59));
        assert!(cache.get("a1").is_some());

        clock.advance(Duration::from_secs(1));
        assert!(cache.get("a1").is_none());
        assert_eq!(cache.stats().total_entries, 0);
    }

    #[test]
    fn test_stats_and_sweep() {
        let clock = Arc::new(ManualClock::new());
        let cache = SummaryCache::with_clock(clock.clone());
        cache.set("short", content("a"), Duration::from_secs(10));
        cache.set("long", content("b"), Duration::from_secs(1000));

        clock.advance(Duration::from_secs(30));
        assert_eq!(
            cache.stats(),
            CacheStats {
                total_entries: 2,
                active_entries: 1,
                expired_entries: 1,
            }
        );

        assert_eq!(cache.sweep_expired(), 1);
        assert_eq!(cache.stats().total_entries, 1);
        assert!(cache.get("long").is_some());
    }

    #[test]
    fn test_delete_and_clear() {
        let cache = SummaryCache::new();
        cache.set("a", content("a"), Duration::from_secs(60));
        cache.set("b", content("b"), Duration::from_secs(60));

        assert!(cache.delete("a"));
        assert!(!cache.delete("a"));

        cache.clear();
        assert_eq!(cache.stats(), CacheStats::default());
    }

    #[test]
    fn test_huge_ttl_saturates() {
        let cache = SummaryCache::new();
        let entry = cache.set("a", content("a"), Duration::from_secs(u64::MAX));
        assert_eq!(entry.expires_at, DateTime::<Utc>::MAX_UTC);
    }

    #[tokio::test]
    async fn test_sweeper_stops_on_cancel() {
        let cache = Arc::new(SummaryCache::new());
        let cancel = CancellationToken::new();
        let handle = cache
            .clone()
            .spawn_sweeper(Duration::from_millis(10), cancel.clone());

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_sweeper_evicts_expired_entries_without_reads() {
        let clock = Arc::new(ManualClock::new());
        let cache = Arc::new(SummaryCache::with_clock(clock.clone()));
        cache.set("a", content("a"), Duration::from_secs(10));
        clock.advance(Duration::from_secs(60));

        let cancel = CancellationToken::new();
        let handle = cache
            .clone()
            .spawn_sweeper(Duration::from_millis(10), cancel.clone());
        tokio::time::sleep(Duration::from_millis(60)).await;

        assert_eq!(cache.stats().total_entries, 0);

        cancel.cancel();
        handle.await.unwrap();
    }
}
