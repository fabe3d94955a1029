//! Tunables for the question-answering pipeline.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Token and temperature settings for one kind of generation call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationSettings {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl GenerationSettings {
    pub const fn new(max_tokens: u32, temperature: f32) -> Self {
        Self {
            max_tokens,
            temperature,
        }
    }
}

/// Configuration for the briefing pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BriefingConfig {
    /// Articles fetched per store query. Default: 20.
    pub retrieval_page_size: usize,

    /// Local evidence kept after ranking. Default: 10.
    pub local_top_k: usize,

    /// Lookback when the question names no time window. Default: 90 days.
    pub default_lookback_days: i64,

    /// Concurrent per-organization store queries. Default: 4.
    pub retrieval_concurrency: usize,

    /// Minimum local evidence count for the local-evidence strategy. Default: 3.
    pub min_local_evidence: usize,

    /// Minimum mean local relevance for the local-evidence strategy. Default: 0.6.
    pub min_mean_relevance: f64,

    /// Web results kept after ranking. Default: 5.
    pub web_top_k: usize,

    /// Web results newer than this earn a recency bonus. Default: 30 days.
    pub web_recency_days: i64,

    /// Bound on every external call. Default: 10 seconds.
    #[serde(with = "secs")]
    pub external_timeout: Duration,

    /// How long a generated summary stays valid. Default: 24 hours.
    #[serde(with = "secs")]
    pub summary_ttl: Duration,

    /// Interval between background cache sweeps. Default: 5 minutes.
    #[serde(with = "secs")]
    pub cache_sweep_interval: Duration,

    /// Confidence assigned to direct-knowledge answers. Default: 0.7.
    pub direct_knowledge_confidence: f64,

    pub analysis: GenerationSettings,
    pub synthesis: GenerationSettings,
    pub direct_knowledge: GenerationSettings,
    pub summarization: GenerationSettings,
}

impl Default for BriefingConfig {
    fn default() -> Self {
        Self {
            retrieval_page_size: 20,
            local_top_k: 10,
            default_lookback_days: 90,
            retrieval_concurrency: 4,
            min_local_evidence: 3,
            min_mean_relevance: 0.6,
            web_top_k: 5,
            web_recency_days: 30,
            external_timeout: Duration::from_secs(10),
            summary_ttl: Duration::from_secs(24 * 60 * 60),
            cache_sweep_interval: Duration::from_secs(5 * 60),
            direct_knowledge_confidence: 0.7,
            analysis: GenerationSettings::new(200, 0.1),
            synthesis: GenerationSettings::new(500, 0.3),
            direct_knowledge: GenerationSettings::new(300, 0.3),
            summarization: GenerationSettings::new(300, 0.2),
        }
    }
}

impl BriefingConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-call timeout.
    pub fn with_external_timeout(mut self, timeout: Duration) -> Self {
        self.external_timeout = timeout;
        self
    }

    /// Set the summary TTL.
    pub fn with_summary_ttl(mut self, ttl: Duration) -> Self {
        self.summary_ttl = ttl;
        self
    }

    /// Set the cache sweep interval.
    pub fn with_cache_sweep_interval(mut self, interval: Duration) -> Self {
        self.cache_sweep_interval = interval;
        self
    }

    /// Set the per-organization retrieval concurrency (at least 1).
    pub fn with_retrieval_concurrency(mut self, concurrency: usize) -> Self {
        self.retrieval_concurrency = concurrency.max(1);
        self
    }
}

mod secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}
