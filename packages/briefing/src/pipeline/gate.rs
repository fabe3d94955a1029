//! Strategy selection.
//!
//! Evidence quality decides between answering locally and escalating; the
//! eligibility check alone decides refusal. Low confidence never refuses.

use crate::types::config::BriefingConfig;
use crate::types::evidence::{mean_relevance, EvidenceItem};
use crate::types::response::ResponseStrategy;

/// Chooses a response strategy from local evidence.
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceGate {
    min_count: usize,
    min_mean_relevance: f64,
}

impl Default for ConfidenceGate {
    fn default() -> Self {
        Self::from_config(&BriefingConfig::default())
    }
}

impl ConfidenceGate {
    pub fn new(min_count: usize, min_mean_relevance: f64) -> Self {
        Self {
            min_count,
            min_mean_relevance,
        }
    }

    pub fn from_config(config: &BriefingConfig) -> Self {
        Self::new(config.min_local_evidence, config.min_mean_relevance)
    }

    /// Whether local evidence alone is enough to answer.
    pub fn is_sufficient(&self, evidence: &[EvidenceItem]) -> bool {
        evidence.len() >= self.min_count && mean_relevance(evidence) >= self.min_mean_relevance
    }

    /// Pick a strategy. `in_scope` is the eligibility verdict for the question.
    pub fn decide(&self, evidence: &[EvidenceItem], in_scope: bool) -> ResponseStrategy {
        if self.is_sufficient(evidence) {
            ResponseStrategy::LocalEvidence
        } else if in_scope {
            ResponseStrategy::WebAugmented
        } else {
            ResponseStrategy::Refused
        }
    }
}
