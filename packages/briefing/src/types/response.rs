//! Strategy selection and the final response.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::evidence::EvidenceItem;

/// How evidence was sourced for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStrategy {
    /// Stored articles were sufficient
    LocalEvidence,

    /// Local evidence was thin, web search filled in
    WebAugmented,

    /// No evidence at all; the model answers from background knowledge
    DirectKnowledge,

    /// Out of scope; a fixed refusal with zero confidence
    Refused,
}

impl ResponseStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LocalEvidence => "local_evidence",
            Self::WebAugmented => "web_augmented",
            Self::DirectKnowledge => "direct_knowledge",
            Self::Refused => "refused",
        }
    }
}

impl std::fmt::Display for ResponseStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Answer returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,

    /// Evidence handed to the synthesizer, in ranked order
    pub sources: Vec<EvidenceItem>,

    pub strategy: ResponseStrategy,

    /// Heuristic support score in [0, 1]
    pub confidence: f64,

    #[serde(rename = "processing_time_ms", with = "super::duration_ms")]
    pub processing_time: Duration,

    pub organizations_referenced: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_serializes_duration_in_millis() {
        let response = QueryResponse {
            answer: "n/a".into(),
            sources: vec![],
            strategy: ResponseStrategy::Refused,
            confidence: 0.0,
            processing_time: Duration::from_millis(1500),
            organizations_referenced: vec![],
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["processing_time_ms"], 1500);
        assert_eq!(json["strategy"], "refused");

        let back: QueryResponse = serde_json::from_value(json).unwrap();
        assert_eq!(back.processing_time, Duration::from_millis(1500));
    }
}
