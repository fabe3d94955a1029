//! Answer synthesis and confidence scoring.

use std::sync::Arc;
use tracing::debug;

use super::bounded;
use super::prompts::{format_synthesis_prompt, DIRECT_KNOWLEDGE_PROMPT};
use crate::error::{BriefingError, Result};
use crate::traits::ai::{CompletionPurpose, CompletionRequest, LanguageModel};
use crate::types::config::BriefingConfig;
use crate::types::evidence::{clamp_relevance, mean_relevance, EvidenceItem};
use crate::types::response::ResponseStrategy;

const BASE_CONFIDENCE: f64 = 0.5;
const LOCAL_MEAN_WEIGHT: f64 = 0.2;
const WEB_MEAN_WEIGHT: f64 = 0.1;

/// Produces the final answer from selected evidence.
pub struct ResponseSynthesizer {
    model: Arc<dyn LanguageModel>,
    config: BriefingConfig,
}

impl ResponseSynthesizer {
    pub fn new(model: Arc<dyn LanguageModel>, config: BriefingConfig) -> Self {
        Self { model, config }
    }

    /// Generate an answer and its confidence.
    ///
    /// `DirectKnowledge` ignores `evidence` and uses the background-knowledge
    /// instruction. A failed generation call fails with
    /// [`BriefingError::Synthesis`].
    pub async fn synthesize(
        &self,
        question: &str,
        evidence: &[EvidenceItem],
        strategy: ResponseStrategy,
    ) -> Result<(String, f64)> {
        let (request, confidence) = match strategy {
            ResponseStrategy::DirectKnowledge => (
                CompletionRequest::new(
                    CompletionPurpose::DirectKnowledge,
                    DIRECT_KNOWLEDGE_PROMPT,
                    question,
                    self.config.direct_knowledge,
                ),
                self.config.direct_knowledge_confidence,
            ),
            _ => (
                CompletionRequest::new(
                    CompletionPurpose::Synthesis,
                    format_synthesis_prompt(evidence),
                    question,
                    self.config.synthesis,
                ),
                score_confidence(evidence),
            ),
        };

        let answer = bounded(
            self.config.external_timeout,
            "answer synthesis",
            self.model.complete(request),
        )
        .await
        .map_err(|e| BriefingError::Synthesis(Box::new(e)))?;

        debug!(strategy = %strategy, confidence, "answer synthesized");
        Ok((answer.trim().to_string(), clamp_relevance(confidence)))
    }
}

fn local_count_bonus(count: usize) -> f64 {
    match count {
        n if n >= 5 => 0.3,
        n if n >= 3 => 0.2,
        n if n >= 1 => 0.1,
        _ => 0.0,
    }
}

fn web_count_bonus(count: usize) -> f64 {
    match count {
        n if n >= 5 => 0.15,
        n if n >= 3 => 0.1,
        n if n >= 1 => 0.05,
        _ => 0.0,
    }
}

/// Confidence for an evidence-backed answer, in [0, 1].
pub fn score_confidence(evidence: &[EvidenceItem]) -> f64 {
    let local: Vec<&EvidenceItem> = evidence.iter().filter(|e| e.is_local()).collect();
    let web: Vec<&EvidenceItem> = evidence.iter().filter(|e| e.is_web()).collect();

    let score = BASE_CONFIDENCE
        + local_count_bonus(local.len())
        + web_count_bonus(web.len())
        + LOCAL_MEAN_WEIGHT * mean_relevance(local.iter().copied())
        + WEB_MEAN_WEIGHT * mean_relevance(web.iter().copied());

    clamp_relevance(score)
}
