//! Question-answering pipeline - the core of the library.
//!
//! The pipeline orchestrates:
//! - Query analysis (model-assisted, heuristic fallback)
//! - Local evidence retrieval and ranking
//! - Strategy selection (local evidence, web search, direct knowledge, refusal)
//! - Web augmentation with permissive filtering and credibility ranking
//! - Answer synthesis with confidence scoring
//! - Cached article summarisation

pub mod analyze;
pub mod augment;
pub mod briefing;
pub mod gate;
pub mod prompts;
pub mod retrieve;
pub mod scope;
pub mod synthesize;

pub use analyze::{build_analysis, classify_by_heuristics, heuristic_analysis, QueryAnalyzer};
pub use augment::{enhance_query, is_credible_source, is_relevant, score_result, KnowledgeAugmenter};
pub use briefing::{Briefing, BriefingBuilder};
pub use gate::ConfidenceGate;
pub use retrieve::{merge_organizations, rank, score_article, ContextRetriever};
pub use scope::Eligibility;
pub use synthesize::{score_confidence, ResponseSynthesizer};

use std::future::Future;
use std::time::Duration;

use crate::error::{BriefingError, Result};

/// Run an external call with a time limit.
///
/// Elapsing maps to [`BriefingError::Timeout`], which callers handle the
/// same way as a transport error.
pub(crate) async fn bounded<T, F>(limit: Duration, operation: &str, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(BriefingError::Timeout {
            operation: operation.to_string(),
        }),
    }
}
