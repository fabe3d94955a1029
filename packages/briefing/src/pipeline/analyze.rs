//! Query analysis: one structured model call with a heuristic fallback.
//!
//! The model's reply is treated as untrusted text. Each field is read on its
//! own; anything missing or malformed is filled in from keyword heuristics
//! over the raw question, so a garbled reply still yields a usable analysis.
//! Only a failed call (transport error or timeout) is fatal.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::bounded;
use super::prompts::format_analysis_prompt;
use crate::clock::Clock;
use crate::error::{BriefingError, Result};
use crate::text::{contains_any_term, contains_term};
use crate::traits::ai::{CompletionPurpose, CompletionRequest, LanguageModel};
use crate::types::config::GenerationSettings;
use crate::types::organization::{mentioned_in, resolve_name, Organization};
use crate::types::query::{QueryAnalysis, QueryType, Question, TimeWindow};

const FINANCIAL_TERMS: &[&str] = &[
    "quarter",
    "quarterly",
    "earnings",
    "revenue",
    "revenues",
    "financial",
    "profit",
    "sales",
    "guidance",
    "stock",
    "perform",
    "performance",
];

const CONTRACT_TERMS: &[&str] = &["contract", "contracts", "award", "awarded", "deal", "deals"];

const COMPARISON_TERMS: &[&str] = &["compare", "comparison", "versus", "vs", "vs."];

const NEWS_TERMS: &[&str] = &["news", "latest", "recent", "update", "updates", "announced"];

const STOPWORDS: &[&str] = &[
    "about", "after", "also", "been", "before", "being", "could", "does", "from", "have",
    "into", "more", "most", "much", "other", "over", "should", "some", "than", "that", "their",
    "them", "then", "there", "these", "they", "this", "those", "were", "what", "when", "where",
    "which", "while", "will", "with", "would", "your",
];

/// Shape the model is asked to produce.
#[derive(JsonSchema)]
#[allow(dead_code)] // only used to derive the response schema
struct AnalysisReply {
    query_type: Option<String>,
    company_names: Option<Vec<String>>,
    keywords: Option<Vec<String>>,
    time_window: Option<String>,
    search_terms: Option<Vec<String>>,
}

fn analysis_schema() -> Value {
    let mut schema = serde_json::to_value(schemars::schema_for!(AnalysisReply)).unwrap_or_default();
    if let Some(object) = schema.as_object_mut() {
        object.remove("$schema");
        object.remove("title");
    }
    schema
}

/// Turns a question into a [`QueryAnalysis`].
pub struct QueryAnalyzer {
    model: Arc<dyn LanguageModel>,
    roster: Arc<[Organization]>,
    clock: Arc<dyn Clock>,
    settings: GenerationSettings,
    timeout: Duration,
}

impl QueryAnalyzer {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        roster: Arc<[Organization]>,
        clock: Arc<dyn Clock>,
        settings: GenerationSettings,
        timeout: Duration,
    ) -> Self {
        Self {
            model,
            roster,
            clock,
            settings,
            timeout,
        }
    }

    /// Analyze a validated question.
    ///
    /// Fails with [`BriefingError::Analysis`] if the model call fails.
    pub async fn analyze(&self, question: &Question) -> Result<QueryAnalysis> {
        let request = CompletionRequest::new(
            CompletionPurpose::Analysis,
            format_analysis_prompt(&self.roster),
            question.text(),
            self.settings,
        )
        .with_json_schema("query_analysis", analysis_schema());

        let raw = bounded(self.timeout, "query analysis", self.model.complete(request))
            .await
            .map_err(|e| BriefingError::Analysis(Box::new(e)))?;

        let reply = match parse_reply(&raw) {
            Some(reply) => reply,
            None => {
                warn!(reply = %raw, "unparseable analysis reply, using heuristics");
                Value::Null
            }
        };

        let analysis = build_analysis(&reply, question.text(), &self.roster, self.clock.now());
        debug!(
            query_type = %analysis.query_type,
            organizations = ?analysis.organizations,
            period = ?analysis.time_window.as_ref().and_then(|w| w.period.as_deref()),
            "query analyzed"
        );
        Ok(analysis)
    }
}

/// Pull a JSON object out of a model reply.
///
/// Tolerates code fences and chatter around the object.
pub fn parse_reply(raw: &str) -> Option<Value> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }

    serde_json::from_str::<Value>(&raw[start..=end])
        .ok()
        .filter(Value::is_object)
}

/// Heuristic-only analysis of a question.
pub fn heuristic_analysis(
    text: &str,
    roster: &[Organization],
    now: DateTime<Utc>,
) -> QueryAnalysis {
    build_analysis(&Value::Null, text, roster, now)
}

/// Combine a (possibly empty) model reply with heuristics.
///
/// A keyword-detected query type wins over the model's label; organizations
/// are the union of roster mentions and model names that resolve against
/// the roster.
pub fn build_analysis(
    reply: &Value,
    text: &str,
    roster: &[Organization],
    now: DateTime<Utc>,
) -> QueryAnalysis {
    let lower = text.to_lowercase();

    let query_type = classify_by_heuristics(&lower)
        .or_else(|| string_field(reply, "query_type").and_then(|l| QueryType::parse(&l)))
        .unwrap_or(QueryType::General);

    let mut organizations: Vec<String> = mentioned_in(roster, text)
        .into_iter()
        .map(str::to_string)
        .collect();
    for name in string_list(reply, "company_names").unwrap_or_default() {
        match resolve_name(roster, &name) {
            Some(canonical) => {
                if !organizations.iter().any(|o| o == canonical) {
                    organizations.push(canonical.to_string());
                }
            }
            None => debug!(name = %name, "dropping untracked organization from analysis"),
        }
    }

    let keywords = string_list(reply, "keywords").unwrap_or_else(|| extract_keywords(&lower));
    let search_terms = string_list(reply, "search_terms").unwrap_or_else(|| keywords.clone());

    let time_window = string_field(reply, "time_window")
        .and_then(|label| TimeWindow::for_period(&label, now))
        .or_else(|| detect_time_window(&lower, now));

    QueryAnalysis {
        query_type,
        organizations,
        keywords,
        time_window,
        search_terms,
    }
}

/// Classify a lowercase question by keywords.
///
/// Returns `None` when nothing matches.
pub fn classify_by_heuristics(lower: &str) -> Option<QueryType> {
    if contains_any_term(lower, FINANCIAL_TERMS) {
        Some(QueryType::Financial)
    } else if contains_any_term(lower, CONTRACT_TERMS) {
        Some(QueryType::Contracts)
    } else if contains_any_term(lower, COMPARISON_TERMS) {
        Some(QueryType::Comparison)
    } else if contains_any_term(lower, NEWS_TERMS) {
        Some(QueryType::News)
    } else {
        None
    }
}

fn detect_time_window(lower: &str, now: DateTime<Utc>) -> Option<TimeWindow> {
    let period = if contains_term(lower, "this quarter") {
        "this_quarter"
    } else if contains_term(lower, "this year") {
        "this_year"
    } else if contains_term(lower, "this month") {
        "this_month"
    } else if contains_any_term(lower, &["recent", "recently", "latest"]) {
        "recent"
    } else {
        return None;
    };

    TimeWindow::for_period(period, now)
}

fn extract_keywords(lower: &str) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for word in lower.split(|c: char| !c.is_alphanumeric()) {
        if word.chars().count() > 3
            && !STOPWORDS.contains(&word)
            && !keywords.iter().any(|k| k == word)
        {
            keywords.push(word.to_string());
        }
    }
    keywords
}

fn string_field(reply: &Value, key: &str) -> Option<String> {
    reply
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("null"))
        .map(str::to_string)
}

/// A list of strings, accepting a bare string as a one-element list.
fn string_list(reply: &Value, key: &str) -> Option<Vec<String>> {
    let items: Vec<String> = match reply.get(key)? {
        Value::Array(values) => values
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Value::String(s) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => return None,
    };

    (!items.is_empty()).then_some(items)
}
