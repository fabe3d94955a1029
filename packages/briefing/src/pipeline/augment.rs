//! Web augmentation: search, filter and rank external results.
//!
//! Every configured provider receives the same enhanced query. A failing
//! provider is logged and left out; if all of them fail the caller simply
//! gets an empty list and falls back further.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::bounded;
use super::scope::{Eligibility, DOMAIN_TERMS};
use crate::clock::Clock;
use crate::error::{BriefingError, Result};
use crate::text::{contains_any_term, host_of};
use crate::traits::searcher::{SearchProvider, WebSearchResult};
use crate::types::config::BriefingConfig;
use crate::types::evidence::{sort_by_relevance, EvidenceItem};
use crate::types::organization::Organization;
use crate::types::query::Question;

/// Outlets whose reporting earns a credibility bonus.
pub const CREDIBLE_DOMAINS: &[&str] = &[
    "defensenews.com",
    "janes.com",
    "aviationweek.com",
    "flightglobal.com",
    "breakingdefense.com",
    "reuters.com",
    "bloomberg.com",
    "wsj.com",
    "ft.com",
    "cnn.com",
    "bbc.com",
    "bbc.co.uk",
    "npr.org",
    "politico.com",
    "thehill.com",
    "defense.gov",
    "war.gov",
    "navy.mil",
    "af.mil",
    "army.mil",
    "marines.mil",
];

/// Generic terms that tie a result to the tracked industry.
const DOMAIN_VARIANTS: &[&str] = &[
    "corporation",
    "company",
    "technologies",
    "martin",
];

const QUALIFIER_TERMS: &str = "defense aerospace industry";

const TITLE_MATCH: f64 = 0.4;
const SNIPPET_MATCH: f64 = 0.2;
const ORGANIZATION_MENTION: f64 = 0.3;
const CREDIBLE_SOURCE: f64 = 0.2;
const RECENT: f64 = 0.1;

/// Fetches and ranks web evidence for in-scope questions.
pub struct KnowledgeAugmenter {
    providers: Vec<Arc<dyn SearchProvider>>,
    eligibility: Arc<Eligibility>,
    roster: Arc<[Organization]>,
    clock: Arc<dyn Clock>,
    config: BriefingConfig,
}

impl KnowledgeAugmenter {
    pub fn new(
        providers: Vec<Arc<dyn SearchProvider>>,
        eligibility: Arc<Eligibility>,
        roster: Arc<[Organization]>,
        clock: Arc<dyn Clock>,
        config: BriefingConfig,
    ) -> Self {
        Self {
            providers,
            eligibility,
            roster,
            clock,
            config,
        }
    }

    /// Names of the configured providers.
    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    /// Search the web for evidence about `question`.
    ///
    /// Fails with [`BriefingError::OutOfScope`] if the question is not about
    /// the tracked organizations or their industry; no provider is called
    /// in that case.
    pub async fn augment(
        &self,
        question: &Question,
        organizations: &[String],
    ) -> Result<Vec<EvidenceItem>> {
        if !self
            .eligibility
            .is_in_scope(question.text(), organizations)
            .await
        {
            return Err(BriefingError::OutOfScope);
        }

        let targets = self.target_organizations(question.text(), organizations);
        let query = enhance_query(question.text(), &targets);

        let raw = self.search_all(&query).await;
        let fetched = raw.len();

        let now = self.clock.now();
        let question_lower = question.text().to_lowercase();
        let mut evidence: Vec<EvidenceItem> = raw
            .into_iter()
            .filter(|r| is_relevant(r, &self.roster))
            .map(|r| {
                let score = score_result(
                    &r,
                    &question_lower,
                    &targets,
                    now,
                    self.config.web_recency_days,
                );
                EvidenceItem::from_web(r.title, r.url, r.snippet, r.source, r.published_at, score)
            })
            .collect();

        sort_by_relevance(&mut evidence);
        evidence.truncate(self.config.web_top_k);

        info!(
            query = %query,
            fetched,
            kept = evidence.len(),
            "web augmentation complete"
        );
        Ok(evidence)
    }

    /// Roster entries named by the caller or mentioned in the question.
    fn target_organizations(&self, question: &str, organizations: &[String]) -> Vec<Organization> {
        let lower = question.to_lowercase();
        self.roster
            .iter()
            .filter(|o| {
                o.is_mentioned_in(&lower)
                    || organizations.iter().any(|name| o.is_named(name))
            })
            .cloned()
            .collect()
    }

    async fn search_all(&self, query: &str) -> Vec<WebSearchResult> {
        let timeout = self.config.external_timeout;
        let searches = self.providers.iter().map(|provider| async move {
            let outcome = bounded(timeout, "web search", provider.search(query)).await;
            (provider.name().to_string(), outcome)
        });

        let mut results = Vec::new();
        for (provider, outcome) in join_all(searches).await {
            match outcome {
                Ok(found) => {
                    debug!(provider = %provider, count = found.len(), "provider returned results");
                    results.extend(found);
                }
                Err(e) => warn!(provider = %provider, error = %e, "search provider failed"),
            }
        }
        results
    }
}

/// Append canonical organization names and, unless the question already
/// uses industry vocabulary, generic qualifier terms.
pub fn enhance_query(question: &str, targets: &[Organization]) -> String {
    let lower = question.to_lowercase();
    let mut enhanced = question.trim().to_string();

    for organization in targets {
        if !lower.contains(&organization.name.to_lowercase()) {
            enhanced.push(' ');
            enhanced.push_str(&organization.name);
        }
    }

    if !contains_any_term(&lower, DOMAIN_TERMS) {
        enhanced.push(' ');
        enhanced.push_str(QUALIFIER_TERMS);
    }

    enhanced
}

/// Permissive relevance filter.
///
/// A result is dropped only when it has text and that text mentions no
/// tracked organization and no industry term.
pub fn is_relevant(result: &WebSearchResult, roster: &[Organization]) -> bool {
    let text = format!("{} {}", result.title, result.snippet).to_lowercase();
    if text.trim().is_empty() {
        return true;
    }

    roster.iter().any(|o| o.is_mentioned_in(&text))
        || contains_any_term(&text, DOMAIN_TERMS)
        || contains_any_term(&text, DOMAIN_VARIANTS)
}

/// Whether a URL belongs to a credible outlet (subdomains included).
pub fn is_credible_source(url: &str) -> bool {
    host_of(url).is_some_and(|host| {
        CREDIBLE_DOMAINS
            .iter()
            .any(|domain| host == *domain || host.ends_with(&format!(".{}", domain)))
    })
}

/// Raw relevance of a web result, before clamping.
pub fn score_result(
    result: &WebSearchResult,
    question_lower: &str,
    targets: &[Organization],
    now: DateTime<Utc>,
    recency_days: i64,
) -> f64 {
    let title = result.title.to_lowercase();
    let snippet = result.snippet.to_lowercase();
    let text = format!("{} {}", title, snippet);
    let question = question_lower.trim();

    let mut score = 0.0;
    if !question.is_empty() && title.contains(question) {
        score += TITLE_MATCH;
    }
    if !question.is_empty() && snippet.contains(question) {
        score += SNIPPET_MATCH;
    }

    score += ORGANIZATION_MENTION
        * targets.iter().filter(|o| o.is_mentioned_in(&text)).count() as f64;

    if is_credible_source(&result.url) {
        score += CREDIBLE_SOURCE;
    }

    if let Some(published) = result.published_at {
        if published <= now && now - published < ChronoDuration::days(recency_days) {
            score += RECENT;
        }
    }

    score
}
