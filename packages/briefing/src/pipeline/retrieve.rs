//! Local evidence retrieval and ranking.

use chrono::Duration as ChronoDuration;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

use super::bounded;
use crate::clock::Clock;
use crate::error::Result;
use crate::text::contains_any_term;
use crate::traits::store::ArticleStore;
use crate::types::article::{Article, ArticleFilter};
use crate::types::config::BriefingConfig;
use crate::types::evidence::{sort_by_relevance, EvidenceItem};
use crate::types::query::{QueryAnalysis, QueryType};

const TITLE_BOOST: f64 = 0.2;
const FINANCIAL_TITLE_TERMS: &[&str] = &["earnings", "quarter", "quarterly", "revenue", "revenues"];
const CONTRACT_TITLE_TERMS: &[&str] = &["contract", "contracts", "award", "awarded", "awards"];

/// Fetches stored articles for an analyzed question and ranks them.
pub struct ContextRetriever {
    store: Arc<dyn ArticleStore>,
    clock: Arc<dyn Clock>,
    config: BriefingConfig,
}

impl ContextRetriever {
    pub fn new(store: Arc<dyn ArticleStore>, clock: Arc<dyn Clock>, config: BriefingConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// Retrieve ranked local evidence.
    ///
    /// Store failures never fail the request: a failed organization query is
    /// skipped, and a failed unscoped query yields no evidence.
    pub async fn retrieve(
        &self,
        analysis: &QueryAnalysis,
        organization_hints: &[String],
    ) -> Vec<EvidenceItem> {
        let organizations = merge_organizations(&analysis.organizations, organization_hints);
        let base = self.base_filter(analysis);

        let articles = if organizations.is_empty() {
            match self.list(base).await {
                Ok(articles) => articles,
                Err(e) => {
                    warn!(error = %e, "unscoped article retrieval failed");
                    Vec::new()
                }
            }
        } else {
            self.fan_out(&organizations, base).await
        };

        let evidence = rank(&articles, analysis.query_type, self.config.local_top_k);
        debug!(
            organizations = ?organizations,
            fetched = articles.len(),
            kept = evidence.len(),
            "local evidence retrieved"
        );
        evidence
    }

    fn base_filter(&self, analysis: &QueryAnalysis) -> ArticleFilter {
        let (start, end) = match &analysis.time_window {
            Some(window) if window.start.is_some() || window.end.is_some() => {
                (window.start, window.end)
            }
            _ => {
                let lookback = ChronoDuration::days(self.config.default_lookback_days);
                (Some(self.clock.now() - lookback), None)
            }
        };

        ArticleFilter::with_limit(self.config.retrieval_page_size).between(start, end)
    }

    async fn list(&self, filter: ArticleFilter) -> Result<Vec<Article>> {
        let (articles, _total) = bounded(
            self.config.external_timeout,
            "article retrieval",
            self.store.list_articles(&filter),
        )
        .await?;
        Ok(articles)
    }

    /// One bounded-concurrency query per organization, joined in order.
    async fn fan_out(&self, organizations: &[String], base: ArticleFilter) -> Vec<Article> {
        let batches: Vec<Vec<Article>> = stream::iter(organizations.iter().cloned())
            .map(|organization| {
                let filter = base.clone().for_organization(organization.clone());
                async move {
                    match self.list(filter).await {
                        Ok(articles) => articles,
                        Err(e) => {
                            warn!(organization = %organization, error = %e, "article retrieval failed, skipping organization");
                            Vec::new()
                        }
                    }
                }
            })
            .buffered(self.config.retrieval_concurrency.max(1))
            .collect()
            .await;

        // An article tagged with several organizations comes back once per tag
        let mut seen = HashSet::new();
        batches
            .into_iter()
            .flatten()
            .filter(|a| seen.insert(a.id.clone()))
            .collect()
    }
}

/// Union of analyzed and hinted organizations, case-insensitively unique.
pub fn merge_organizations(analyzed: &[String], hints: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::new();
    for name in analyzed.iter().chain(hints) {
        let name = name.trim();
        if !name.is_empty() && !merged.iter().any(|m| m.eq_ignore_ascii_case(name)) {
            merged.push(name.to_string());
        }
    }
    merged
}

/// Relevance of an article for a query type.
pub fn score_article(article: &Article, query_type: QueryType) -> f64 {
    let title = article.title.to_lowercase();
    let boost = match query_type {
        QueryType::Financial if contains_any_term(&title, FINANCIAL_TITLE_TERMS) => TITLE_BOOST,
        QueryType::Contracts if contains_any_term(&title, CONTRACT_TITLE_TERMS) => TITLE_BOOST,
        _ => 0.0,
    };
    article.relevance_score + boost
}

/// Score, stable-sort and truncate articles into evidence.
pub fn rank(articles: &[Article], query_type: QueryType, top_k: usize) -> Vec<EvidenceItem> {
    let mut evidence: Vec<EvidenceItem> = articles
        .iter()
        .map(|a| EvidenceItem::from_article(a, score_article(a, query_type)))
        .collect();
    sort_by_relevance(&mut evidence);
    evidence.truncate(top_k);
    evidence
}
