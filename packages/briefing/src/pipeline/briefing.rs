//! The briefing service: wires the pipeline stages together.
//!
//! # Example
//!
//! ```rust,ignore
//! use briefing::{Briefing, MemoryArticleStore};
//! use briefing::ai::OpenAI;
//! use briefing::search::DuckDuckGoSearchProvider;
//!
//! let briefing = Briefing::builder(Arc::new(OpenAI::from_env()?), Arc::new(MemoryArticleStore::new()))
//!     .with_provider(Arc::new(DuckDuckGoSearchProvider::new(Duration::from_secs(10))?))
//!     .build();
//!
//! let response = briefing.process_query("How did RTX perform this quarter?", vec![]).await?;
//! println!("{} ({:.2})", response.answer, response.confidence);
//! ```

use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::analyze::QueryAnalyzer;
use super::augment::KnowledgeAugmenter;
use super::bounded;
use super::gate::ConfidenceGate;
use super::prompts::{format_summarize_input, SUMMARIZE_PROMPT};
use super::retrieve::{merge_organizations, ContextRetriever};
use super::scope::Eligibility;
use super::synthesize::ResponseSynthesizer;
use crate::cache::SummaryCache;
use crate::clock::{Clock, SystemClock};
use crate::error::{BriefingError, Result};
use crate::stores::MemoryOrganizationDirectory;
use crate::traits::ai::{CompletionPurpose, CompletionRequest, LanguageModel};
use crate::traits::searcher::SearchProvider;
use crate::traits::store::{ArticleStore, OrganizationDirectory};
use crate::types::config::BriefingConfig;
use crate::types::evidence::EvidenceItem;
use crate::types::organization::{resolve_name, Organization};
use crate::types::query::{QueryAnalysis, Question};
use crate::types::response::{QueryResponse, ResponseStrategy};
use crate::types::summary::{ArticleSummary, CacheStats, SummaryContent};

/// Question answering over tracked-organization news.
///
/// Stateless across requests apart from the summary cache; share one
/// instance behind an `Arc`.
pub struct Briefing {
    analyzer: QueryAnalyzer,
    retriever: ContextRetriever,
    gate: ConfidenceGate,
    eligibility: Arc<Eligibility>,
    augmenter: KnowledgeAugmenter,
    synthesizer: ResponseSynthesizer,
    model: Arc<dyn LanguageModel>,
    store: Arc<dyn ArticleStore>,
    cache: Arc<SummaryCache>,
    roster: Arc<[Organization]>,
    config: BriefingConfig,
}

impl Briefing {
    /// Start building a service around a language model and article store.
    pub fn builder(
        model: Arc<dyn LanguageModel>,
        store: Arc<dyn ArticleStore>,
    ) -> BriefingBuilder {
        BriefingBuilder::new(model, store)
    }

    /// Answer a question.
    ///
    /// Invalid input is rejected before any external call. Analysis and
    /// synthesis failures are fatal; retrieval and search failures degrade.
    pub async fn process_query(
        &self,
        question: &str,
        organization_hints: Vec<String>,
    ) -> Result<QueryResponse> {
        let started = Instant::now();
        let question = Question::new(question, organization_hints)?;

        let analysis = self.analyzer.analyze(&question).await?;

        // Stored articles are tagged with canonical names
        let hints = self.canonical_names(question.organization_hints());
        let organizations = merge_organizations(&analysis.organizations, &hints);

        // Unscoped retrieval ignores the question text, so it cannot vouch for scope
        if organizations.is_empty()
            && !self
                .eligibility
                .is_in_scope(question.text(), &organizations)
                .await
        {
            return Ok(self.refusal(&question, &organizations, started));
        }

        let local = self.retriever.retrieve(&analysis, &hints).await;

        let in_scope = self.gate.is_sufficient(&local)
            || self
                .eligibility
                .is_in_scope(question.text(), &organizations)
                .await;

        let (strategy, sources) = match self.gate.decide(&local, in_scope) {
            ResponseStrategy::LocalEvidence => (ResponseStrategy::LocalEvidence, local),
            ResponseStrategy::WebAugmented => {
                match self.augmenter.augment(&question, &organizations).await {
                    Ok(web) if !web.is_empty() => {
                        let mut sources = local;
                        sources.extend(web);
                        (ResponseStrategy::WebAugmented, sources)
                    }
                    Ok(_) => {
                        debug!(
                            local_items = local.len(),
                            "web search found nothing, falling back to direct knowledge"
                        );
                        (ResponseStrategy::DirectKnowledge, Vec::new())
                    }
                    Err(BriefingError::OutOfScope) => {
                        return Ok(self.refusal(&question, &organizations, started));
                    }
                    Err(e) => {
                        warn!(
                            error = %e,
                            "web augmentation failed, falling back to direct knowledge"
                        );
                        (ResponseStrategy::DirectKnowledge, Vec::new())
                    }
                }
            }
            ResponseStrategy::DirectKnowledge => (ResponseStrategy::DirectKnowledge, Vec::new()),
            ResponseStrategy::Refused => {
                return Ok(self.refusal(&question, &organizations, started));
            }
        };

        let (answer, confidence) = self
            .synthesizer
            .synthesize(question.text(), &sources, strategy)
            .await?;

        let response = QueryResponse {
            answer,
            sources,
            strategy,
            confidence,
            processing_time: started.elapsed(),
            organizations_referenced: self.canonical_names(&organizations),
        };

        info!(
            question = %question.text(),
            strategy = %response.strategy,
            confidence = response.confidence,
            sources_used = response.sources.len(),
            duration_ms = response.processing_time.as_millis() as u64,
            "query processed"
        );
        Ok(response)
    }

    /// Analyze a question without answering it.
    pub async fn analyze(&self, question: &str) -> Result<QueryAnalysis> {
        let question = Question::new(question, Vec::new())?;
        self.analyzer.analyze(&question).await
    }

    /// Run web augmentation on its own.
    ///
    /// Fails with [`BriefingError::OutOfScope`] for out-of-scope questions.
    pub async fn search_web(
        &self,
        question: &str,
        organizations: Vec<String>,
    ) -> Result<Vec<EvidenceItem>> {
        let question = Question::new(question, organizations)?;
        self.augmenter
            .augment(&question, question.organization_hints())
            .await
    }

    /// Summarise a stored article, generating only on a cache miss.
    pub async fn summarize_article(&self, article_id: &str) -> Result<ArticleSummary> {
        let started = Instant::now();
        let article_id = article_id.trim();

        if let Some(entry) = self.cache.get(article_id) {
            debug!(article_id, "summary cache hit");
            return Ok(ArticleSummary::from_cached(entry, started.elapsed(), true));
        }

        let article = bounded(
            self.config.external_timeout,
            "article lookup",
            self.store.get_article(article_id),
        )
        .await?
        .ok_or_else(|| BriefingError::ArticleNotFound {
            id: article_id.to_string(),
        })?;

        let request = CompletionRequest::new(
            CompletionPurpose::Summarization,
            SUMMARIZE_PROMPT,
            format_summarize_input(&article),
            self.config.summarization,
        );
        let summary = bounded(
            self.config.external_timeout,
            "article summary",
            self.model.complete(request),
        )
        .await?;

        let entry = self.cache.set(
            article_id,
            SummaryContent {
                original_title: article.title,
                summary: summary.trim().to_string(),
                source_url: article.source_url,
            },
            self.config.summary_ttl,
        );

        info!(
            article_id,
            duration_ms = started.elapsed().as_millis() as u64,
            "article summarised"
        );
        Ok(ArticleSummary::from_cached(entry, started.elapsed(), false))
    }

    /// Summary cache entry counts.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// The summary cache, for explicit invalidation.
    pub fn cache(&self) -> &Arc<SummaryCache> {
        &self.cache
    }

    /// Start the periodic cache sweep; it stops when `cancel` fires.
    pub fn spawn_cache_sweeper(&self, cancel: CancellationToken) -> JoinHandle<()> {
        self.cache
            .clone()
            .spawn_sweeper(self.config.cache_sweep_interval, cancel)
    }

    /// Tracked organizations.
    pub fn roster(&self) -> &[Organization] {
        &self.roster
    }

    pub fn config(&self) -> &BriefingConfig {
        &self.config
    }

    fn refusal(
        &self,
        question: &Question,
        organizations: &[String],
        started: Instant,
    ) -> QueryResponse {
        let tracked = self
            .roster
            .iter()
            .map(|o| o.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        info!(question = %question.text(), "question refused as out of scope");
        QueryResponse {
            answer: format!(
                "I can only answer questions about the organizations I track ({}) \
                 and the defense and aerospace industry. Please ask about one of them.",
                tracked
            ),
            sources: Vec::new(),
            strategy: ResponseStrategy::Refused,
            confidence: 0.0,
            processing_time: started.elapsed(),
            organizations_referenced: self.canonical_names(organizations),
        }
    }

    fn canonical_names(&self, organizations: &[String]) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for name in organizations {
            let canonical = resolve_name(&self.roster, name).unwrap_or(name.as_str());
            if !names.iter().any(|n| n.eq_ignore_ascii_case(canonical)) {
                names.push(canonical.to_string());
            }
        }
        names
    }
}

/// Builder for [`Briefing`].
pub struct BriefingBuilder {
    model: Arc<dyn LanguageModel>,
    store: Arc<dyn ArticleStore>,
    directory: Option<Arc<dyn OrganizationDirectory>>,
    providers: Vec<Arc<dyn SearchProvider>>,
    cache: Option<Arc<SummaryCache>>,
    clock: Arc<dyn Clock>,
    roster: Vec<Organization>,
    config: BriefingConfig,
}

impl BriefingBuilder {
    pub fn new(model: Arc<dyn LanguageModel>, store: Arc<dyn ArticleStore>) -> Self {
        Self {
            model,
            store,
            directory: None,
            providers: Vec::new(),
            cache: None,
            clock: Arc::new(SystemClock),
            roster: Organization::default_roster(),
            config: BriefingConfig::default(),
        }
    }

    /// Use a custom organization directory (default: the roster in memory).
    pub fn with_directory(mut self, directory: Arc<dyn OrganizationDirectory>) -> Self {
        self.directory = Some(directory);
        self
    }

    /// Add a web search provider.
    pub fn with_provider(mut self, provider: Arc<dyn SearchProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Use an existing summary cache (default: a fresh cache on the builder's clock).
    pub fn with_cache(mut self, cache: Arc<SummaryCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the tracked organizations.
    pub fn with_roster(mut self, roster: Vec<Organization>) -> Self {
        self.roster = roster;
        self
    }

    pub fn with_config(mut self, config: BriefingConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Briefing {
        let roster: Arc<[Organization]> = self.roster.into();
        let directory = self.directory.unwrap_or_else(|| {
            Arc::new(MemoryOrganizationDirectory::new(roster.to_vec()))
        });
        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(SummaryCache::with_clock(self.clock.clone())));
        let timeout = self.config.external_timeout;

        let eligibility = Arc::new(Eligibility::new(roster.clone(), directory, timeout));

        Briefing {
            analyzer: QueryAnalyzer::new(
                self.model.clone(),
                roster.clone(),
                self.clock.clone(),
                self.config.analysis,
                timeout,
            ),
            retriever: ContextRetriever::new(
                self.store.clone(),
                self.clock.clone(),
                self.config.clone(),
            ),
            gate: ConfidenceGate::from_config(&self.config),
            eligibility: eligibility.clone(),
            augmenter: KnowledgeAugmenter::new(
                self.providers,
                eligibility,
                roster.clone(),
                self.clock,
                self.config.clone(),
            ),
            synthesizer: ResponseSynthesizer::new(self.model.clone(), self.config.clone()),
            model: self.model,
            store: self.store,
            cache,
            roster,
            config: self.config,
        }
    }
}
