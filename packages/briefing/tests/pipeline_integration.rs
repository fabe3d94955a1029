//! End-to-end tests for the question-answering pipeline.
//!
//! Each test wires a `Briefing` from in-memory stores and mocks, then checks
//! the strategy chosen, the confidence reported and which collaborators
//! were (or were not) called.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use briefing::testing::{ManualClock, MockLanguageModel, MockSearchProvider};
use briefing::{
    Article, ArticleFilter, ArticleStore, Briefing, BriefingConfig, BriefingError,
    CompletionPurpose, MemoryArticleStore, QueryType, ResponseStrategy, WebSearchResult,
};

/// Articles about RTX published now, all with the same stored relevance.
fn rtx_articles(count: usize, relevance: f64) -> Vec<Article> {
    (0..count)
        .map(|i| {
            Article::new(
                format!("RTX quarterly earnings report part {}", i + 1),
                "Sales rose on strong missile demand",
                format!("https://www.rtx.com/news/{}", i + 1),
            )
            .with_id(format!("rtx-{}", i + 1))
            .with_organization("Raytheon Technologies")
            .with_relevance(relevance)
        })
        .collect()
}

fn founder_result() -> WebSearchResult {
    WebSearchResult::new(
        "Raytheon history: founders and early years",
        "https://www.reuters.com/business/aerospace-defense/raytheon-history",
        "Raytheon was founded in 1922 by Laurence Marshall, Vannevar Bush and Charles G. Smith.",
        "reuters.com",
    )
}

struct Fixture {
    briefing: Briefing,
    model: Arc<MockLanguageModel>,
    provider: Arc<MockSearchProvider>,
}

fn fixture(articles: Vec<Article>, model: MockLanguageModel, provider: MockSearchProvider) -> Fixture {
    let model = Arc::new(model);
    let provider = Arc::new(provider);
    let briefing = Briefing::builder(
        model.clone(),
        Arc::new(MemoryArticleStore::with_articles(articles)),
    )
    .with_provider(provider.clone())
    .build();

    Fixture {
        briefing,
        model,
        provider,
    }
}

/// A store that is always down.
struct UnavailableStore;

#[async_trait]
impl ArticleStore for UnavailableStore {
    async fn list_articles(&self, _filter: &ArticleFilter) -> briefing::Result<(Vec<Article>, u64)> {
        Err(BriefingError::store("connection refused"))
    }

    async fn get_article(&self, _id: &str) -> briefing::Result<Option<Article>> {
        Err(BriefingError::store("connection refused"))
    }
}

#[tokio::test]
async fn test_strong_local_evidence_answers_locally() {
    let f = fixture(
        rtx_articles(6, 0.8),
        MockLanguageModel::new(),
        MockSearchProvider::new("web"),
    );

    let response = f
        .briefing
        .process_query("How did RTX perform this quarter?", vec![])
        .await
        .unwrap();

    assert_eq!(response.strategy, ResponseStrategy::LocalEvidence);
    assert!(response.confidence >= 0.7);
    assert!(response.confidence <= 1.0);
    assert_eq!(response.sources.len(), 6);
    assert!(response.sources.iter().all(|s| s.is_local()));
    assert!(response
        .sources
        .iter()
        .any(|s| response.answer.contains(&s.title)));
    assert_eq!(
        response.organizations_referenced,
        vec!["Raytheon Technologies"]
    );

    // Local evidence was enough; no web search
    assert_eq!(f.provider.call_count(), 0);
    assert_eq!(f.model.call_count(CompletionPurpose::Analysis), 1);
    assert_eq!(f.model.call_count(CompletionPurpose::Synthesis), 1);
}

#[tokio::test]
async fn test_missing_local_evidence_escalates_to_web() {
    let f = fixture(
        vec![],
        MockLanguageModel::new(),
        MockSearchProvider::new("web").with_results(vec![founder_result()]),
    );

    let response = f
        .briefing
        .process_query("Who was the founder of RTX?", vec![])
        .await
        .unwrap();

    assert_eq!(response.strategy, ResponseStrategy::WebAugmented);
    assert!(response.confidence > 0.0);
    assert_eq!(response.sources.len(), 1);
    assert!(response.sources[0].is_web());
    assert_eq!(f.provider.call_count(), 1);

    // The alias was expanded to the canonical name for the search
    let queries = f.provider.queries();
    assert!(queries[0].contains("Raytheon Technologies"));
}

#[tokio::test]
async fn test_no_evidence_anywhere_uses_direct_knowledge() {
    let f = fixture(
        vec![],
        MockLanguageModel::new(),
        MockSearchProvider::new("web"),
    );

    let response = f
        .briefing
        .process_query("Who was the founder of RTX?", vec![])
        .await
        .unwrap();

    assert_eq!(response.strategy, ResponseStrategy::DirectKnowledge);
    assert!((response.confidence - 0.7).abs() < 1e-9);
    assert!(response.sources.is_empty());
    assert_eq!(f.model.call_count(CompletionPurpose::DirectKnowledge), 1);
    assert_eq!(f.model.call_count(CompletionPurpose::Synthesis), 0);
}

#[tokio::test]
async fn test_all_providers_failing_falls_back_to_direct_knowledge() {
    let model = Arc::new(MockLanguageModel::new());
    let down_a = Arc::new(MockSearchProvider::new("a").failing());
    let down_b = Arc::new(MockSearchProvider::new("b").failing());

    let briefing = Briefing::builder(model.clone(), Arc::new(MemoryArticleStore::new()))
        .with_provider(down_a.clone())
        .with_provider(down_b.clone())
        .build();

    let response = briefing
        .process_query("Lockheed Martin executive leadership changes", vec![])
        .await
        .unwrap();

    assert_eq!(response.strategy, ResponseStrategy::DirectKnowledge);
    assert!(response.confidence > 0.0);
    assert_eq!(down_a.call_count(), 1);
    assert_eq!(down_b.call_count(), 1);
}

#[tokio::test]
async fn test_partial_provider_failure_keeps_other_results() {
    let model = Arc::new(MockLanguageModel::new());
    let down = Arc::new(MockSearchProvider::new("down").failing());
    let up = Arc::new(MockSearchProvider::new("up").with_results(vec![founder_result()]));

    let briefing = Briefing::builder(model, Arc::new(MemoryArticleStore::new()))
        .with_provider(down)
        .with_provider(up)
        .build();

    let response = briefing
        .process_query("Who was the founder of RTX?", vec![])
        .await
        .unwrap();

    assert_eq!(response.strategy, ResponseStrategy::WebAugmented);
    assert_eq!(response.sources.len(), 1);
}

#[tokio::test]
async fn test_out_of_scope_question_is_refused_without_search() {
    // Plenty of strong stored articles, none of them about the question
    let f = fixture(
        rtx_articles(6, 0.9),
        MockLanguageModel::new(),
        MockSearchProvider::new("web").with_results(vec![founder_result()]),
    );

    let response = f
        .briefing
        .process_query("Best pizza recipes", vec![])
        .await
        .unwrap();

    assert_eq!(response.strategy, ResponseStrategy::Refused);
    assert_eq!(response.confidence, 0.0);
    assert!(response.sources.is_empty());
    assert!(response.answer.contains("Raytheon Technologies"));

    assert_eq!(f.provider.call_count(), 0);
    assert_eq!(f.model.call_count(CompletionPurpose::Synthesis), 0);
    assert_eq!(f.model.call_count(CompletionPurpose::DirectKnowledge), 0);
}

#[tokio::test]
async fn test_organization_hint_brings_question_into_scope() {
    let f = fixture(
        vec![],
        MockLanguageModel::new(),
        MockSearchProvider::new("web").with_results(vec![founder_result()]),
    );

    let response = f
        .briefing
        .process_query("How are they doing?", vec!["RTX".to_string()])
        .await
        .unwrap();

    assert_ne!(response.strategy, ResponseStrategy::Refused);
    assert_eq!(
        response.organizations_referenced,
        vec!["Raytheon Technologies"]
    );
}

#[tokio::test]
async fn test_thin_local_evidence_is_combined_with_web() {
    let f = fixture(
        rtx_articles(1, 0.9),
        MockLanguageModel::new(),
        MockSearchProvider::new("web").with_results(vec![founder_result()]),
    );

    let response = f
        .briefing
        .process_query("Who was the founder of RTX?", vec![])
        .await
        .unwrap();

    assert_eq!(response.strategy, ResponseStrategy::WebAugmented);
    assert_eq!(response.sources.iter().filter(|s| s.is_local()).count(), 1);
    assert_eq!(response.sources.iter().filter(|s| s.is_web()).count(), 1);

    let synthesis = f
        .model
        .calls()
        .into_iter()
        .find(|c| c.purpose == CompletionPurpose::Synthesis)
        .unwrap();
    assert!(synthesis.system.contains("## Local news articles"));
    assert!(synthesis.system.contains("## Web search results"));
}

#[tokio::test]
async fn test_thin_local_evidence_without_web_uses_direct_knowledge() {
    let f = fixture(
        rtx_articles(1, 0.3),
        MockLanguageModel::new(),
        MockSearchProvider::new("web").failing(),
    );

    let response = f
        .briefing
        .process_query("RTX missile programs", vec![])
        .await
        .unwrap();

    assert_eq!(response.strategy, ResponseStrategy::DirectKnowledge);
    assert!(response.sources.is_empty());
    assert!((response.confidence - 0.7).abs() < 1e-9);
    assert_eq!(f.provider.call_count(), 1);
    assert_eq!(f.model.call_count(CompletionPurpose::DirectKnowledge), 1);
    assert_eq!(f.model.call_count(CompletionPurpose::Synthesis), 0);
}

#[tokio::test]
async fn test_thin_local_evidence_with_empty_web_uses_direct_knowledge() {
    let f = fixture(
        rtx_articles(2, 0.9),
        MockLanguageModel::new(),
        MockSearchProvider::new("web"),
    );

    let response = f
        .briefing
        .process_query("RTX missile programs", vec![])
        .await
        .unwrap();

    assert_eq!(response.strategy, ResponseStrategy::DirectKnowledge);
    assert!(response.sources.is_empty());
    assert_eq!(f.provider.call_count(), 1);
}

#[tokio::test]
async fn test_hint_alias_retrieves_canonical_articles() {
    let f = fixture(
        rtx_articles(5, 0.9),
        MockLanguageModel::new(),
        MockSearchProvider::new("web").with_results(vec![founder_result()]),
    );

    let response = f
        .briefing
        .process_query("How are they doing?", vec!["RTX".to_string()])
        .await
        .unwrap();

    assert_eq!(response.strategy, ResponseStrategy::LocalEvidence);
    assert_eq!(response.sources.len(), 5);
    assert!(response.sources.iter().all(|s| s.is_local()));
    assert_eq!(
        response.organizations_referenced,
        vec!["Raytheon Technologies"]
    );
    assert_eq!(f.provider.call_count(), 0);
}

#[tokio::test]
async fn test_store_outage_degrades_to_web() {
    let model = Arc::new(MockLanguageModel::new());
    let provider = Arc::new(MockSearchProvider::new("web").with_results(vec![founder_result()]));

    let briefing = Briefing::builder(model, Arc::new(UnavailableStore))
        .with_provider(provider.clone())
        .build();

    let response = briefing
        .process_query("Who was the founder of RTX?", vec![])
        .await
        .unwrap();

    assert_eq!(response.strategy, ResponseStrategy::WebAugmented);
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn test_question_length_boundary() {
    let f = fixture(vec![], MockLanguageModel::new(), MockSearchProvider::new("web"));

    let exact = "a".repeat(1000);
    assert!(f.briefing.process_query(&exact, vec![]).await.is_ok());
    let calls_after_exact = f.model.total_calls();
    assert!(calls_after_exact > 0);

    let over = "a".repeat(1001);
    let err = f.briefing.process_query(&over, vec![]).await.unwrap_err();
    assert!(matches!(err, BriefingError::InvalidQuestion { .. }));
    assert!(err.is_client_error());

    // Rejected before any external call
    assert_eq!(f.model.total_calls(), calls_after_exact);
    assert_eq!(f.provider.call_count(), 0);
}

#[tokio::test]
async fn test_empty_question_is_rejected() {
    let f = fixture(vec![], MockLanguageModel::new(), MockSearchProvider::new("web"));

    let err = f.briefing.process_query("   ", vec![]).await.unwrap_err();
    assert!(matches!(err, BriefingError::InvalidQuestion { .. }));
    assert_eq!(f.model.total_calls(), 0);
}

#[tokio::test]
async fn test_analysis_failure_is_fatal() {
    let f = fixture(
        rtx_articles(6, 0.9),
        MockLanguageModel::new().failing(CompletionPurpose::Analysis),
        MockSearchProvider::new("web"),
    );

    let err = f
        .briefing
        .process_query("How did RTX perform this quarter?", vec![])
        .await
        .unwrap_err();

    assert!(matches!(err, BriefingError::Analysis(_)));
    assert_eq!(err.user_message(), "failed to process query");
    assert_eq!(f.model.call_count(CompletionPurpose::Synthesis), 0);
    assert_eq!(f.provider.call_count(), 0);
}

#[tokio::test]
async fn test_analysis_timeout_is_fatal() {
    let model = Arc::new(MockLanguageModel::new().with_delay(Duration::from_millis(500)));
    let briefing = Briefing::builder(model, Arc::new(MemoryArticleStore::new()))
        .with_config(BriefingConfig::new().with_external_timeout(Duration::from_millis(20)))
        .build();

    let err = briefing
        .process_query("How did RTX perform this quarter?", vec![])
        .await
        .unwrap_err();

    match err {
        BriefingError::Analysis(inner) => {
            assert!(matches!(*inner, BriefingError::Timeout { .. }))
        }
        other => panic!("expected analysis failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_synthesis_failure_is_fatal() {
    let f = fixture(
        rtx_articles(6, 0.9),
        MockLanguageModel::new().failing(CompletionPurpose::Synthesis),
        MockSearchProvider::new("web"),
    );

    let err = f
        .briefing
        .process_query("How did RTX perform this quarter?", vec![])
        .await
        .unwrap_err();

    assert!(matches!(err, BriefingError::Synthesis(_)));
    assert_eq!(err.user_message(), "failed to process query");
}

#[tokio::test]
async fn test_malformed_analysis_still_yields_usable_analysis() {
    let f = fixture(
        vec![],
        MockLanguageModel::new().with_reply(
            CompletionPurpose::Analysis,
            "Sure! The question is about money. {not json",
        ),
        MockSearchProvider::new("web"),
    );

    let analysis = f
        .briefing
        .analyze("What was Raytheon's revenue this quarter?")
        .await
        .unwrap();

    assert_eq!(analysis.query_type, QueryType::Financial);
    assert_eq!(analysis.organizations, vec!["Raytheon Technologies"]);
    assert_eq!(
        analysis
            .time_window
            .as_ref()
            .and_then(|w| w.period.as_deref()),
        Some("this_quarter")
    );
}

#[tokio::test]
async fn test_model_analysis_is_used_when_valid() {
    let f = fixture(
        vec![],
        MockLanguageModel::new().with_reply(
            CompletionPurpose::Analysis,
            r#"{"query_type": "comparison", "company_names": ["Lockheed Martin", "RTX"], "keywords": ["f-35", "patriot"], "time_window": null, "search_terms": ["F-35 vs Patriot"]}"#,
        ),
        MockSearchProvider::new("web"),
    );

    let analysis = f
        .briefing
        .analyze("How do the two primes stack up?")
        .await
        .unwrap();

    assert_eq!(analysis.query_type, QueryType::Comparison);
    assert_eq!(
        analysis.organizations,
        vec!["Lockheed Martin", "Raytheon Technologies"]
    );
    assert!(analysis.time_window.is_none());
}

#[tokio::test]
async fn test_search_web_rejects_out_of_scope() {
    let f = fixture(
        vec![],
        MockLanguageModel::new(),
        MockSearchProvider::new("web").with_results(vec![founder_result()]),
    );

    let err = f
        .briefing
        .search_web("Best pizza recipes", vec![])
        .await
        .unwrap_err();
    assert!(matches!(err, BriefingError::OutOfScope));
    assert_eq!(f.provider.call_count(), 0);

    let results = f
        .briefing
        .search_web("Who was the founder of RTX?", vec![])
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].relevance() > 0.0);
}

#[tokio::test]
async fn test_summaries_are_cached_within_ttl() {
    let f = fixture(
        rtx_articles(1, 0.9),
        MockLanguageModel::new(),
        MockSearchProvider::new("web"),
    );

    let first = f.briefing.summarize_article("rtx-1").await.unwrap();
    let second = f.briefing.summarize_article("rtx-1").await.unwrap();

    assert!(!first.cached);
    assert!(second.cached);
    assert_eq!(first.summary, second.summary);
    assert_eq!(first.original_title, second.original_title);
    assert_eq!(f.model.call_count(CompletionPurpose::Summarization), 1);

    let stats = f.briefing.cache_stats();
    assert_eq!(stats.total_entries, 1);
    assert_eq!(stats.active_entries, 1);
}

#[tokio::test]
async fn test_expired_summary_is_regenerated() {
    let model = Arc::new(MockLanguageModel::new());
    let clock = Arc::new(ManualClock::new());

    let briefing = Briefing::builder(
        model.clone(),
        Arc::new(MemoryArticleStore::with_articles(rtx_articles(1, 0.9))),
    )
    .with_clock(clock.clone())
    .build();

    briefing.summarize_article("rtx-1").await.unwrap();
    clock.advance(Duration::from_secs(24 * 60 * 60));

    let again = briefing.summarize_article("rtx-1").await.unwrap();
    assert!(!again.cached);
    assert_eq!(model.call_count(CompletionPurpose::Summarization), 2);
}

#[tokio::test]
async fn test_unknown_article_is_not_found() {
    let f = fixture(vec![], MockLanguageModel::new(), MockSearchProvider::new("web"));

    let err = f.briefing.summarize_article("missing").await.unwrap_err();
    assert!(matches!(err, BriefingError::ArticleNotFound { .. }));
    assert_eq!(f.model.total_calls(), 0);
}
