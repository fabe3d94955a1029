//! Property tests for scoring and strategy selection.

use chrono::{Duration, Utc};
use proptest::prelude::*;

use briefing::pipeline::{rank, score_confidence, score_result, ConfidenceGate};
use briefing::{
    Article, EvidenceItem, Organization, QueryType, ResponseStrategy, WebSearchResult,
};

fn query_type() -> impl Strategy<Value = QueryType> {
    prop_oneof![
        Just(QueryType::Financial),
        Just(QueryType::Contracts),
        Just(QueryType::Comparison),
        Just(QueryType::News),
        Just(QueryType::General),
    ]
}

fn evidence(local: &[f64], web: &[f64]) -> Vec<EvidenceItem> {
    let mut items: Vec<EvidenceItem> = local
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let article = Article::new(
                format!("Quarterly earnings {}", i),
                "summary",
                format!("https://example.com/{}", i),
            )
            .with_id(format!("a{}", i))
            .with_organization("Raytheon Technologies");
            EvidenceItem::from_article(&article, *r)
        })
        .collect();
    items.extend(web.iter().map(|r| {
        EvidenceItem::from_web("result", "https://example.com", "snippet", "example", None, *r)
    }));
    items
}

proptest! {
    #[test]
    fn ranked_articles_are_bounded_and_sorted(
        relevances in prop::collection::vec(0.0f64..=1.0, 0..30),
        query_type in query_type(),
        top_k in 0usize..15,
    ) {
        let articles: Vec<Article> = relevances
            .iter()
            .enumerate()
            .map(|(i, r)| {
                Article::new(format!("RTX revenue contract {}", i), "", "https://example.com")
                    .with_id(format!("a{}", i))
                    .with_relevance(*r)
            })
            .collect();

        let ranked = rank(&articles, query_type, top_k);

        prop_assert!(ranked.len() <= top_k);
        prop_assert!(ranked.len() <= articles.len());
        for item in &ranked {
            prop_assert!((0.0..=1.0).contains(&item.relevance()));
        }
        for pair in ranked.windows(2) {
            prop_assert!(pair[0].relevance() >= pair[1].relevance());
        }
    }

    #[test]
    fn web_relevance_is_clamped(
        title in "[a-zA-Z ]{0,40}",
        snippet in "[a-zA-Z ]{0,80}",
        question in "[a-zA-Z ]{0,40}",
        age_days in -5i64..400,
        credible in any::<bool>(),
    ) {
        let now = Utc::now();
        let url = if credible {
            "https://www.reuters.com/article"
        } else {
            "https://blog.example.net/post"
        };
        let result = WebSearchResult::new(
            format!("{} Raytheon Lockheed", title),
            url,
            format!("{} RTX Lockheed Martin", snippet),
            "source",
        )
        .with_published_at(now - Duration::days(age_days));

        let roster = Organization::default_roster();
        let raw = score_result(&result, &question.to_lowercase(), &roster, now, 30);
        let item = EvidenceItem::from_web(
            &result.title,
            &result.url,
            &result.snippet,
            &result.source,
            result.published_at,
            raw,
        );

        prop_assert!(raw >= 0.0);
        prop_assert!((0.0..=1.0).contains(&item.relevance()));
    }

    #[test]
    fn confidence_stays_in_unit_interval(
        local in prop::collection::vec(0.0f64..=1.0, 0..12),
        web in prop::collection::vec(0.0f64..=1.0, 0..8),
    ) {
        let confidence = score_confidence(&evidence(&local, &web));
        prop_assert!((0.0..=1.0).contains(&confidence));
    }

    #[test]
    fn sufficient_evidence_always_answers_locally(
        local in prop::collection::vec(0.0f64..=1.0, 0..10),
        in_scope in any::<bool>(),
    ) {
        let gate = ConfidenceGate::default();
        let items = evidence(&local, &[]);
        let decision = gate.decide(&items, in_scope);

        if gate.is_sufficient(&items) {
            prop_assert_eq!(decision, ResponseStrategy::LocalEvidence);
        } else if in_scope {
            prop_assert_eq!(decision, ResponseStrategy::WebAugmented);
        } else {
            prop_assert_eq!(decision, ResponseStrategy::Refused);
        }
    }
}
