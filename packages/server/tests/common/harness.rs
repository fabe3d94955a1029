use std::sync::Arc;

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use briefing::testing::{MockLanguageModel, MockSearchProvider};
use briefing::{Article, Briefing, MemoryArticleStore, WebSearchResult};
use serde_json::Value;
use server_core::server::{router, AppState};
use tower::ServiceExt;

/// Router over a briefing service built from mocks and an in-memory store.
pub struct TestHarness {
    pub app: Router,
    pub model: Arc<MockLanguageModel>,
    pub provider: Arc<MockSearchProvider>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_parts(
            MockLanguageModel::new(),
            MockSearchProvider::new("mock").with_results(vec![founder_result()]),
            sample_articles(),
        )
    }

    pub fn with_parts(
        model: MockLanguageModel,
        provider: MockSearchProvider,
        articles: Vec<Article>,
    ) -> Self {
        let model = Arc::new(model);
        let provider = Arc::new(provider);
        let briefing = Briefing::builder(
            model.clone(),
            Arc::new(MemoryArticleStore::with_articles(articles)),
        )
        .with_provider(provider.clone())
        .build();

        Self {
            app: router(AppState::new(briefing)),
            model,
            provider,
        }
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.post_raw(uri, body.to_string()).await
    }

    pub async fn post_raw(&self, uri: &str, body: impl Into<String>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.into()))
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }
}

/// Six well-scored RTX articles, enough to answer locally.
pub fn sample_articles() -> Vec<Article> {
    (1..=6)
        .map(|i| {
            Article::new(
                format!("RTX quarterly earnings beat estimates ({})", i),
                "Revenue grew on missile and engine demand",
                format!("https://www.rtx.com/news/{}", i),
            )
            .with_id(format!("rtx-{}", i))
            .with_organization("Raytheon Technologies")
            .with_relevance(0.85)
        })
        .collect()
}

pub fn founder_result() -> WebSearchResult {
    WebSearchResult::new(
        "Raytheon history: founders and early years",
        "https://www.reuters.com/business/aerospace-defense/raytheon-history",
        "Raytheon was founded in 1922 by Laurence Marshall and Vannevar Bush.",
        "reuters.com",
    )
}
