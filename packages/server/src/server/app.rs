//! Application setup and server configuration.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use briefing::ai::OpenAI;
use briefing::search::{DuckDuckGoSearchProvider, GoogleSearchProvider, TavilySearchProvider};
use briefing::{Briefing, MemoryArticleStore, MemoryOrganizationDirectory, SearchProvider};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::server::routes::{
    analyze_handler, cache_stats_handler, health_handler, query_handler, summarise_handler,
    web_search_handler,
};

/// Upper bound on a whole request; individual external calls have their own limits
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub briefing: Arc<Briefing>,
}

impl AppState {
    pub fn new(briefing: Briefing) -> Self {
        Self {
            briefing: Arc::new(briefing),
        }
    }
}

/// Wire the briefing service from configuration.
///
/// Search providers are enabled by the keys present; seed files populate
/// the in-memory stores.
pub async fn build_briefing(config: &Config) -> Result<Briefing> {
    let mut model = OpenAI::new(config.openai_api_key.expose())
        .with_model(&config.openai_model)
        .with_timeout(config.external_timeout)
        .context("Failed to build OpenAI client")?;
    if let Some(base_url) = &config.openai_base_url {
        model = model.with_base_url(base_url);
    }

    let store = match &config.articles_path {
        Some(path) => MemoryArticleStore::from_json_file(path)
            .await
            .with_context(|| format!("Failed to load articles from {}", path.display()))?,
        None => MemoryArticleStore::new(),
    };
    tracing::info!(articles = store.len(), "Article store ready");

    let mut builder = Briefing::builder(Arc::new(model), Arc::new(store))
        .with_config(config.briefing_config());

    if let Some(path) = &config.organizations_path {
        let directory = MemoryOrganizationDirectory::from_json_file(path)
            .await
            .with_context(|| format!("Failed to load organizations from {}", path.display()))?;
        tracing::info!(
            organizations = directory.organizations().len(),
            "Organization roster loaded"
        );
        builder = builder
            .with_roster(directory.organizations().to_vec())
            .with_directory(Arc::new(directory));
    }

    for provider in search_providers(config)? {
        tracing::info!(provider = provider.name(), "Web search provider enabled");
        builder = builder.with_provider(provider);
    }

    Ok(builder.build())
}

fn search_providers(config: &Config) -> Result<Vec<Arc<dyn SearchProvider>>> {
    let timeout = config.external_timeout;
    let mut providers: Vec<Arc<dyn SearchProvider>> = Vec::new();

    if let Some(key) = &config.tavily_api_key {
        providers.push(Arc::new(
            TavilySearchProvider::new(key.expose(), timeout)
                .context("Failed to build Tavily client")?,
        ));
    }

    if let (Some(key), Some(engine_id)) = (
        &config.google_search_api_key,
        &config.google_search_engine_id,
    ) {
        providers.push(Arc::new(
            GoogleSearchProvider::new(key.expose(), engine_id, timeout)
                .context("Failed to build Google search client")?,
        ));
    }

    if config.enable_duckduckgo {
        providers.push(Arc::new(
            DuckDuckGoSearchProvider::new(timeout).context("Failed to build DuckDuckGo client")?,
        ));
    }

    if providers.is_empty() {
        tracing::warn!(
            "No web search providers configured; thin questions fall back to direct knowledge"
        );
    }
    Ok(providers)
}

/// Routes under `/ai`
fn ai_routes() -> Router {
    Router::new()
        .route("/ai/query", post(query_handler))
        .route("/ai/analyze", post(analyze_handler))
        .route("/ai/web-search", post(web_search_handler))
        .route("/ai/summarise/:article_id", get(summarise_handler))
        .route("/ai/cache/stats", get(cache_stats_handler))
}

/// Bare router with state, no middleware
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(ai_routes())
        .route("/health", get(health_handler))
        .layer(Extension(state))
}

/// Build the Axum application router
///
/// `/ai` routes are rate limited per client IP; `/health` is not.
pub fn build_app(state: AppState, config: &Config) -> Result<Router> {
    // CORS configuration - allow any origin
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    let rate_limit_config = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(config.rate_limit_per_second)
            .burst_size(config.rate_limit_burst)
            .use_headers() // Extract IP from X-Forwarded-For, falling back to the peer address
            .finish()
            .context("Invalid rate limiter configuration")?,
    );

    let rate_limit_layer = GovernorLayer {
        config: rate_limit_config,
    };

    let app = Router::new()
        .merge(ai_routes().layer(rate_limit_layer))
        .route("/health", get(health_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(Extension(state))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(app)
}
