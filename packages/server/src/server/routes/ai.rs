use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use briefing::{
    ArticleSummary, BriefingError, CacheStats, EvidenceItem, QueryAnalysis, QueryResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::server::app::AppState;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub question: String,

    /// Organizations the caller says the question is about
    #[serde(default, alias = "company_context", alias = "companies")]
    pub organizations: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct WebSearchResponse {
    pub question: String,
    pub organizations: Vec<String>,
    pub results: Vec<EvidenceItem>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct CacheStatsResponse {
    pub cache_stats: CacheStats,
    pub timestamp: DateTime<Utc>,
}

/// JSON error body: `{ "error": <status text>, "message": <detail> }`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

/// Error returned by the AI handlers
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<BriefingError> for ApiError {
    fn from(err: BriefingError) -> Self {
        let status = match &err {
            BriefingError::InvalidQuestion { .. } => StatusCode::BAD_REQUEST,
            BriefingError::ArticleNotFound { .. } => StatusCode::NOT_FOUND,
            BriefingError::OutOfScope => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %err, "Request failed");
        } else {
            tracing::debug!(error = %err, "Request rejected");
        }

        Self::new(status, err.user_message())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::warn!(error = %rejection, "Invalid JSON in request");
        Self::new(StatusCode::BAD_REQUEST, "invalid JSON format")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self
                .status
                .canonical_reason()
                .unwrap_or("Error")
                .to_string(),
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

/// POST /ai/query
pub async fn query_handler(
    Extension(state): Extension<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, ApiError> {
    let Json(request) = payload?;

    tracing::info!(
        question = %request.question,
        organizations = ?request.organizations,
        "Processing AI query"
    );

    let response = state
        .briefing
        .process_query(&request.question, request.organizations)
        .await?;

    Ok(Json(response))
}

/// POST /ai/analyze
pub async fn analyze_handler(
    Extension(state): Extension<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<QueryAnalysis>, ApiError> {
    let Json(request) = payload?;
    let analysis = state.briefing.analyze(&request.question).await?;
    Ok(Json(analysis))
}

/// POST /ai/web-search
pub async fn web_search_handler(
    Extension(state): Extension<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<WebSearchResponse>, ApiError> {
    let Json(request) = payload?;

    tracing::info!(
        question = %request.question,
        organizations = ?request.organizations,
        "Processing web search"
    );

    let results = state
        .briefing
        .search_web(&request.question, request.organizations.clone())
        .await?;

    Ok(Json(WebSearchResponse {
        question: request.question,
        organizations: request.organizations,
        count: results.len(),
        results,
    }))
}

/// GET /ai/summarise/:article_id
pub async fn summarise_handler(
    Extension(state): Extension<AppState>,
    Path(article_id): Path<String>,
) -> Result<Json<ArticleSummary>, ApiError> {
    if article_id.trim().is_empty() {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "article ID is required",
        ));
    }

    let summary = state.briefing.summarize_article(&article_id).await?;
    Ok(Json(summary))
}

/// GET /ai/cache/stats
pub async fn cache_stats_handler(
    Extension(state): Extension<AppState>,
) -> Json<CacheStatsResponse> {
    Json(CacheStatsResponse {
        cache_stats: state.briefing.cache_stats(),
        timestamp: Utc::now(),
    })
}
