use axum::{extract::Extension, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::server::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    timestamp: DateTime<Utc>,
    organizations: usize,
    cached_summaries: usize,
}

/// Health check endpoint
///
/// The service has no external dependencies it can probe cheaply, so this
/// reports liveness plus a few in-memory counts.
pub async fn health_handler(Extension(state): Extension<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        organizations: state.briefing.roster().len(),
        cached_summaries: state.briefing.cache_stats().active_entries,
    })
}
