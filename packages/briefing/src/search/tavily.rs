//! Tavily search API.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{http_client, transport_error};
use crate::error::{BriefingError, Result};
use crate::security::SecretString;
use crate::traits::searcher::{SearchProvider, WebSearchResult};

const NAME: &str = "Tavily";
const ENDPOINT: &str = "https://api.tavily.com/search";

/// Tavily-backed search provider.
pub struct TavilySearchProvider {
    api_key: SecretString,
    client: reqwest::Client,
    max_results: usize,
}

impl TavilySearchProvider {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            api_key: SecretString::new(api_key),
            client: http_client(timeout)?,
            max_results: 10,
        })
    }

    /// Set the number of results requested per query.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

#[derive(Serialize)]
struct Request<'a> {
    query: &'a str,
    search_depth: &'a str,
    max_results: usize,
}

#[derive(Deserialize)]
struct Response {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Deserialize)]
struct TavilyResult {
    url: String,
    title: Option<String>,
    content: Option<String>,
    published_date: Option<String>,
}

fn parse_response(body: &str) -> Result<Vec<WebSearchResult>> {
    let response: Response = serde_json::from_str(body)?;

    Ok(response
        .results
        .into_iter()
        .filter(|r| !r.url.is_empty())
        .map(|r| {
            let mut result = WebSearchResult::new(
                r.title.unwrap_or_default(),
                r.url,
                r.content.unwrap_or_default(),
                NAME,
            );
            if let Some(date) = r.published_date.as_deref().and_then(parse_date) {
                result = result.with_published_at(date);
            }
            result
        })
        .collect())
}

/// Tavily reports dates as RFC 3339 or RFC 2822 depending on the source.
fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_rfc2822(raw))
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

#[async_trait]
impl SearchProvider for TavilySearchProvider {
    fn name(&self) -> &str {
        NAME
    }

    async fn search(&self, query: &str) -> Result<Vec<WebSearchResult>> {
        let request = Request {
            query,
            search_depth: "basic",
            max_results: self.max_results,
        };

        let response = self
            .client
            .post(ENDPOINT)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key.expose()))
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(NAME, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BriefingError::search(
                NAME,
                format!("Tavily API error: {}", status),
            ));
        }

        let body = response.text().await.map_err(|e| transport_error(NAME, e))?;
        parse_response(&body)
    }
}
