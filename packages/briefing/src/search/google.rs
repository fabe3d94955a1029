//! Google Custom Search JSON API.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::{http_client, transport_error};
use crate::error::{BriefingError, Result};
use crate::security::SecretString;
use crate::traits::searcher::{SearchProvider, WebSearchResult};

const NAME: &str = "Google";
const ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// Google Custom Search provider.
///
/// Requires an API key and a programmable search engine id. Results are
/// restricted to the past year.
pub struct GoogleSearchProvider {
    api_key: SecretString,
    engine_id: String,
    client: reqwest::Client,
}

impl GoogleSearchProvider {
    pub fn new(
        api_key: impl Into<String>,
        engine_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            api_key: SecretString::new(api_key),
            engine_id: engine_id.into(),
            client: http_client(timeout)?,
        })
    }
}

#[derive(Deserialize)]
struct Response {
    #[serde(default)]
    items: Vec<Item>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Item {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
    display_link: Option<String>,
}

fn parse_response(body: &str) -> Result<Vec<WebSearchResult>> {
    let response: Response = serde_json::from_str(body)?;

    Ok(response
        .items
        .into_iter()
        .filter(|item| !item.link.is_empty())
        .map(|item| {
            let source = item.display_link.unwrap_or_else(|| NAME.to_string());
            WebSearchResult::new(item.title, item.link, item.snippet, source)
        })
        .collect())
}

#[async_trait]
impl SearchProvider for GoogleSearchProvider {
    fn name(&self) -> &str {
        NAME
    }

    async fn search(&self, query: &str) -> Result<Vec<WebSearchResult>> {
        let response = self
            .client
            .get(ENDPOINT)
            .query(&[
                ("key", self.api_key.expose()),
                ("cx", self.engine_id.as_str()),
                ("q", query),
                ("num", "10"),
                ("dateRestrict", "y1"),
            ])
            .send()
            .await
            .map_err(|e| transport_error(NAME, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BriefingError::search(
                NAME,
                format!("search API returned status {}", status),
            ));
        }

        let body = response.text().await.map_err(|e| transport_error(NAME, e))?;
        parse_response(&body)
    }
}
