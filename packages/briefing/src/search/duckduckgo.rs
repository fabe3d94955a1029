//! DuckDuckGo instant answer API.
//!
//! Needs no key but returns topic summaries rather than ranked web pages,
//! so results are thin. Useful as a zero-configuration fallback.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::{http_client, transport_error, truncate_chars};
use crate::error::{BriefingError, Result};
use crate::traits::searcher::{SearchProvider, WebSearchResult};

const NAME: &str = "DuckDuckGo";
const ENDPOINT: &str = "https://api.duckduckgo.com/";
const TITLE_CHARS: usize = 100;

/// DuckDuckGo-backed search provider.
pub struct DuckDuckGoSearchProvider {
    client: reqwest::Client,
}

impl DuckDuckGoSearchProvider {
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Response {
    #[serde(default)]
    heading: String,
    #[serde(default, rename = "Abstract")]
    abstract_text: String,
    #[serde(default)]
    abstract_source: String,
    #[serde(default, rename = "AbstractURL")]
    abstract_url: String,
    #[serde(default)]
    related_topics: Vec<Topic>,
}

/// A related topic, or a named group of them.
#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Topic {
    #[serde(default)]
    text: String,
    #[serde(default, rename = "FirstURL")]
    first_url: String,
    #[serde(default)]
    topics: Vec<Topic>,
}

fn collect_topics(topics: Vec<Topic>, out: &mut Vec<WebSearchResult>) {
    for topic in topics {
        if !topic.text.is_empty() {
            out.push(WebSearchResult::new(
                truncate_chars(&topic.text, TITLE_CHARS),
                topic.first_url,
                topic.text,
                NAME,
            ));
        }
        collect_topics(topic.topics, out);
    }
}

fn parse_response(body: &str) -> Result<Vec<WebSearchResult>> {
    let response: Response = serde_json::from_str(body)?;

    let mut results = Vec::new();
    collect_topics(response.related_topics, &mut results);

    if results.is_empty() && !response.abstract_text.is_empty() {
        let source = if response.abstract_source.is_empty() {
            NAME.to_string()
        } else {
            response.abstract_source
        };
        results.push(WebSearchResult::new(
            response.heading,
            response.abstract_url,
            response.abstract_text,
            source,
        ));
    }

    Ok(results)
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearchProvider {
    fn name(&self) -> &str {
        NAME
    }

    async fn search(&self, query: &str) -> Result<Vec<WebSearchResult>> {
        let response = self
            .client
            .get(ENDPOINT)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_related_topics_become_results() {
        let long_text = format!("Lockheed Martin {}", "x".repeat(200));
        let body = format!(
            r#"{{
                "Heading": "Lockheed Martin",
                "Abstract": "",
                "RelatedTopics": [
                    {{"Text": "{}", "FirstURL": "https://duckduckgo.com/Lockheed_Martin"}},
                    {{"Name": "Subsidiaries", "Topics": [
                        {{"Text": "Sikorsky - helicopter maker", "FirstURL": "https://duckduckgo.com/Sikorsky"}}
                    ]}}
                ]
            }}"#,
            long_text
        );

        let results = parse_response(&body).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title.chars().count(), TITLE_CHARS);
        assert_eq!(results[0].snippet, long_text);
        assert_eq!(results[1].url, "https://duckduckgo.com/Sikorsky");
    }

    #[test]
    fn test_abstract_fallback() {
        let body = r#"{
            "Heading": "RTX Corporation",
            "Abstract": "RTX Corporation is an American aerospace and defense conglomerate.",
            "AbstractSource": "Wikipedia",
            "AbstractURL": "https://en.wikipedia.org/wiki/RTX_Corporation",
            "RelatedTopics": []
        }"#;

        let results = parse_response(body).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "RTX Corporation");
        assert_eq!(results[0].source, "Wikipedia");
    }

    #[test]
    fn test_empty_answer() {
        assert!(parse_response("{}").unwrap().is_empty());
    }
}
