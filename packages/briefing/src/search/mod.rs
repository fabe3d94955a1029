//! Web search provider implementations.
//!
//! Each provider maps one external API onto [`SearchProvider`]. Response
//! parsing is split out from the HTTP call so it can be tested against
//! captured payloads.
//!
//! [`SearchProvider`]: crate::traits::searcher::SearchProvider

mod duckduckgo;
mod google;
mod tavily;

pub use duckduckgo::DuckDuckGoSearchProvider;
pub use google::GoogleSearchProvider;
pub use tavily::TavilySearchProvider;

use std::time::Duration;

use crate::error::{BriefingError, Result};

const USER_AGENT: &str = concat!("briefing/", env!("CARGO_PKG_VERSION"));

/// Build an HTTP client with a per-request timeout.
fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| BriefingError::Config(format!("failed to build HTTP client: {}", e)))
}

/// Map a transport error onto a provider error.
fn transport_error(provider: &str, err: reqwest::Error) -> BriefingError {
    BriefingError::Search {
        provider: provider.to_string(),
        source: Box::new(err),
    }
}

/// First `max` characters of `text`.
fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
