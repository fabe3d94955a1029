//! Defense Industry Briefing Library
//!
//! Answers natural-language questions about a fixed roster of tracked
//! organizations. Stored news articles are the first source of evidence;
//! when they are thin the library escalates to live web search and finally
//! to the language model's own background knowledge. Questions outside the
//! tracked domain are refused rather than answered.
//!
//! # Pipeline
//!
//! ```text
//! analyze -> retrieve -> gate -+-> synthesize (local evidence)
//!                              +-> augment -> synthesize (web evidence)
//!                              +-> synthesize (direct knowledge)
//!                              +-> refuse
//! ```
//!
//! Analysis and synthesis failures are fatal. Retrieval and search failures
//! degrade to the next strategy. Every external call is time-bounded.
//!
//! # Usage
//!
//! ```rust,ignore
//! use briefing::{Briefing, MemoryArticleStore};
//! use briefing::testing::{MockLanguageModel, MockSearchProvider};
//!
//! let briefing = Briefing::builder(Arc::new(MockLanguageModel::new()), Arc::new(MemoryArticleStore::new()))
//!     .with_provider(Arc::new(MockSearchProvider::new("mock")))
//!     .build();
//!
//! let response = briefing.process_query("Who was the founder of RTX?", vec![]).await?;
//! assert_ne!(response.strategy, ResponseStrategy::Refused);
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Collaborator traits (LanguageModel, SearchProvider, ArticleStore)
//! - [`types`] - Articles, organizations, evidence, responses, config
//! - [`pipeline`] - Analysis, retrieval, gating, augmentation, synthesis
//! - [`cache`] - TTL cache for article summaries
//! - [`stores`] - In-memory article store and organization directory
//! - [`search`] - Tavily, Google and DuckDuckGo providers
//! - [`ai`] - OpenAI language model
//! - [`security`] - Credential handling
//! - [`testing`] - Mock implementations for testing

pub mod ai;
pub mod cache;
pub mod clock;
pub mod error;
pub mod pipeline;
pub mod search;
pub mod security;
pub mod stores;
pub mod testing;
pub mod text;
pub mod traits;
pub mod types;

pub use error::{BriefingError, Result};
pub use traits::{
    ai::{CompletionPurpose, CompletionRequest, LanguageModel, ResponseFormat},
    searcher::{SearchProvider, WebSearchResult},
    store::{ArticleStore, OrganizationDirectory},
};
pub use types::{
    article::{Article, ArticleFilter},
    config::{BriefingConfig, GenerationSettings},
    evidence::{EvidenceItem, EvidenceOrigin},
    organization::{Industry, Organization},
    query::{QueryAnalysis, QueryType, Question, TimeWindow},
    response::{QueryResponse, ResponseStrategy},
    summary::{ArticleSummary, CacheStats, CachedSummary, SummaryContent},
};

pub use cache::SummaryCache;
pub use clock::{Clock, SystemClock};
pub use pipeline::{Briefing, BriefingBuilder};
pub use security::SecretString;
pub use stores::{MemoryArticleStore, MemoryOrganizationDirectory};
