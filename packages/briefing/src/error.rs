//! Typed errors for the briefing library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling. The server maps these
//! onto HTTP responses.

use thiserror::Error;

/// Boxed error source shared by the collaborator variants.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while answering a question or summarising an article.
#[derive(Debug, Error)]
pub enum BriefingError {
    /// Question rejected before any external call was made
    #[error("invalid question: {reason}")]
    InvalidQuestion { reason: String },

    /// Query analysis could not reach the language model
    #[error("query analysis failed: {0}")]
    Analysis(#[source] Box<BriefingError>),

    /// Final answer generation failed
    #[error("answer synthesis failed: {0}")]
    Synthesis(#[source] Box<BriefingError>),

    /// Language model transport or API error
    #[error("language model error: {0}")]
    LanguageModel(#[source] BoxError),

    /// A single search provider failed
    #[error("search provider {provider} failed: {source}")]
    Search {
        provider: String,
        #[source]
        source: BoxError,
    },

    /// Question is not about the tracked organizations or their domain
    #[error("question is not about a tracked organization")]
    OutOfScope,

    /// Article lookup for summarisation missed
    #[error("article not found: {id}")]
    ArticleNotFound { id: String },

    /// Evidence store or organization directory failed
    #[error("storage error: {0}")]
    Store(#[source] BoxError),

    /// An external call exceeded its time budget
    #[error("timed out: {operation}")]
    Timeout { operation: String },

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl BriefingError {
    /// Create a language model error from any displayable cause.
    pub fn language_model(message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self::LanguageModel(message.into())
    }

    /// Create a search error for a named provider.
    pub fn search(provider: impl Into<String>, message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self::Search {
            provider: provider.into(),
            source: message.into(),
        }
    }

    /// Create a storage error from any displayable cause.
    pub fn store(message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self::Store(message.into())
    }

    /// Whether the caller supplied bad input (as opposed to a service failure).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidQuestion { .. } | Self::OutOfScope | Self::ArticleNotFound { .. }
        )
    }

    /// Message safe to show to an end user.
    ///
    /// Fatal failures collapse into one generic message; input problems get
    /// a specific, actionable one.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidQuestion { reason } => format!("invalid question: {}", reason),
            Self::OutOfScope => {
                "this question is not about any of the tracked organizations; \
                 ask about one of them or their industry"
                    .to_string()
            }
            Self::ArticleNotFound { .. } => "article not found".to_string(),
            _ => "failed to process query".to_string(),
        }
    }
}

/// Result type alias for briefing operations.
pub type Result<T> = std::result::Result<T, BriefingError>;
