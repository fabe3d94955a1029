//! Language model trait for generation calls.
//!
//! The pipeline issues exactly two prompt shapes: a structured analysis
//! prompt (JSON expected, low temperature) and free-form generation for
//! answers and article digests. Implementations wrap a specific provider
//! and only need to turn a [`CompletionRequest`] into text.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::config::GenerationSettings;

/// What a generation call is for.
///
/// Providers may ignore this; mocks use it to script replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompletionPurpose {
    Analysis,
    Synthesis,
    DirectKnowledge,
    Summarization,
}

/// Output contract requested from the model.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseFormat {
    /// Free-form text
    Text,

    /// JSON matching a schema; the model may still deviate from it
    JsonSchema {
        name: String,
        schema: serde_json::Value,
    },
}

/// A single generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub purpose: CompletionPurpose,
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub response_format: ResponseFormat,
}

impl CompletionRequest {
    /// Create a free-form request.
    pub fn new(
        purpose: CompletionPurpose,
        system: impl Into<String>,
        user: impl Into<String>,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            purpose,
            system: system.into(),
            user: user.into(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            response_format: ResponseFormat::Text,
        }
    }

    /// Ask for JSON matching `schema`.
    pub fn with_json_schema(mut self, name: impl Into<String>, schema: serde_json::Value) -> Self {
        self.response_format = ResponseFormat::JsonSchema {
            name: name.into(),
            schema,
        };
        self
    }
}

/// Generative language service.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Run one generation call and return the raw text of the first choice.
    async fn complete(&self, request: CompletionRequest) -> Result<String>;

    /// Model identifier, for logs.
    fn model_name(&self) -> &str {
        "unknown"
    }
}
