//! Questions and their structured analysis.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{BriefingError, Result};

/// Longest question accepted, in characters.
pub const MAX_QUESTION_CHARS: usize = 1000;

/// A validated question.
///
/// Construction enforces the 1..=1000 character bound, so everything
/// downstream can assume a usable question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Question {
    text: String,
    organization_hints: Vec<String>,
}

impl Question {
    /// Validate and wrap a question.
    pub fn new(text: impl Into<String>, organization_hints: Vec<String>) -> Result<Self> {
        let text = text.into();

        if text.trim().is_empty() {
            return Err(BriefingError::InvalidQuestion {
                reason: "question cannot be empty".into(),
            });
        }

        let chars = text.chars().count();
        if chars > MAX_QUESTION_CHARS {
            return Err(BriefingError::InvalidQuestion {
                reason: format!(
                    "question too long ({} characters, max {})",
                    chars, MAX_QUESTION_CHARS
                ),
            });
        }

        let organization_hints = organization_hints
            .into_iter()
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .collect();

        Ok(Self {
            text,
            organization_hints,
        })
    }

    /// The question text as asked.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Organization names the caller asked to focus on.
    pub fn organization_hints(&self) -> &[String] {
        &self.organization_hints
    }
}

/// Broad category of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    Financial,
    Contracts,
    General,
    Comparison,
    News,
}

impl QueryType {
    /// Parse the model's label; unknown labels yield `None`.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "financial" | "finance" => Some(Self::Financial),
            "contracts" | "contract" => Some(Self::Contracts),
            "general" => Some(Self::General),
            "comparison" | "compare" => Some(Self::Comparison),
            "news" => Some(Self::News),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Financial => "financial",
            Self::Contracts => "contracts",
            Self::General => "general",
            Self::Comparison => "comparison",
            Self::News => "news",
        }
    }
}

impl std::fmt::Display for QueryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Time range a question is scoped to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,

    /// Named period the range was derived from ("recent", "this_quarter", ...)
    pub period: Option<String>,
}

impl TimeWindow {
    /// Explicit range with no named period.
    pub fn between(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self {
            start,
            end,
            period: None,
        }
    }

    /// Resolve a named period relative to `now`.
    ///
    /// Returns `None` for null-ish or unknown labels.
    pub fn for_period(label: &str, now: DateTime<Utc>) -> Option<Self> {
        let period = label.trim().to_lowercase().replace([' ', '-'], "_");

        let start = match period.as_str() {
            "recent" | "latest" => now - Duration::days(30),
            "this_month" => Utc
                .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
                .single()?,
            "this_quarter" => {
                let quarter_month = (now.month0() / 3) * 3 + 1;
                Utc.with_ymd_and_hms(now.year(), quarter_month, 1, 0, 0, 0)
                    .single()?
            }
            "this_year" => Utc.with_ymd_and_hms(now.year(), 1, 1, 0, 0, 0).single()?,
            _ => return None,
        };

        Some(Self {
            start: Some(start),
            end: Some(now),
            period: Some(period),
        })
    }
}

/// Structured interpretation of a question.
///
/// Produced once per request and consumed by retrieval and augmentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryAnalysis {
    pub query_type: QueryType,

    /// Canonical names of the organizations the question is about
    pub organizations: Vec<String>,

    pub keywords: Vec<String>,
    pub time_window: Option<TimeWindow>,
    pub search_terms: Vec<String>,
}

impl QueryAnalysis {
    /// An analysis with nothing recognised.
    pub fn general() -> Self {
        Self {
            query_type: QueryType::General,
            organizations: Vec::new(),
            keywords: Vec::new(),
            time_window: None,
            search_terms: Vec::new(),
        }
    }
}
