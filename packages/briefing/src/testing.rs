//! Testing utilities including mock implementations.
//!
//! These let applications exercise the pipeline without real model calls,
//! network access, or waiting on the wall clock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::clock::Clock;
use crate::error::{BriefingError, Result};
use crate::traits::ai::{CompletionPurpose, CompletionRequest, LanguageModel};
use crate::traits::searcher::{SearchProvider, WebSearchResult};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A scripted language model.
///
/// Replies are configured per [`CompletionPurpose`]. Without a scripted
/// reply the mock answers deterministically: `{}` for analysis, and for
/// synthesis a sentence quoting the first `Title:` line of the context.
#[derive(Default)]
pub struct MockLanguageModel {
    replies: HashMap<CompletionPurpose, String>,
    failing: HashSet<CompletionPurpose>,
    delay: Option<Duration>,
    calls: Mutex<Vec<CompletionRequest>>,
}

impl MockLanguageModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the reply for one purpose.
    pub fn with_reply(mut self, purpose: CompletionPurpose, reply: impl Into<String>) -> Self {
        self.replies.insert(purpose, reply.into());
        self
    }

    /// Make calls for `purpose` fail with a transport-style error.
    pub fn failing(mut self, purpose: CompletionPurpose) -> Self {
        self.failing.insert(purpose);
        self
    }

    /// Sleep before every reply.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every request received, in order.
    pub fn calls(&self) -> Vec<CompletionRequest> {
        lock(&self.calls).clone()
    }

    /// Number of requests received for `purpose`.
    pub fn call_count(&self, purpose: CompletionPurpose) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|c| c.purpose == purpose)
            .count()
    }

    /// Total number of requests received.
    pub fn total_calls(&self) -> usize {
        lock(&self.calls).len()
    }

    fn default_reply(request: &CompletionRequest) -> String {
        match request.purpose {
            CompletionPurpose::Analysis => "{}".to_string(),
            CompletionPurpose::Synthesis => match request
                .system
                .lines()
                .find_map(|line| line.strip_prefix("Title: "))
            {
                Some(title) => format!("According to \"{}\", the answer is in the sources.", title),
                None => "The provided context does not answer this question.".to_string(),
            },
            CompletionPurpose::DirectKnowledge => {
                "From general background knowledge, which may not be current.".to_string()
            }
            CompletionPurpose::Summarization => {
                let first = request.user.lines().next().unwrap_or_default();
                format!("Summary of {}", first.trim_start_matches("Title: "))
            }
        }
    }
}

#[async_trait]
impl LanguageModel for MockLanguageModel {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        lock(&self.calls).push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.contains(&request.purpose) {
            return Err(BriefingError::language_model("mock model unavailable"));
        }

        Ok(self
            .replies
            .get(&request.purpose)
            .cloned()
            .unwrap_or_else(|| Self::default_reply(&request)))
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

/// A search provider returning fixed results.
pub struct MockSearchProvider {
    name: String,
    results: Vec<WebSearchResult>,
    fail: bool,
    calls: AtomicUsize,
    queries: Mutex<Vec<String>>,
}

impl MockSearchProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            results: Vec::new(),
            fail: false,
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Return these results for every query.
    pub fn with_results(mut self, results: Vec<WebSearchResult>) -> Self {
        self.results = results;
        self
    }

    /// Fail every query.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Number of searches issued.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Queries received, in order.
    pub fn queries(&self) -> Vec<String> {
        lock(&self.queries).clone()
    }
}

#[async_trait]
impl SearchProvider for MockSearchProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(&self, query: &str) -> Result<Vec<WebSearchResult>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.queries).push(query.to_string());

        if self.fail {
            return Err(BriefingError::search(&self.name, "mock provider unavailable"));
        }
        Ok(self.results.clone())
    }
}

/// A clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    /// Start at the current wall-clock time.
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    /// Start at a fixed instant.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Move forward by `by`.
    pub fn advance(&self, by: Duration) {
        let by = chrono::Duration::from_std(by).unwrap_or(chrono::Duration::MAX);
        let mut now = lock(&self.now);
        *now = now.checked_add_signed(by).unwrap_or(DateTime::<Utc>::MAX_UTC);
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *lock(&self.now) = now;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *lock(&self.now)
    }
}
