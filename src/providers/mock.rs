/*!
 * Mock provider implementations for testing.
 *
 * This module provides mock providers that simulate different behaviors:
 * - `MockProvider::working()` - Always succeeds with a structured translation
 * - `MockProvider::fail_times(n)` - Fails the first `n` calls for each word
 * - `MockProvider::failing()` - Always fails with an error
 * - `MockProvider::raw_response(text)` - Feeds fixed model output through the real parser
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ProviderError;
use crate::providers::TranslationProvider;
use crate::providers::response::parse_translation_response;
use crate::translation::models::TranslationResult;

/// Behavior mode for the mock provider
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a proper translation
    Working,
    /// Fails the first `times` calls for every word, then succeeds
    FailTimes { times: usize },
    /// Fails intermittently (every Nth request overall)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Returns this text as model output, parsed like a real response
    RawResponse(String),
    /// Simulates slow response (for timeout and concurrency testing)
    Slow { delay_ms: u64 },
}

/// Mock provider for testing translation behavior
///
/// Clones share their request counters.
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Name reported to the translator
    name: String,
    /// Behavior mode
    behavior: MockBehavior,
    /// Total number of requests
    request_count: Arc<AtomicUsize>,
    /// Requests per word
    word_counts: Arc<Mutex<HashMap<String, usize>>>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            name: "mock".to_string(),
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            word_counts: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock that fails `times` times per word before succeeding
    pub fn fail_times(times: usize) -> Self {
        Self::new(MockBehavior::FailTimes { times })
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent {
            fail_every: fail_every.max(1),
        })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock whose model output is always `text`
    pub fn raw_response(text: impl Into<String>) -> Self {
        Self::new(MockBehavior::RawResponse(text.into()))
    }

    /// Create a mock that answers after `delay_ms`
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Change the reported provider name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Total number of translate calls so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Number of translate calls for `word`
    pub fn requests_for(&self, word: &str) -> usize {
        self.word_counts.lock().get(word).copied().unwrap_or(0)
    }

    /// The translation a working mock returns for `word`
    pub fn expected_result(word: &str) -> TranslationResult {
        TranslationResult {
            original: word.to_string(),
            translation: format!("[TRANSLATED] {}", word),
            part_of_speech: "Substantiv".to_string(),
            grammatical_case: "Nominativ".to_string(),
            example_source_language: format!("Это {}.", word),
            example_target_language: format!("Das ist [TRANSLATED] {}.", word),
        }
    }
}

#[async_trait]
impl TranslationProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn translate(&self, word: &str) -> Result<TranslationResult, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        let word_count = {
            let mut counts = self.word_counts.lock();
            let entry = counts.entry(word.to_string()).or_insert(0);
            *entry += 1;
            *entry
        };

        match &self.behavior {
            MockBehavior::Working => Ok(Self::expected_result(word)),

            MockBehavior::FailTimes { times } => {
                if word_count <= *times {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated failure {} of {} for '{}'", word_count, times, word),
                        status_code: 503,
                    })
                } else {
                    Ok(Self::expected_result(word))
                }
            }

            MockBehavior::Intermittent { fail_every } => {
                if count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    })
                } else {
                    Ok(Self::expected_result(word))
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::RawResponse(text) => Ok(parse_translation_response(word, text)),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(*delay_ms)).await;
                Ok(Self::expected_result(word))
            }
        }
    }
}
