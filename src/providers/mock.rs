/*!
 * Mock backend implementations for testing.
 *
 * This module provides a mock backend that simulates different behaviors:
 * - `MockBackend::working()` - Always succeeds with translated text
 * - `MockBackend::fail_times(n)` - Fails the first n calls, then succeeds
 * - `MockBackend::failing()` - Always fails with an error
 * - `MockBackend::wrong_count()` - Succeeds but violates the count contract
 */

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::errors::BackendError;

use super::{TranslationRequest, TranslatorBackend};

/// Behavior mode for the mock backend
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a proper translation
    Working,
    /// Fails the first `failures` calls, then succeeds
    FailTimes {
        /// Number of leading calls that error
        failures: usize,
    },
    /// Always fails with an error
    Failing,
    /// Succeeds but returns one extra translation
    WrongCount,
}

/// Mock backend for testing orchestration behavior
#[derive(Debug)]
pub struct MockBackend {
    /// Behavior mode
    behavior: MockBehavior,

    /// Number of translate calls received
    call_count: Arc<AtomicUsize>,

    /// Every batch of texts received, in call order
    seen_batches: Arc<Mutex<Vec<Vec<String>>>>,

    /// Scripted translations looked up by source text
    responses: Arc<Mutex<HashMap<String, String>>>,
}

impl MockBackend {
    /// Create a new mock backend with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            call_count: Arc::new(AtomicUsize::new(0)),
            seen_batches: Arc::new(Mutex::new(Vec::new())),
            responses: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Create a working mock backend that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock backend failing the first `failures` calls
    pub fn fail_times(failures: usize) -> Self {
        Self::new(MockBehavior::FailTimes { failures })
    }

    /// Create a failing mock backend that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock backend that violates the count contract
    pub fn wrong_count() -> Self {
        Self::new(MockBehavior::WrongCount)
    }

    /// Script a translation for one source text
    pub fn with_response(self, source_text: &str, translated: &str) -> Self {
        self.responses
            .lock()
            .insert(source_text.to_string(), translated.to_string());
        self
    }

    /// Number of translate calls received so far
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Every batch of texts received, in call order
    pub fn seen_batches(&self) -> Vec<Vec<String>> {
        self.seen_batches.lock().clone()
    }

    /// Translate one text deterministically
    fn translate_one(&self, text: &str, target_lang: &str) -> String {
        if let Some(scripted) = self.responses.lock().get(text) {
            return scripted.clone();
        }
        format!("[{}] {}", target_lang, text)
    }
}

impl Clone for MockBackend {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            call_count: Arc::clone(&self.call_count),
            seen_batches: Arc::clone(&self.seen_batches),
            responses: Arc::clone(&self.responses),
        }
    }
}

#[async_trait::async_trait]
impl TranslatorBackend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn translate_texts(&self, request: &TranslationRequest) -> Result<Vec<String>, BackendError> {
        let count = self.call_count.fetch_add(1, Ordering::SeqCst);
        self.seen_batches.lock().push(request.texts.clone());

        match self.behavior {
            MockBehavior::Working => Ok(request
                .texts
                .iter()
                .map(|text| self.translate_one(text, &request.target_lang))
                .collect()),

            MockBehavior::FailTimes { failures } => {
                if count < failures {
                    Err(BackendError::Transport(format!(
                        "Simulated transient failure (call #{})",
                        count + 1
                    )))
                } else {
                    Ok(request
                        .texts
                        .iter()
                        .map(|text| self.translate_one(text, &request.target_lang))
                        .collect())
                }
            }

            MockBehavior::Failing => Err(BackendError::ApiError {
                status_code: 500,
                message: "Simulated backend failure".to_string(),
            }),

            MockBehavior::WrongCount => {
                let mut results: Vec<String> = request
                    .texts
                    .iter()
                    .map(|text| self.translate_one(text, &request.target_lang))
                    .collect();
                results.push("unsolicited extra".to_string());
                Ok(results)
            }
        }
    }
}
