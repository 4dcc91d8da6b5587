/*!
 * End-to-end tests for the translation orchestrator against a mock backend
 */

use std::sync::Arc;

use parking_lot::Mutex;

use sublocalizer::providers::mock::MockBackend;
use sublocalizer::translation::cache::TranslationMemory;
use sublocalizer::translation::{LogCallback, ProgressCallback};

use crate::common::{harness_with, texts};

#[tokio::test]
async fn test_translate_duplicateInputs_shouldResolveEveryIndex() {
    let harness = harness_with(MockBackend::working());
    let input = texts(&["Hello", "Hello", "Hi"]);

    let results = harness
        .orchestrator
        .translate(&input, "en", "tr", None, None)
        .await
        .unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0], results[1]);
    assert_ne!(results[0], results[2]);

    // The backend only ever saw the two unique texts
    let batches = harness.backend.seen_batches();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0], texts(&["Hello", "Hi"]));
}

#[tokio::test]
async fn test_translate_memoryPrepopulated_shouldSkipBackendForCachedText() {
    let harness = harness_with(MockBackend::working());
    harness.memory.set("en::tr::Hello", "Merhaba");

    let input = texts(&["Hello", "Hello", "Hi"]);
    let results = harness
        .orchestrator
        .translate(&input, "en", "tr", None, None)
        .await
        .unwrap();

    assert_eq!(results[0], "Merhaba");
    assert_eq!(results[1], "Merhaba");

    let batches = harness.backend.seen_batches();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0], texts(&["Hi"]));
}

#[tokio::test]
async fn test_translate_emptyMemoryEntry_shouldRetranslate() {
    let backend = MockBackend::working().with_response("Hello", "Merhaba");
    let harness = harness_with(backend);

    // A failed past run left an empty translation in the durable store
    harness.memory.set("en::tr::Hello", "");

    let results = harness
        .orchestrator
        .translate(&texts(&["Hello"]), "en", "tr", None, None)
        .await
        .unwrap();

    assert_eq!(results, texts(&["Merhaba"]));
    assert_eq!(harness.backend.call_count(), 1);
    assert_eq!(harness.memory.get("en::tr::Hello"), Some("Merhaba".to_string()));
}

#[tokio::test]
async fn test_translate_emptySessionEntry_shouldFallThroughToMemory() {
    let harness = harness_with(MockBackend::working());

    harness.session_cache.set("en::tr::Hello", "");
    harness.memory.set("en::tr::Hello", "Merhaba");

    let results = harness
        .orchestrator
        .translate(&texts(&["Hello"]), "en", "tr", None, None)
        .await
        .unwrap();

    assert_eq!(results, texts(&["Merhaba"]));
    assert_eq!(harness.backend.call_count(), 0);
}

#[tokio::test]
async fn test_translate_repeatedRun_shouldServeFromSessionCache() {
    let harness = harness_with(MockBackend::working());
    let input = texts(&["Hello", "World"]);

    harness
        .orchestrator
        .translate(&input, "en", "tr", None, None)
        .await
        .unwrap();
    let calls_after_first = harness.backend.call_count();

    let results = harness
        .orchestrator
        .translate(&input, "en", "tr", None, None)
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(harness.backend.call_count(), calls_after_first);

    let (hits, _, _) = harness.session_cache.stats();
    assert!(hits >= 2);
}

#[tokio::test]
async fn test_translate_differentTargetLanguage_shouldNotReuseCache() {
    let harness = harness_with(MockBackend::working());
    let input = texts(&["Hello"]);

    harness
        .orchestrator
        .translate(&input, "en", "tr", None, None)
        .await
        .unwrap();
    harness
        .orchestrator
        .translate(&input, "en", "fr", None, None)
        .await
        .unwrap();

    assert_eq!(harness.backend.call_count(), 2);
}

#[tokio::test]
async fn test_translate_countViolation_shouldFailWithoutRetry() {
    let harness = harness_with(MockBackend::wrong_count());
    let input = texts(&["Hello"]);

    let err = harness
        .orchestrator
        .translate(&input, "en", "tr", None, None)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("2 translations for 1 texts"));
    // Structural violations are not worth retrying
    assert_eq!(harness.backend.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_translate_transientFailures_shouldSucceedWithinRetryBudget() {
    let harness = harness_with(MockBackend::fail_times(2));
    let input = texts(&["Hello"]);

    let results = harness
        .orchestrator
        .translate(&input, "en", "tr", None, None)
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(harness.backend.call_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_translate_persistentFailure_shouldExhaustAttemptsAndPropagate() {
    let harness = harness_with(MockBackend::failing());
    let input = texts(&["Hello"]);

    let err = harness
        .orchestrator
        .translate(&input, "en", "tr", None, None)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Simulated backend failure"));
    assert_eq!(harness.backend.call_count(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_translate_logCallback_shouldReceiveRetryAttempts() {
    let harness = harness_with(MockBackend::fail_times(2));
    let messages: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&messages);
    let log_cb: LogCallback = Arc::new(move |msg: &str| {
        sink.lock().push(msg.to_string());
    });

    harness
        .orchestrator
        .translate(&texts(&["Hello"]), "en", "tr", None, Some(log_cb))
        .await
        .unwrap();

    let messages = messages.lock();
    assert_eq!(messages.len(), 2);
    assert!(messages[0].contains("Translation attempt 1 failed"));
}

#[tokio::test]
async fn test_translate_progressCallback_shouldBeMonotonicAndComplete() {
    let harness = harness_with(MockBackend::working());
    harness.memory.set("en::tr::Hello", "Merhaba");

    let updates: Arc<Mutex<Vec<(usize, usize)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&updates);
    let progress_cb: ProgressCallback = Arc::new(move |completed, total| {
        sink.lock().push((completed, total));
    });

    let input = texts(&["Hello", "Hi", "Hi", "Goodbye"]);
    harness
        .orchestrator
        .translate(&input, "en", "tr", Some(progress_cb), None)
        .await
        .unwrap();

    let updates = updates.lock();
    assert!(!updates.is_empty());
    for window in updates.windows(2) {
        assert!(window[1].0 >= window[0].0);
    }
    assert_eq!(*updates.last().unwrap(), (4, 4));
}

#[tokio::test]
async fn test_translate_shouldFlushMemoryAtEndOfRun() {
    let harness = harness_with(MockBackend::working());
    let input = texts(&["Hello"]);

    harness
        .orchestrator
        .translate(&input, "en", "tr", None, None)
        .await
        .unwrap();

    // A fresh instance over the same file sees the written translation
    let reopened = TranslationMemory::new(harness.temp_dir.path().join("memory.json"));
    assert_eq!(reopened.get("en::tr::Hello"), Some("[tr] Hello".to_string()));
}

#[tokio::test]
async fn test_translate_emptyInput_shouldReturnEmptyWithoutBackendCalls() {
    let harness = harness_with(MockBackend::working());

    let results = harness
        .orchestrator
        .translate(&[], "en", "tr", None, None)
        .await
        .unwrap();

    assert!(results.is_empty());
    assert_eq!(harness.backend.call_count(), 0);
}

#[tokio::test]
async fn test_translate_batchLimits_shouldSplitBackendCalls() {
    let harness = harness_with(MockBackend::working());
    let orchestrator = harness.orchestrator.with_batch_limits(1000, 2);

    let input = texts(&["one", "two", "three", "four", "five"]);
    let results = orchestrator
        .translate(&input, "en", "tr", None, None)
        .await
        .unwrap();

    assert_eq!(results.len(), 5);
    let batches = harness.backend.seen_batches();
    assert_eq!(batches.len(), 3);
    for batch in &batches {
        assert!(batch.len() <= 2);
    }
}

#[tokio::test]
async fn test_translate_scriptedResponses_shouldLandOnEveryDuplicateIndex() {
    let backend = MockBackend::working()
        .with_response("Hello", "Merhaba")
        .with_response("Goodbye", "Hoşça kal");
    let harness = harness_with(backend);

    let input = texts(&["Hello", "Goodbye", "Hello"]);
    let results = harness
        .orchestrator
        .translate(&input, "en", "tr", None, None)
        .await
        .unwrap();

    assert_eq!(results, texts(&["Merhaba", "Hoşça kal", "Merhaba"]));
}
