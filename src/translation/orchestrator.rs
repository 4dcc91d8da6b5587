/*!
 * The translation orchestrator.
 *
 * Resolves an ordered list of source texts into an equal-length list of
 * translations: deduplicate, probe both cache tiers, pack the misses into
 * batches, run each batch through the retry executor against the backend,
 * write fresh translations through to both tiers, and scatter the results
 * back onto every original index.
 */

use std::sync::Arc;

use anyhow::{Context, Result};
use log::debug;

use crate::app_config::{Config, RetryPolicy};
use crate::errors::{BackendError, TranslationError};
use crate::providers::{TranslationRequest, TranslatorBackend};

use super::batch::{plan_batches, PendingEntry};
use super::cache::{make_cache_key, SessionCache, TranslationMemory};
use super::dedup::{deduplicate_texts, DEFAULT_SIMILARITY_THRESHOLD};
use super::retry::run_with_retry;
use super::{LogCallback, ProgressCallback};

/// Orchestrates deduplication, caching, batching, and retries around one
/// translator backend.
///
/// The orchestrator owns the output buffer exclusively; batches are
/// processed sequentially, while a single batch may fan out concurrently
/// inside the backend.
pub struct TranslationOrchestrator {
    /// The backend performing the actual translation calls
    backend: Arc<dyn TranslatorBackend>,

    /// Durable cross-run cache tier
    memory: Arc<TranslationMemory>,

    /// Volatile per-run cache tier, probed first
    session_cache: SessionCache,

    /// Policy for the orchestration-level retry executor
    retry_policy: RetryPolicy,

    /// Character budget per batch
    batch_char_limit: usize,

    /// Item budget per batch
    batch_size: usize,

    /// Similarity threshold for near-duplicate grouping
    similarity_threshold: f64,
}

impl TranslationOrchestrator {
    /// Create an orchestrator with default policy and batch limits
    pub fn new(
        backend: Arc<dyn TranslatorBackend>,
        memory: Arc<TranslationMemory>,
        session_cache: SessionCache,
    ) -> Self {
        Self {
            backend,
            memory,
            session_cache,
            retry_policy: RetryPolicy::default(),
            batch_char_limit: 6000,
            batch_size: 20,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }

    /// Create an orchestrator tuned by the application configuration
    pub fn from_config(
        config: &Config,
        backend: Arc<dyn TranslatorBackend>,
        memory: Arc<TranslationMemory>,
        session_cache: SessionCache,
    ) -> Self {
        Self {
            backend,
            memory,
            session_cache,
            retry_policy: config.retry,
            batch_char_limit: config.translator.batch_char_limit,
            batch_size: config.translator.batch_size,
            similarity_threshold: config.translator.similarity_threshold,
        }
    }

    /// Override the retry policy
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Override the batch character and item budgets
    pub fn with_batch_limits(mut self, batch_char_limit: usize, batch_size: usize) -> Self {
        self.batch_char_limit = batch_char_limit;
        self.batch_size = batch_size;
        self
    }

    /// Override the deduplication similarity threshold
    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    /// Translate an ordered list of texts, returning one translation per
    /// input in original order.
    ///
    /// The progress callback receives (completed, total) with a
    /// monotonically non-decreasing completed count; the log callback
    /// receives retry attempts and soft failures, best-effort.
    pub async fn translate(
        &self,
        texts: &[String],
        source_lang: &str,
        target_lang: &str,
        progress_cb: Option<ProgressCallback>,
        log_cb: Option<LogCallback>,
    ) -> Result<Vec<String>> {
        let total = texts.len();
        let mut resolved: Vec<Option<String>> = vec![None; total];

        let dedup = deduplicate_texts(texts, self.similarity_threshold);
        debug!(
            "Deduplicated {} texts into {} unique entries",
            total,
            dedup.unique_texts.len()
        );

        // Cache resolution: session tier first, then durable memory.
        // Backends degrade individual failures to "", so an empty cached
        // value counts as a miss and gets retranslated.
        let mut pending: Vec<PendingEntry> = Vec::new();
        for (unique_text, indexes) in dedup.unique_texts.iter().zip(dedup.groups.iter()) {
            let cache_key = make_cache_key(source_lang, target_lang, unique_text);
            let cached = self
                .session_cache
                .get(&cache_key)
                .filter(|translation| !translation.is_empty())
                .or_else(|| {
                    self.memory
                        .get(&cache_key)
                        .filter(|translation| !translation.is_empty())
                });

            match cached {
                Some(translation) => {
                    for &idx in indexes {
                        resolved[idx] = Some(translation.clone());
                    }
                }
                None => pending.push(PendingEntry {
                    text: unique_text.clone(),
                    indexes: indexes.clone(),
                    cache_key,
                }),
            }
        }

        let mut completed = resolved.iter().filter(|slot| slot.is_some()).count();
        if let Some(progress) = &progress_cb {
            progress(completed, total);
        }

        if !pending.is_empty() {
            let batches = plan_batches(pending, self.batch_char_limit, self.batch_size);
            debug!("Planned {} batches", batches.len());

            for batch in batches {
                let batch_texts: Vec<String> = batch.iter().map(|entry| entry.text.clone()).collect();
                let request = TranslationRequest::new(batch_texts, source_lang, target_lang);

                let backend = Arc::clone(&self.backend);
                let translations = run_with_retry(&self.retry_policy, log_cb.as_ref(), || {
                    let backend = Arc::clone(&backend);
                    let request = request.clone();
                    async move {
                        backend
                            .translate_texts(&request)
                            .await
                            .map_err(anyhow::Error::from)
                    }
                })
                .await?;

                // A count mismatch is structural; retrying cannot fix it
                if translations.len() != batch.len() {
                    return Err(TranslationError::Backend(BackendError::ProtocolMismatch {
                        expected: batch.len(),
                        returned: translations.len(),
                    })
                    .into());
                }

                for (entry, translated) in batch.iter().zip(translations) {
                    self.session_cache.set(&entry.cache_key, &translated);
                    self.memory.set(&entry.cache_key, &translated);

                    for &idx in &entry.indexes {
                        resolved[idx] = Some(translated.clone());
                        completed += 1;
                        if let Some(progress) = &progress_cb {
                            progress(completed, total);
                        }
                    }
                }
            }
        }

        // Post-condition: every slot written exactly once. Unreachable with
        // correct group bookkeeping.
        let missing: Vec<usize> = resolved
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.is_none().then_some(idx))
            .collect();
        if !missing.is_empty() {
            return Err(TranslationError::UnresolvedSlots(missing).into());
        }

        self.memory
            .flush()
            .context("Failed to flush translation memory")?;

        Ok(resolved
            .into_iter()
            .map(|slot| slot.unwrap_or_default())
            .collect())
    }
}
