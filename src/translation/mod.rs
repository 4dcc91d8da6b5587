/*!
 * Translation orchestration.
 *
 * This module composes deduplication, the two cache tiers, batch planning,
 * and the retry executor around a polymorphic translator backend:
 * - `translation::dedup`: near-duplicate grouping of source texts
 * - `translation::cache`: session cache and durable translation memory
 * - `translation::batch`: packing pending texts into bounded batches
 * - `translation::retry`: retry executor with backoff and jitter
 * - `translation::orchestrator`: the end-to-end resolution loop
 */

use std::sync::Arc;

pub mod batch;
pub mod cache;
pub mod dedup;
pub mod orchestrator;
pub mod retry;

/// Callback reporting (completed, total) resolved input texts.
/// Invoked at least once per resolved group; the completed count is
/// monotonically non-decreasing.
pub type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Best-effort log callback for retry attempts and soft failures
pub type LogCallback = Arc<dyn Fn(&str) + Send + Sync>;

pub use orchestrator::TranslationOrchestrator;
