/*!
 * # SubLocalizer - Translation Orchestration & Backend Resilience
 *
 * A Rust library for resilient batch translation of subtitle texts using
 * pluggable remote backends.
 *
 * ## Features
 *
 * - Near-duplicate deduplication so repeated lines are translated once
 * - Two-tier caching: a per-run session cache and a durable on-disk
 *   translation memory
 * - Batch planning bounded by character and item budgets
 * - Retry with bounded exponential backoff and jitter
 * - Multiple translation engines:
 *   - Google (multi-endpoint racing with Lingva fallback)
 *   - DeepL Web (scraped JSON-RPC interface, no API key)
 *   - DeepL API (official, free or pro plan)
 * - Progress and log callbacks for UI integration
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `translation`: Orchestration of the translation pipeline:
 *   - `translation::dedup`: near-duplicate grouping
 *   - `translation::cache`: session cache and durable translation memory
 *   - `translation::batch`: batch planning
 *   - `translation::retry`: retry executor
 *   - `translation::orchestrator`: the end-to-end resolution loop
 * - `providers`: Client implementations for the translation engines:
 *   - `providers::google`: multi-endpoint racing backend
 *   - `providers::deepl_web`: scraped JSON-RPC backend
 *   - `providers::deepl_api`: official DeepL API backend
 * - `language_utils`: language codes and the detector collaborator seam
 * - `document`: collaborator seam for translatable documents
 * - `errors`: Custom error types for the library
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod document;
pub mod errors;
pub mod language_utils;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::{Config, RetryPolicy, TranslationEngine};
pub use errors::{AppError, BackendError, TranslationError};
pub use providers::{build_backend, TranslationRequest, TranslatorBackend};
pub use translation::cache::{make_cache_key, SessionCache, TranslationMemory};
pub use translation::TranslationOrchestrator;
