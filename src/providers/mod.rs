/*!
 * Backend implementations for different translation services.
 *
 * This module contains client implementations for the supported engines:
 * - Google: multi-endpoint racing backend with Lingva fallback
 * - DeepL Web: scraped JSON-RPC interface, no API key required
 * - DeepL API: official authenticated API (free or pro plan)
 */

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;

use crate::app_config::{Config, TranslationEngine};
use crate::errors::{AppError, BackendError};

pub mod deepl_api;
pub mod deepl_web;
pub mod google;
pub mod mock;

/// One batch of texts to translate between a language pair.
/// Immutable per call.
#[derive(Debug, Clone)]
pub struct TranslationRequest {
    /// Ordered texts to translate
    pub texts: Vec<String>,

    /// Source language code, or "auto"
    pub source_lang: String,

    /// Target language code
    pub target_lang: String,
}

impl TranslationRequest {
    /// Create a new translation request
    pub fn new(texts: Vec<String>, source_lang: impl Into<String>, target_lang: impl Into<String>) -> Self {
        Self {
            texts,
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
        }
    }

    /// Total characters across all texts
    pub fn total_chars(&self) -> usize {
        self.texts.iter().map(|t| t.chars().count()).sum()
    }
}

/// Common trait for all translator backends
///
/// A backend must return exactly one translation per input text; the
/// orchestrator treats a mismatched count as a fatal contract violation.
#[async_trait]
pub trait TranslatorBackend: Send + Sync + Debug {
    /// Short engine identifier for logging
    fn name(&self) -> &'static str;

    /// Maximum characters the backend accepts in one request
    fn max_chars_per_request(&self) -> usize {
        5000
    }

    /// Maximum concurrent sub-requests the backend may fan out internally
    fn concurrency_limit(&self) -> usize {
        1
    }

    /// Translate a batch of texts and return the translated payloads
    ///
    /// # Arguments
    /// * `request` - The texts and language pair to translate
    ///
    /// # Returns
    /// * `Result<Vec<String>, BackendError>` - One translation per input text, or an error
    async fn translate_texts(&self, request: &TranslationRequest) -> Result<Vec<String>, BackendError>;
}

/// Available engines with their display names
pub fn available_engines() -> Vec<(TranslationEngine, &'static str)> {
    vec![
        (TranslationEngine::Google, TranslationEngine::Google.display_name()),
        (TranslationEngine::DeeplWeb, TranslationEngine::DeeplWeb.display_name()),
        (TranslationEngine::DeeplApi, TranslationEngine::DeeplApi.display_name()),
    ]
}

/// Build the backend selected by the configuration.
///
/// The engine set is closed: selection happens over the `TranslationEngine`
/// enum, so an unrecognized engine name is rejected when the configuration is
/// parsed, not at call time. Missing credentials surface as configuration
/// errors here.
pub fn build_backend(config: &Config) -> Result<Arc<dyn TranslatorBackend>, AppError> {
    let timeout = config.translator.timeout_secs;
    let proxy = config.translator.proxy.clone();

    match config.engine {
        TranslationEngine::Google => {
            let backend = google::GoogleBackend::new(timeout, proxy)
                .map_err(|e| AppError::Config(e.to_string()))?;
            Ok(Arc::new(backend))
        }
        TranslationEngine::DeeplWeb => {
            let backend = deepl_web::DeeplWebBackend::new(timeout, proxy)
                .map_err(|e| AppError::Config(e.to_string()))?;
            Ok(Arc::new(backend))
        }
        TranslationEngine::DeeplApi => {
            let api_key = config
                .secrets
                .deepl_api_key
                .clone()
                .filter(|key| !key.is_empty())
                .ok_or_else(|| {
                    AppError::Config("DeepL API key is required. Please configure it in settings.".to_string())
                })?;

            // Plan resolution: explicit setting wins, otherwise free keys are
            // recognizable by their ":fx" suffix
            let plan = match config.secrets.deepl_api_plan.as_deref() {
                Some(plan) => plan.to_lowercase(),
                None if api_key.ends_with(":fx") => "free".to_string(),
                None => "pro".to_string(),
            };

            let backend = deepl_api::DeeplApiBackend::new(
                api_key,
                &plan,
                config.secrets.deepl_api_url.clone(),
                timeout,
                proxy,
            )
            .map_err(|e| AppError::Config(e.to_string()))?;
            Ok(Arc::new(backend))
        }
    }
}
