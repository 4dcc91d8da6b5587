/*!
 * Official DeepL API backend.
 *
 * Single authenticated endpoint supporting both Free and Pro plans, with the
 * plan deciding which host is used.
 */

use std::time::Duration;

use anyhow::Result;
use log::{debug, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::BackendError;

use super::{TranslationRequest, TranslatorBackend};

/// Pro plan endpoint
const PRO_API_URL: &str = "https://api.deepl.com/v2/translate";

/// Free plan endpoint
const FREE_API_URL: &str = "https://api-free.deepl.com/v2/translate";

/// DeepL translate request payload
#[derive(Debug, Serialize)]
struct DeeplApiRequest<'a> {
    /// Texts to translate
    text: &'a [String],

    /// Target language in DeepL notation
    target_lang: String,

    /// Source language in DeepL notation; absent means auto-detect
    #[serde(skip_serializing_if = "Option::is_none")]
    source_lang: Option<String>,
}

/// DeepL translate response payload
#[derive(Debug, Deserialize)]
struct DeeplApiResponse {
    /// One entry per requested text
    #[serde(default)]
    translations: Vec<DeeplApiTranslation>,
}

/// Individual translation in a DeepL response
#[derive(Debug, Deserialize)]
struct DeeplApiTranslation {
    /// The translated text
    #[serde(default)]
    text: String,
}

/// Backend for the official DeepL API
#[derive(Debug, Clone)]
pub struct DeeplApiBackend {
    /// HTTP client for API requests
    client: Client,

    /// API key for authentication
    api_key: String,

    /// Resolved endpoint URL
    api_url: String,
}

impl DeeplApiBackend {
    /// Create a new DeepL API backend.
    ///
    /// The endpoint is the explicit override when given, otherwise picked
    /// from the plan: free plans (and keys ending in ":fx") use the
    /// api-free host.
    pub fn new(
        api_key: impl Into<String>,
        plan: &str,
        api_url: Option<String>,
        timeout_secs: u64,
        proxy: Option<String>,
    ) -> Result<Self> {
        let api_key = api_key.into();

        let api_url = match api_url.filter(|url| !url.is_empty()) {
            Some(url) => url,
            None if plan.eq_ignore_ascii_case("free") || api_key.ends_with(":fx") => {
                FREE_API_URL.to_string()
            }
            None => PRO_API_URL.to_string(),
        };

        let mut builder = Client::builder().timeout(Duration::from_secs(timeout_secs));
        if let Some(proxy_url) = proxy {
            builder = builder.proxy(reqwest::Proxy::all(&proxy_url)?);
        }

        Ok(Self {
            client: builder.build()?,
            api_key,
            api_url,
        })
    }

    /// Map a generic language code to DeepL notation.
    ///
    /// Returns `None` for "auto": the DeepL API auto-detects when the source
    /// language field is omitted.
    fn map_lang(lang: &str) -> Option<String> {
        let mapped = match lang.to_lowercase().as_str() {
            "auto" => return None,
            "en" => "EN",
            "tr" => "TR",
            "de" => "DE",
            "fr" => "FR",
            "es" => "ES",
            "it" => "IT",
            "ja" => "JA",
            "ko" => "KO",
            "ru" => "RU",
            "zh" => "ZH",
            "pt" => "PT-PT",
            "nl" => "NL",
            "pl" => "PL",
            other => return Some(other.to_uppercase()),
        };
        Some(mapped.to_string())
    }
}

#[async_trait::async_trait]
impl TranslatorBackend for DeeplApiBackend {
    fn name(&self) -> &'static str {
        "deepl_api"
    }

    fn max_chars_per_request(&self) -> usize {
        5000
    }

    fn concurrency_limit(&self) -> usize {
        4
    }

    async fn translate_texts(&self, request: &TranslationRequest) -> Result<Vec<String>, BackendError> {
        if request.texts.is_empty() {
            return Ok(Vec::new());
        }

        let target_lang = Self::map_lang(&request.target_lang)
            .unwrap_or_else(|| request.target_lang.to_uppercase());
        let payload = DeeplApiRequest {
            text: &request.texts,
            target_lang,
            source_lang: Self::map_lang(&request.source_lang),
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| BackendError::Transport(format!("DeepL API connection error: {}", e)))?;

        let status = response.status();
        match status.as_u16() {
            200 => {}
            403 => {
                return Err(BackendError::Authentication(
                    "DeepL API: Invalid API key or insufficient permissions".to_string(),
                ));
            }
            456 => {
                return Err(BackendError::QuotaExceeded("DeepL API: Quota exceeded".to_string()));
            }
            429 => {
                return Err(BackendError::RateLimited(
                    "DeepL API: Too many requests. Please slow down.".to_string(),
                ));
            }
            code => {
                let body = response.text().await.unwrap_or_default();
                return Err(BackendError::ApiError {
                    status_code: code,
                    message: truncate(&body, 200),
                });
            }
        }

        let parsed: DeeplApiResponse = response
            .json()
            .await
            .map_err(|e| BackendError::ParseError(format!("DeepL API response: {}", e)))?;

        let mut translations: Vec<String> = parsed
            .translations
            .into_iter()
            .map(|item| item.text)
            .collect();

        debug!("DeepL API translated {} texts", translations.len());

        // The official API occasionally drops entries; pad so the caller's
        // count check pinpoints the real mismatch
        if translations.len() != request.texts.len() {
            warn!(
                "DeepL returned {} translations for {} texts",
                translations.len(),
                request.texts.len()
            );
            while translations.len() < request.texts.len() {
                translations.push(String::new());
            }
        }

        Ok(translations)
    }
}

/// Truncate text to a maximum byte length for error messages
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect()
    }
}
