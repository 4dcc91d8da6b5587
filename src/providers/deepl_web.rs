/*!
 * DeepL web backend (scraper-based).
 *
 * Talks to DeepL's internal JSON-RPC interface with browser-like headers, no
 * API key required. The interface has quirks: timestamps must be aligned to
 * the number of 'i' characters in the payload, the request body spacing
 * depends on the request id, and the endpoint rate-limits aggressively, so
 * batches stay small and the backend retries rate-limit signals internally
 * with randomized pacing. This internal retry is about transport-level rate
 * limiting; the orchestrator's retry executor still wraps the whole call.
 */

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anyhow::Result;
use log::{debug, warn};
use rand::Rng;
use reqwest::Client;
use serde_json::{json, Value};

use crate::errors::BackendError;

use super::{TranslationRequest, TranslatorBackend};

/// DeepL internal JSON-RPC endpoint
const JSONRPC_URL: &str = "https://www2.deepl.com/jsonrpc";

/// The scraped interface works better with small sub-batches
const SUB_BATCH_SIZE: usize = 5;

/// Internal retry attempts per sub-batch for transport-level rate limiting
const MAX_INTERNAL_RETRIES: u32 = 3;

/// Backend for DeepL's internal web API
#[derive(Debug)]
pub struct DeeplWebBackend {
    /// HTTP client with browser-like default headers
    client: Client,

    /// Monotonic JSON-RPC request id, seeded randomly per instance
    request_id: AtomicU64,

    /// Endpoint URL, overridable for tests
    api_url: String,
}

impl DeeplWebBackend {
    /// Create a new DeepL web backend
    pub fn new(timeout_secs: u64, proxy: Option<String>) -> Result<Self> {
        Self::with_api_url(JSONRPC_URL, timeout_secs, proxy)
    }

    /// Create a backend against an explicit endpoint URL
    pub fn with_api_url(api_url: impl Into<String>, timeout_secs: u64, proxy: Option<String>) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(reqwest::header::ACCEPT, "*/*".parse()?);
        headers.insert(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9".parse()?);
        headers.insert(reqwest::header::ORIGIN, "https://www.deepl.com".parse()?);
        headers.insert(reqwest::header::REFERER, "https://www.deepl.com/".parse()?);
        headers.insert(
            reqwest::header::USER_AGENT,
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .parse()?,
        );

        let mut builder = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .default_headers(headers);
        if let Some(proxy_url) = proxy {
            builder = builder.proxy(reqwest::Proxy::all(&proxy_url)?);
        }

        Ok(Self {
            client: builder.build()?,
            request_id: AtomicU64::new(rand::rng().random_range(1_000_000..99_999_999)),
            api_url: api_url.into(),
        })
    }

    /// Get the next request id
    fn next_request_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Map a generic language code to DeepL notation
    fn map_lang(lang: &str) -> String {
        match lang.to_lowercase().as_str() {
            "auto" => "auto".to_string(),
            other => other.to_uppercase(),
        }
    }

    /// Build the JSON-RPC body for one sub-batch.
    ///
    /// The timestamp must be a multiple-aligned value derived from the number
    /// of 'i' characters in the payload, an anti-bot measure of the endpoint.
    fn build_request_body(&self, request_id: u64, texts: &[String], source_lang: &str, target_lang: &str) -> Value {
        let i_count: i64 = texts.iter().map(|t| t.matches('i').count() as i64).sum();
        let mut timestamp = chrono::Utc::now().timestamp_millis();
        if i_count > 0 {
            timestamp = timestamp - (timestamp % (i_count + 1)) + (i_count + 1);
        }

        let jobs: Vec<Value> = texts
            .iter()
            .enumerate()
            .map(|(idx, text)| {
                json!({
                    "kind": "default",
                    "sentences": [{"text": text, "id": idx, "prefix": ""}],
                    "raw_en_context_before": [],
                    "raw_en_context_after": [],
                    "preferred_num_beams": 4,
                })
            })
            .collect();

        json!({
            "jsonrpc": "2.0",
            "method": "LMT_handle_jobs",
            "id": request_id,
            "params": {
                "jobs": jobs,
                "lang": {
                    "source_lang_user_selected": Self::map_lang(source_lang),
                    "target_lang": Self::map_lang(target_lang),
                },
                "priority": 1,
                "commonJobParams": {
                    "mode": "translate",
                    "wasSpoken": false,
                    "transcribe_as": "",
                },
                "timestamp": timestamp,
            },
        })
    }

    /// Serialize the body with the spacing the endpoint expects.
    ///
    /// Depending on the request id, the `"method"` key must be followed by
    /// either one or two spaces before the colon-value.
    fn serialize_body(request_id: u64, body: &Value) -> String {
        let json_str = body.to_string();
        if (request_id + 5) % 29 == 0 || (request_id + 3) % 13 == 0 {
            json_str.replace("\"method\":\"", "\"method\" : \"")
        } else {
            json_str.replace("\"method\":\"", "\"method\": \"")
        }
    }

    /// Translate one sub-batch through the JSON-RPC interface
    async fn translate_sub_batch(
        &self,
        texts: &[String],
        source_lang: &str,
        target_lang: &str,
    ) -> Result<Vec<String>, BackendError> {
        let request_id = self.next_request_id();
        let body = self.build_request_body(request_id, texts, source_lang, target_lang);
        let body_str = Self::serialize_body(request_id, &body);

        let response = self
            .client
            .post(&self.api_url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body_str)
            .send()
            .await
            .map_err(|e| BackendError::Transport(format!("DeepL connection error: {}", e)))?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(BackendError::RateLimited(
                "DeepL rate limit exceeded. Please wait and try again.".to_string(),
            ));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::ApiError {
                status_code: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| BackendError::ParseError(format!("DeepL response: {}", e)))?;

        let result = match data.get("result") {
            Some(result) => result,
            None => {
                let message = data
                    .pointer("/error/message")
                    .and_then(Value::as_str)
                    .unwrap_or("Unknown error");
                return Err(BackendError::ApiError {
                    status_code: status.as_u16(),
                    message: format!("DeepL API error: {}", message),
                });
            }
        };

        let translations = result
            .get("translations")
            .and_then(Value::as_array)
            .ok_or_else(|| BackendError::ParseError("DeepL response missing translations".to_string()))?;

        // Best translation is the first beam's first sentence
        let texts_out: Vec<String> = translations
            .iter()
            .map(|translation| {
                translation
                    .pointer("/beams/0/sentences/0/text")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string()
            })
            .collect();

        Ok(texts_out)
    }
}

#[async_trait::async_trait]
impl TranslatorBackend for DeeplWebBackend {
    fn name(&self) -> &'static str {
        "deepl_web"
    }

    fn max_chars_per_request(&self) -> usize {
        3000
    }

    fn concurrency_limit(&self) -> usize {
        2
    }

    async fn translate_texts(&self, request: &TranslationRequest) -> Result<Vec<String>, BackendError> {
        if request.texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut results: Vec<String> = Vec::with_capacity(request.texts.len());

        for (chunk_index, chunk) in request.texts.chunks(SUB_BATCH_SIZE).enumerate() {
            let mut attempt = 0u32;
            loop {
                attempt += 1;
                match self.translate_sub_batch(chunk, &request.source_lang, &request.target_lang).await {
                    Ok(batch_results) => {
                        results.extend(batch_results);

                        // Pace sub-batches to avoid tripping the rate limiter
                        let remaining = request.texts.len() > (chunk_index + 1) * SUB_BATCH_SIZE;
                        if remaining {
                            let pause = 0.5 + rand::rng().random_range(0.0..0.5);
                            tokio::time::sleep(Duration::from_secs_f64(pause)).await;
                        }
                        break;
                    }
                    Err(e) if e.is_rate_limit() && attempt < MAX_INTERNAL_RETRIES => {
                        let wait = f64::from(attempt) * 2.0 + rand::rng().random_range(0.0..1.0);
                        warn!("DeepL rate limited, waiting {:.1}s before retrying", wait);
                        tokio::time::sleep(Duration::from_secs_f64(wait)).await;
                    }
                    Err(e) if attempt < MAX_INTERNAL_RETRIES => {
                        debug!("DeepL sub-batch failed ({}), retrying", e);
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        // Pad a short result so the caller's count check sees the mismatch
        if results.len() != request.texts.len() {
            warn!(
                "DeepL result count mismatch: got {}, expected {}",
                results.len(),
                request.texts.len()
            );
            while results.len() < request.texts.len() {
                results.push(String::new());
            }
        }

        Ok(results)
    }
}
