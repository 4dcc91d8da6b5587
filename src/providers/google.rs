/*!
 * Multi-endpoint Google backend with Lingva fallback.
 *
 * Races several equivalent Google mirrors for each request and keeps
 * per-endpoint failure counters so unhealthy mirrors are deprioritized
 * without being permanently excluded. When every mirror fails, the backend
 * falls back to Lingva instances (a free Google proxy), and finally to a
 * plain single request against the first mirror.
 */

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use log::debug;
use parking_lot::Mutex;
use reqwest::Client;
use serde_json::Value;
use tokio::sync::Semaphore;
use url::Url;

use crate::errors::BackendError;

use super::{TranslationRequest, TranslatorBackend};

/// Google mirror endpoints raced for each request
const GOOGLE_ENDPOINTS: [&str; 4] = [
    "https://translate.googleapis.com/translate_a/single",
    "https://translate.google.com/translate_a/single",
    "https://translate.google.com.tr/translate_a/single",
    "https://translate.google.co.uk/translate_a/single",
];

/// Lingva instances (free, no API key needed)
const LINGVA_INSTANCES: [&str; 3] = [
    "https://lingva.ml",
    "https://lingva.lunar.icu",
    "https://translate.plausibility.cloud",
];

/// Batch separator token, unlikely to survive translation altered
const BATCH_SEPARATOR: &str = "\n|||RNLSEP999|||\n";

/// Separator batching is only attempted for small batches
const MAX_SEPARATOR_TEXTS: usize = 8;
const MAX_SEPARATOR_CHARS: usize = 1200;

/// Endpoints race as pairs for single texts and triples for batches
const SINGLE_RACE_WIDTH: usize = 2;
const BATCH_RACE_WIDTH: usize = 3;

/// Failure slack: an endpoint stays in rotation while its failure count is
/// within this margin of the healthiest endpoint
const FAILURE_TOLERANCE: u32 = 2;

/// Per-request timeouts, tighter than the client-level timeout so a slow
/// mirror loses the race instead of stalling it
const SINGLE_TIMEOUT: Duration = Duration::from_secs(8);
const BATCH_TIMEOUT: Duration = Duration::from_secs(15);
const LINGVA_TIMEOUT: Duration = Duration::from_secs(10);
const LAST_RESORT_TIMEOUT: Duration = Duration::from_secs(5);

/// Mutable selection state shared by concurrently racing tasks.
/// Kept behind one lock; critical sections are index arithmetic only.
struct PoolState {
    /// Round-robin cursor over the currently available endpoints
    cursor: usize,

    /// Per-endpoint failure tally
    failures: HashMap<String, u32>,
}

/// Round-robin endpoint selection with failure tracking
#[derive(Clone)]
struct EndpointPool {
    endpoints: Arc<Vec<String>>,
    state: Arc<Mutex<PoolState>>,
}

impl EndpointPool {
    fn new(endpoints: Vec<String>) -> Self {
        Self {
            endpoints: Arc::new(endpoints),
            state: Arc::new(Mutex::new(PoolState {
                cursor: 0,
                failures: HashMap::new(),
            })),
        }
    }

    fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    fn len(&self) -> usize {
        self.endpoints.len()
    }

    fn first(&self) -> Option<String> {
        self.endpoints.first().cloned()
    }

    /// Select the next endpoint, round-robin among those whose failure count
    /// is within the tolerance of the minimum observed. Resets all counters
    /// if none qualify.
    fn next(&self) -> String {
        let mut state = self.state.lock();

        let min_failures = self
            .endpoints
            .iter()
            .map(|ep| state.failures.get(ep).copied().unwrap_or(0))
            .min()
            .unwrap_or(0);

        let mut available: Vec<&String> = self
            .endpoints
            .iter()
            .filter(|ep| state.failures.get(*ep).copied().unwrap_or(0) <= min_failures + FAILURE_TOLERANCE)
            .collect();

        if available.is_empty() {
            state.failures.clear();
            available = self.endpoints.iter().collect();
        }

        state.cursor = (state.cursor + 1) % available.len();
        available[state.cursor].clone()
    }

    fn record_failure(&self, endpoint: &str) {
        let mut state = self.state.lock();
        *state.failures.entry(endpoint.to_string()).or_insert(0) += 1;
    }

    fn record_success(&self, endpoint: &str) {
        let mut state = self.state.lock();
        state.failures.insert(endpoint.to_string(), 0);
    }

    fn failure_count(&self, endpoint: &str) -> u32 {
        self.state.lock().failures.get(endpoint).copied().unwrap_or(0)
    }
}

/// Backend racing multiple Google mirrors with a Lingva fallback chain
#[derive(Clone)]
pub struct GoogleBackend {
    /// HTTP client shared by all racing tasks
    client: Client,

    /// Google mirror pool with failure tracking
    pool: EndpointPool,

    /// Lingva instance pool, same round-robin policy
    lingva_pool: EndpointPool,
}

impl std::fmt::Debug for GoogleBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleBackend")
            .field("endpoints", &self.pool.len())
            .field("lingva_instances", &self.lingva_pool.len())
            .finish()
    }
}

impl GoogleBackend {
    /// Create a backend over the default mirror and Lingva lists
    pub fn new(timeout_secs: u64, proxy: Option<String>) -> Result<Self> {
        Self::with_endpoints(
            GOOGLE_ENDPOINTS.iter().map(|s| s.to_string()).collect(),
            LINGVA_INSTANCES.iter().map(|s| s.to_string()).collect(),
            timeout_secs,
            proxy,
        )
    }

    /// Create a backend over explicit endpoint lists.
    ///
    /// An empty Lingva list disables that fallback tier.
    pub fn with_endpoints(
        endpoints: Vec<String>,
        lingva_instances: Vec<String>,
        timeout_secs: u64,
        proxy: Option<String>,
    ) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .pool_max_idle_per_host(20)
            .tcp_keepalive(Duration::from_secs(60));
        if let Some(proxy_url) = proxy {
            builder = builder.proxy(reqwest::Proxy::all(&proxy_url)?);
        }

        Ok(Self {
            client: builder.build()?,
            pool: EndpointPool::new(endpoints),
            lingva_pool: EndpointPool::new(lingva_instances),
        })
    }

    /// Failure tally for one endpoint, for health inspection
    pub fn failure_count(&self, endpoint: &str) -> u32 {
        self.pool.failure_count(endpoint)
    }

    /// Extract the translated text out of Google's nested array response.
    ///
    /// The payload is `[[["segment", "original", ...], ...], ...]`; the
    /// translation is the concatenation of every segment's first element.
    fn extract_segments(data: &Value) -> Option<String> {
        let segments = data.get(0)?.as_array()?;
        if segments.is_empty() {
            return None;
        }

        let mut translated = String::new();
        for segment in segments {
            if let Some(part) = segment.get(0).and_then(Value::as_str) {
                translated.push_str(part);
            }
        }
        Some(translated)
    }

    /// Query one Google mirror for a single text, updating its failure tally
    async fn fetch_single(
        client: Client,
        pool: EndpointPool,
        endpoint: String,
        text: String,
        source_lang: String,
        target_lang: String,
    ) -> Option<String> {
        let response = client
            .get(&endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", source_lang.as_str()),
                ("tl", target_lang.as_str()),
                ("dt", "t"),
                ("q", text.as_str()),
            ])
            .timeout(SINGLE_TIMEOUT)
            .send()
            .await;

        let response = match response {
            Ok(response) if response.status().is_success() => response,
            _ => {
                pool.record_failure(&endpoint);
                return None;
            }
        };

        match response.json::<Value>().await {
            Ok(data) => match Self::extract_segments(&data) {
                Some(translated) => {
                    pool.record_success(&endpoint);
                    Some(translated)
                }
                None => {
                    pool.record_failure(&endpoint);
                    None
                }
            },
            Err(_) => {
                pool.record_failure(&endpoint);
                None
            }
        }
    }

    /// Query one Google mirror with a separator-joined batch.
    ///
    /// A segment-count mismatch after splitting discards the whole result;
    /// only transport/HTTP failures count against the endpoint.
    async fn fetch_batch(
        client: Client,
        pool: EndpointPool,
        endpoint: String,
        combined: String,
        expected: usize,
        source_lang: String,
        target_lang: String,
    ) -> Option<Vec<String>> {
        let response = client
            .get(&endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", source_lang.as_str()),
                ("tl", target_lang.as_str()),
                ("dt", "t"),
                ("q", combined.as_str()),
            ])
            .timeout(BATCH_TIMEOUT)
            .send()
            .await;

        let response = match response {
            Ok(response) if response.status().is_success() => response,
            _ => {
                pool.record_failure(&endpoint);
                return None;
            }
        };

        let data = match response.json::<Value>().await {
            Ok(data) => data,
            Err(_) => {
                pool.record_failure(&endpoint);
                return None;
            }
        };

        let full_translation = Self::extract_segments(&data)?;
        let parts: Vec<&str> = full_translation.split(BATCH_SEPARATOR).collect();

        if parts.len() != expected {
            debug!(
                "Batch separator mismatch on {}: expected {}, got {}",
                endpoint,
                expected,
                parts.len()
            );
            return None;
        }

        pool.record_success(&endpoint);
        Some(parts.iter().map(|p| p.trim().to_string()).collect())
    }

    /// Await racing tasks; the first usable result wins and the losing
    /// tasks are aborted. Cancellation is silent: an aborted sibling
    /// surfaces as a JoinError that is simply skipped.
    async fn race<T: Send + 'static>(tasks: Vec<tokio::task::JoinHandle<Option<T>>>) -> Option<T> {
        let abort_handles: Vec<_> = tasks.iter().map(|t| t.abort_handle()).collect();
        let mut stream: FuturesUnordered<_> = tasks.into_iter().collect();

        while let Some(joined) = stream.next().await {
            if let Ok(Some(result)) = joined {
                for handle in &abort_handles {
                    handle.abort();
                }
                return Some(result);
            }
        }
        None
    }

    /// Translate a single text: race two mirrors, then Lingva, then the
    /// last-resort plain request
    async fn translate_single(&self, text: &str, source_lang: &str, target_lang: &str) -> Option<String> {
        let mut tasks = Vec::with_capacity(SINGLE_RACE_WIDTH);
        for _ in 0..SINGLE_RACE_WIDTH.min(self.pool.len()) {
            let endpoint = self.pool.next();
            tasks.push(tokio::spawn(Self::fetch_single(
                self.client.clone(),
                self.pool.clone(),
                endpoint,
                text.to_string(),
                source_lang.to_string(),
                target_lang.to_string(),
            )));
        }

        if let Some(translated) = Self::race(tasks).await {
            return Some(translated);
        }

        if !self.lingva_pool.is_empty() {
            debug!("Google endpoints failed, trying Lingva fallback");
            if let Some(translated) = self.translate_via_lingva(text, source_lang, target_lang).await {
                return Some(translated);
            }
        }

        self.last_resort(text, source_lang, target_lang).await
    }

    /// Translate via Lingva instances, one at a time in rotation
    async fn translate_via_lingva(&self, text: &str, source_lang: &str, target_lang: &str) -> Option<String> {
        for _ in 0..self.lingva_pool.len() {
            let instance = self.lingva_pool.next();

            let mut url = match Url::parse(&instance) {
                Ok(url) => url,
                Err(_) => continue,
            };
            if url
                .path_segments_mut()
                .map(|mut segments| {
                    segments.extend(["api", "v1", source_lang, target_lang, text]);
                })
                .is_err()
            {
                continue;
            }

            let response = self.client.get(url).timeout(LINGVA_TIMEOUT).send().await;
            let response = match response {
                Ok(response) if response.status().is_success() => response,
                _ => {
                    debug!("Lingva instance {} failed", instance);
                    continue;
                }
            };

            if let Ok(data) = response.json::<Value>().await {
                if let Some(translated) = data.get("translation").and_then(Value::as_str) {
                    return Some(translated.to_string());
                }
            }
        }
        None
    }

    /// Last resort: one plain request against the first mirror with a
    /// browser User-Agent, no racing
    async fn last_resort(&self, text: &str, source_lang: &str, target_lang: &str) -> Option<String> {
        let endpoint = self.pool.first()?;

        let response = self
            .client
            .get(&endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", source_lang),
                ("tl", target_lang),
                ("dt", "t"),
                ("q", text),
            ])
            .header(
                reqwest::header::USER_AGENT,
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36",
            )
            .timeout(LAST_RESORT_TIMEOUT)
            .send()
            .await
            .ok()?;

        if !response.status().is_success() {
            return None;
        }

        let data = response.json::<Value>().await.ok()?;
        Self::extract_segments(&data)
    }

    /// Try translating a small batch as one separator-joined request,
    /// racing up to three mirrors. Returns None when every attempt fails or
    /// the segment count does not survive translation.
    async fn try_batch_separator(
        &self,
        texts: &[String],
        source_lang: &str,
        target_lang: &str,
    ) -> Option<Vec<String>> {
        let combined = texts.join(BATCH_SEPARATOR);

        let mut tasks = Vec::new();
        for _ in 0..BATCH_RACE_WIDTH.min(self.pool.len()) {
            let endpoint = self.pool.next();
            tasks.push(tokio::spawn(Self::fetch_batch(
                self.client.clone(),
                self.pool.clone(),
                endpoint,
                combined.clone(),
                texts.len(),
                source_lang.to_string(),
                target_lang.to_string(),
            )));
        }

        let result = Self::race(tasks).await;
        if result.is_some() {
            debug!("Batch separator success: {} texts translated", texts.len());
        }
        result
    }

    /// Translate texts independently and concurrently, bounded by the
    /// concurrency limit, with per-item failure isolation
    async fn translate_parallel(&self, texts: &[String], source_lang: &str, target_lang: &str) -> Vec<String> {
        if texts.is_empty() {
            return Vec::new();
        }

        let semaphore = Arc::new(Semaphore::new(self.concurrency_limit()));
        let mut tasks = Vec::with_capacity(texts.len());

        for text in texts {
            let backend = self.clone();
            let semaphore = semaphore.clone();
            let text = text.clone();
            let source_lang = source_lang.to_string();
            let target_lang = target_lang.to_string();

            tasks.push(tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return String::new(),
                };
                backend
                    .translate_single(&text, &source_lang, &target_lang)
                    .await
                    .unwrap_or_default()
            }));
        }

        let mut results = Vec::with_capacity(tasks.len());
        for (idx, task) in tasks.into_iter().enumerate() {
            match task.await {
                Ok(translated) => results.push(translated),
                Err(e) => {
                    debug!("Parallel translation failed for text {}: {}", idx + 1, e);
                    results.push(String::new());
                }
            }
        }

        let success_count = results.iter().filter(|r| !r.is_empty()).count();
        debug!("Parallel translation: {}/{} successful", success_count, results.len());

        results
    }
}

#[async_trait::async_trait]
impl TranslatorBackend for GoogleBackend {
    fn name(&self) -> &'static str {
        "google"
    }

    fn max_chars_per_request(&self) -> usize {
        5000
    }

    fn concurrency_limit(&self) -> usize {
        16
    }

    async fn translate_texts(&self, request: &TranslationRequest) -> Result<Vec<String>, BackendError> {
        let texts = &request.texts;
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        if texts.len() == 1 {
            let translated = self
                .translate_single(&texts[0], &request.source_lang, &request.target_lang)
                .await
                .unwrap_or_default();
            return Ok(vec![translated]);
        }

        // Small batches are cheaper as one separator-joined request
        if texts.len() <= MAX_SEPARATOR_TEXTS && request.total_chars() <= MAX_SEPARATOR_CHARS {
            if let Some(results) = self
                .try_batch_separator(texts, &request.source_lang, &request.target_lang)
                .await
            {
                return Ok(results);
            }
        }

        debug!("Using parallel translation for {} texts", texts.len());
        Ok(self
            .translate_parallel(texts, &request.source_lang, &request.target_lang)
            .await)
    }
}
