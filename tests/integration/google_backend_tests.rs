/*!
 * Integration tests for the racing Google backend against local mock servers
 */

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sublocalizer::providers::google::GoogleBackend;
use sublocalizer::{TranslationRequest, TranslatorBackend};

const BATCH_SEPARATOR: &str = "\n|||RNLSEP999|||\n";

/// Google wire format: segments of [translated, original, ...]
fn google_body(translated: &str, original: &str) -> serde_json::Value {
    json!([[[translated, original, null]], null, "en"])
}

fn backend_over(endpoints: Vec<String>, lingva: Vec<String>) -> GoogleBackend {
    GoogleBackend::with_endpoints(endpoints, lingva, 5, None).unwrap()
}

async fn mount_translation(server: &MockServer, query: &str, translated: &str) {
    Mock::given(method("GET"))
        .and(path("/translate_a/single"))
        .and(query_param("q", query))
        .respond_with(ResponseTemplate::new(200).set_body_json(google_body(translated, query)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_translateTexts_singleText_shouldReturnTranslation() {
    let server = MockServer::start().await;
    mount_translation(&server, "Hello", "Merhaba").await;

    let endpoint = format!("{}/translate_a/single", server.uri());
    let backend = backend_over(vec![endpoint.clone()], Vec::new());

    let request = TranslationRequest::new(vec!["Hello".to_string()], "en", "tr");
    let results = backend.translate_texts(&request).await.unwrap();

    assert_eq!(results, vec!["Merhaba".to_string()]);
    assert_eq!(backend.failure_count(&endpoint), 0);
}

#[tokio::test]
async fn test_translateTexts_failingEndpoint_shouldAccumulateFailures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let endpoint = format!("{}/translate_a/single", server.uri());
    let backend = backend_over(vec![endpoint.clone()], Vec::new());
    let request = TranslationRequest::new(vec!["Hello".to_string()], "en", "tr");

    // Every fallback tier fails; the text degrades to an empty translation
    let results = backend.translate_texts(&request).await.unwrap();
    assert_eq!(results, vec![String::new()]);

    let after_first = backend.failure_count(&endpoint);
    assert!(after_first >= 1);

    backend.translate_texts(&request).await.unwrap();
    assert!(backend.failure_count(&endpoint) > after_first);
}

#[tokio::test]
async fn test_translateTexts_mixedEndpoints_shouldWinRaceAndTallyLoser() {
    let failing = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&failing)
        .await;

    let healthy = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/translate_a/single"))
        .and(query_param("q", "Hello"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(google_body("Merhaba", "Hello"))
                .set_delay(std::time::Duration::from_millis(200)),
        )
        .mount(&healthy)
        .await;

    let failing_endpoint = format!("{}/translate_a/single", failing.uri());
    let healthy_endpoint = format!("{}/translate_a/single", healthy.uri());
    let backend = backend_over(vec![failing_endpoint.clone(), healthy_endpoint], Vec::new());
    let request = TranslationRequest::new(vec!["Hello".to_string()], "en", "tr");

    // The slow healthy mirror still wins; the fast 500 tallies a failure
    let results = backend.translate_texts(&request).await.unwrap();
    assert_eq!(results, vec!["Merhaba".to_string()]);
    assert_eq!(backend.failure_count(&failing_endpoint), 1);

    let results = backend.translate_texts(&request).await.unwrap();
    assert_eq!(results, vec!["Merhaba".to_string()]);
    assert_eq!(backend.failure_count(&failing_endpoint), 2);
}

#[tokio::test]
async fn test_translateTexts_smallBatch_shouldUseSeparatorJoining() {
    let server = MockServer::start().await;
    let combined = format!("Hello{}World", BATCH_SEPARATOR);
    let translated = format!("Merhaba{}Dünya", BATCH_SEPARATOR);
    mount_translation(&server, &combined, &translated).await;

    let endpoint = format!("{}/translate_a/single", server.uri());
    let backend = backend_over(vec![endpoint], Vec::new());

    let request = TranslationRequest::new(vec!["Hello".to_string(), "World".to_string()], "en", "tr");
    let results = backend.translate_texts(&request).await.unwrap();

    assert_eq!(results, vec!["Merhaba".to_string(), "Dünya".to_string()]);
    // One request carried both texts
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_translateTexts_separatorLostInTranslation_shouldFallBackToParallel() {
    let server = MockServer::start().await;
    let combined = format!("Hello{}World", BATCH_SEPARATOR);

    // The joined request comes back without the separator surviving
    mount_translation(&server, &combined, "Merhaba Dünya").await;
    mount_translation(&server, "Hello", "Merhaba").await;
    mount_translation(&server, "World", "Dünya").await;

    let endpoint = format!("{}/translate_a/single", server.uri());
    let backend = backend_over(vec![endpoint.clone()], Vec::new());

    let request = TranslationRequest::new(vec!["Hello".to_string(), "World".to_string()], "en", "tr");
    let results = backend.translate_texts(&request).await.unwrap();

    assert_eq!(results, vec!["Merhaba".to_string(), "Dünya".to_string()]);
    // A count mismatch is not the endpoint's fault
    assert_eq!(backend.failure_count(&endpoint), 0);
}

#[tokio::test]
async fn test_translateTexts_googleDown_shouldFallBackToLingva() {
    let google = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&google)
        .await;

    let lingva = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/en/tr/Hello"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"translation": "Merhaba"})))
        .mount(&lingva)
        .await;

    let backend = backend_over(
        vec![format!("{}/translate_a/single", google.uri())],
        vec![lingva.uri()],
    );

    let request = TranslationRequest::new(vec!["Hello".to_string()], "en", "tr");
    let results = backend.translate_texts(&request).await.unwrap();

    assert_eq!(results, vec!["Merhaba".to_string()]);
}

#[tokio::test]
async fn test_translateTexts_everyTierDown_shouldIsolatePerTextFailures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let endpoint = format!("{}/translate_a/single", server.uri());
    let backend = backend_over(vec![endpoint], Vec::new());

    let request = TranslationRequest::new(vec!["Hello".to_string(), "World".to_string()], "en", "tr");
    let results = backend.translate_texts(&request).await.unwrap();

    // Failures degrade to empty strings instead of failing the batch
    assert_eq!(results, vec![String::new(), String::new()]);
}

#[tokio::test]
async fn test_translateTexts_emptyInput_shouldShortCircuit() {
    let backend = backend_over(vec!["http://127.0.0.1:1/translate_a/single".to_string()], Vec::new());

    let request = TranslationRequest::new(Vec::new(), "en", "tr");
    let results = backend.translate_texts(&request).await.unwrap();
    assert!(results.is_empty());
}
