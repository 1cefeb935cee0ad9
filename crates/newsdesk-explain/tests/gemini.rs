//! Integration tests for `GeminiClient` and `Explainer` using wiremock HTTP mocks.

use std::sync::Arc;

use newsdesk_explain::{
    ExplainError, ExplainMode, Explainer, ExplanationOrigin, GeminiClient, JsonFileCache,
    TextGenerator,
};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATE_PATH: &str = "/v1beta/models/gemini-flash-latest:generateContent";

fn test_client(base_url: &str) -> GeminiClient {
    GeminiClient::with_base_url("test-key", "gemini-flash-latest", 10, base_url)
        .expect("client construction should not fail")
}

fn reply(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

#[tokio::test]
async fn generate_posts_prompt_and_returns_trimmed_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(serde_json::json!({
            "contents": [{ "parts": [{ "text": "Explain like I am 5 years old:\nRates rose." }] }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply("  Money costs more now.\n")))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let text = client
        .generate(&ExplainMode::Kid.prompt("Rates rose."))
        .await
        .expect("generation should succeed");

    assert_eq!(text, "Money costs more now.");
}

#[tokio::test]
async fn generate_surfaces_http_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exhausted"))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .generate("hello")
        .await
        .unwrap_err();

    assert!(matches!(err, ExplainError::UnexpectedStatus { status: 429, ref body } if body == "quota exhausted"));
}

#[tokio::test]
async fn generate_rejects_empty_candidates() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .generate("hello")
        .await
        .unwrap_err();

    assert!(matches!(err, ExplainError::EmptyResponse));
}

#[tokio::test]
async fn explainer_caches_to_disk_and_skips_second_call() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply("- Rates rose")))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let cache_path = dir.path().join("explain_cache.json");

    let explainer = Explainer::new(
        Arc::new(JsonFileCache::new(&cache_path)),
        Arc::new(test_client(&server.uri())),
    );
    let first = explainer.explain("Rates rose.", ExplainMode::Bullets).await;
    assert_eq!(first.origin, ExplanationOrigin::Generated);

    // A fresh cache instance reads the persisted entry.
    let explainer = Explainer::new(
        Arc::new(JsonFileCache::new(&cache_path)),
        Arc::new(test_client(&server.uri())),
    );
    let second = explainer.explain("Rates rose.", ExplainMode::Bullets).await;
    assert_eq!(second.origin, ExplanationOrigin::Cache);
    assert_eq!(second.text, "- Rates rose");
}

#[tokio::test]
async fn explainer_returns_failure_message_when_generator_is_down() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let explainer = Explainer::new(
        Arc::new(newsdesk_explain::MemoryCache::default()),
        Arc::new(test_client(&server.uri())),
    );
    let out = explainer.explain("Rates rose.", ExplainMode::Plain).await;
    assert_eq!(out.text, "AI explanation failed.");
    assert_eq!(out.origin, ExplanationOrigin::Failed);
}
