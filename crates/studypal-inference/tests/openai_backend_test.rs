//! Wire-level tests for the OpenAI-compatible backend.
//!
//! Runs the backend against a wiremock server standing in for the
//! chat completions endpoint.

#![cfg(feature = "openai")]

use serde_json::json;
use studypal_core::{Error, GenerationBackend, GenerationOptions};
use studypal_inference::openai::{OpenAIBackend, OpenAIConfig};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn chat_response(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-123",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
    })
}

fn config_for(server: &MockServer) -> OpenAIConfig {
    OpenAIConfig {
        base_url: server.uri(),
        api_key: Some("test-key".to_string()),
        model: "test-gen".to_string(),
        timeout_seconds: 10,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_generation_sends_bearer_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer test-key"))
        .and(body_partial_json(json!({"model": "test-gen", "stream": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response("Hello!")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = OpenAIBackend::new(config_for(&mock_server)).expect("Failed to create backend");

    let result = backend.generate("Hi").await;
    assert_eq!(result.unwrap(), "Hello!");
}

#[tokio::test]
async fn test_empty_completion_is_upstream_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response("  ")))
        .mount(&mock_server)
        .await;

    let backend = OpenAIBackend::new(config_for(&mock_server)).unwrap();
    let err = backend.generate("Hi").await.unwrap_err();
    assert!(matches!(err, Error::UpstreamFailure(_)));
}

#[tokio::test]
async fn test_schema_sent_as_json_schema_format() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({
            "response_format": {
                "type": "json_schema",
                "json_schema": {"name": "study_material", "schema": {"type": "array"}}
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response("[]")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = OpenAIBackend::new(config_for(&mock_server)).unwrap();
    let text = backend
        .generate_json("Quiz", Some(json!({"type": "ARRAY"})))
        .await
        .unwrap();
    assert_eq!(text, "[]");
}

#[tokio::test]
async fn test_grounded_request_answers_without_citations() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response("[]")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = OpenAIBackend::new(config_for(&mock_server)).unwrap();
    let output = backend.generate_grounded("Find papers").await.unwrap();
    assert_eq!(output.text, "[]");
    assert!(output.citations.is_empty());
}

#[tokio::test]
async fn test_rate_limit_is_upstream_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {"message": "Slow down", "type": "rate_limit_exceeded", "code": null}
        })))
        .mount(&mock_server)
        .await;

    let backend = OpenAIBackend::new(config_for(&mock_server)).unwrap();
    let err = backend
        .generate_with_options("x", &GenerationOptions::text())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UpstreamFailure(ref m) if m.contains("rate limited")));
}

#[tokio::test]
async fn test_health_check_lists_models() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/models"))
        .and(header("Authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = OpenAIBackend::new(config_for(&mock_server)).unwrap();
    assert!(backend.health_check().await.unwrap());
}

#[tokio::test]
async fn test_non_json_error_body_is_kept() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&mock_server)
        .await;

    let backend = OpenAIBackend::new(config_for(&mock_server)).unwrap();
    let err = backend.generate("x").await.unwrap_err();
    assert!(matches!(err, Error::UpstreamFailure(ref m) if m.contains("endpoint unavailable") && m.contains("Bad Gateway")));
}
