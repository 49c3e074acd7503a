//! HTTP-level tests for the OpenAI-compatible backend against a mock server.

#![cfg(feature = "openai")]

use whisk_core::{Error, GenerationBackend, GenerationOptions};
use whisk_inference::openai::{OpenAIBackend, OpenAIConfig};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(uri: String) -> OpenAIConfig {
    OpenAIConfig {
        base_url: uri,
        api_key: Some("test-key".to_string()),
        gen_model: "gemini-2.0-flash".to_string(),
        timeout_seconds: 5,
    }
}

fn completion(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-1",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
    })
}

#[tokio::test]
async fn test_json_mode_request_shape_and_auth() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer test-key"))
        .and(header("Content-Type", "application/json"))
        .and(body_partial_json(serde_json::json!({
            "model": "gemini-2.0-flash",
            "max_tokens": 2048,
            "response_format": {"type": "json_object"},
            "stream": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("{\"name\":\"Dal\"}")))
        .expect(1)
        .mount(&server)
        .await;

    let backend = OpenAIBackend::new(config(server.uri())).unwrap();
    let options = GenerationOptions::new().temperature(0.2).max_tokens(2048).json();
    let reply = backend.generate_with_options("Normalize", &options).await.unwrap();
    assert_eq!(reply, "{\"name\":\"Dal\"}");
}

#[tokio::test]
async fn test_trailing_slash_in_base_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let backend = OpenAIBackend::new(config(format!("{}/", server.uri()))).unwrap();
    assert_eq!(backend.generate("hi").await.unwrap(), "ok");
}

#[tokio::test]
async fn test_empty_choices_yield_empty_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
        .mount(&server)
        .await;

    let backend = OpenAIBackend::new(config(server.uri())).unwrap();
    assert_eq!(backend.generate("hi").await.unwrap(), "");
}

#[tokio::test]
async fn test_auth_failure_is_config_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": {"message": "Incorrect API key", "type": "invalid_request_error", "code": "invalid_api_key"}
        })))
        .mount(&server)
        .await;

    let backend = OpenAIBackend::new(config(server.uri())).unwrap();
    let err = backend.generate("hi").await.unwrap_err();
    assert!(matches!(err, Error::Config(msg) if msg.contains("Incorrect API key")));
}

#[tokio::test]
async fn test_server_error_without_body_is_inference_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let backend = OpenAIBackend::new(config(server.uri())).unwrap();
    let err = backend.generate("hi").await.unwrap_err();
    assert!(matches!(err, Error::Inference(msg) if msg.contains("Server error")));
}
