//! Provider HTTP contracts, exercised against wiremock.

use insightgen::inference::anthropic::AnthropicClient;
use insightgen::inference::workers_ai::WorkersAiClient;
use insightgen::inference::{InferenceClient, Prompt};
use insightgen::prompts::summary::build_summary_prompt;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LLAMA: &str = "@cf/meta/llama-3.3-70b-instruct-fp8-fast";

fn workers_client(server: &MockServer) -> WorkersAiClient {
    WorkersAiClient::new("acct-123".to_string(), "cf-token".to_string())
        .with_base_url(server.uri())
}

fn prompt() -> Prompt {
    build_summary_prompt("Quantum Physics")
}

// ── Workers AI ────────────────────────────────────────────────────

#[tokio::test]
async fn workers_ai_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/accounts/acct-123/ai/run/{LLAMA}")))
        .and(header("authorization", "Bearer cf-token"))
        .and(body_partial_json(json!({
            "messages": [
                {"role": "system", "content": prompt().system},
                {"role": "user", "content": "Explain this topic simply: Quantum Physics"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "errors": [],
            "messages": [],
            "result": {
                "response": "Quantum physics studies tiny particles.",
                "usage": {"prompt_tokens": 40, "completion_tokens": 8, "total_tokens": 48}
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let generation = workers_client(&server)
        .generate(LLAMA, &prompt())
        .await
        .expect("generate failed");

    assert_eq!(generation.text, "Quantum physics studies tiny particles.");
    assert_eq!(generation.usage.map(|u| u.total()), Some(48));
}

#[tokio::test]
async fn workers_ai_http_error_is_reported_once() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("capacity exceeded"))
        .expect(1)
        .mount(&server)
        .await;

    let err = workers_client(&server)
        .generate(LLAMA, &prompt())
        .await
        .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("503"), "{msg}");
    assert!(msg.contains("capacity exceeded"), "{msg}");
}

#[tokio::test]
async fn workers_ai_unsuccessful_envelope() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "errors": [{"code": 10000, "message": "Authentication error"}],
            "result": null
        })))
        .mount(&server)
        .await;

    let err = workers_client(&server)
        .generate(LLAMA, &prompt())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Authentication error"));
}

#[tokio::test]
async fn workers_ai_non_json_body_fails() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    assert!(
        workers_client(&server)
            .generate(LLAMA, &prompt())
            .await
            .is_err()
    );
}

// ── Anthropic ─────────────────────────────────────────────────────

#[tokio::test]
async fn anthropic_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "sk-test"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({
            "model": "claude-test",
            "system": prompt().system,
            "messages": [{"role": "user", "content": "Explain this topic simply: Quantum Physics"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{"type": "text", "text": "Tiny things behave oddly."}],
            "usage": {"input_tokens": 20, "output_tokens": 6}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = AnthropicClient::new("sk-test".to_string())
        .with_url(format!("{}/v1/messages", server.uri()));
    let generation = client.generate("claude-test", &prompt()).await.unwrap();

    assert_eq!(generation.text, "Tiny things behave oddly.");
    let usage = generation.usage.unwrap();
    assert_eq!(usage.input_tokens, 20);
    assert_eq!(usage.output_tokens, 6);
}

#[tokio::test]
async fn anthropic_empty_content_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content": []})))
        .mount(&server)
        .await;

    let client = AnthropicClient::new("sk-test".to_string()).with_url(server.uri());
    let err = client.generate("claude-test", &prompt()).await.unwrap_err();
    assert!(err.to_string().contains("empty response"));
}

#[tokio::test]
async fn anthropic_api_error_includes_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid x-api-key"))
        .mount(&server)
        .await;

    let client = AnthropicClient::new("bad".to_string()).with_url(server.uri());
    let err = client.generate("claude-test", &prompt()).await.unwrap_err();
    assert!(err.to_string().contains("401"));
}
