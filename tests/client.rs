//! Integration tests for the streaming client using wiremock.

use futures::StreamExt;
use nanostream::client::LLMClient;
use nanostream::config::Config;
use nanostream::error::NanoError;
use nanostream::sink::write_stream;
use nanostream::types::Role;
use nanostream::utils::message;
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sse_body(contents: &[&str]) -> String {
    let mut body = String::from(": OPENROUTER PROCESSING\n\n");
    for content in contents {
        let event = json!({
            "id": "gen-1",
            "object": "chat.completion.chunk",
            "choices": [{ "index": 0, "delta": { "role": "assistant", "content": content }, "finish_reason": null }]
        });
        body.push_str(&format!("data: {}\n\n", event));
    }
    body.push_str("data: [DONE]\n\n");
    body
}

fn client_for(server: &MockServer) -> LLMClient {
    let config = Config::new("test-api-key")
        .with_api_base(format!("{}/api/v1", server.uri()))
        .with_model("qwen/qwen3-235b-a22b-2507".to_string());
    LLMClient::new(config)
}

#[tokio::test]
async fn stream_sends_bearer_header_and_streaming_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .and(header("authorization", "Bearer test-api-key"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "model": "qwen/qwen3-235b-a22b-2507",
            "messages": [{ "role": "user", "content": "Tell me a joke." }],
            "stream": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(sse_body(&["Why", " not?"]), "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let tokens: Vec<String> = client
        .stream_generate("Tell me a joke.")
        .await
        .unwrap()
        .map(|token| token.unwrap())
        .collect()
        .await;

    assert_eq!(tokens, vec!["Why", " not?"]);
}

#[tokio::test]
async fn generate_concatenates_tokens() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(sse_body(&["Knock", ", ", "knock", ""]), "text/event-stream"))
        .mount(&server)
        .await;

    let text = client_for(&server).generate("joke").await.unwrap();
    assert_eq!(text, "Knock, knock");
}

#[tokio::test]
async fn stream_chat_prepends_system_message_and_parameters() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .and(body_partial_json(json!({
            "messages": [
                { "role": "system", "content": "Be brief." },
                { "role": "user", "content": "hi" }
            ],
            "max_tokens": 16,
            "stream": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(sse_body(&["ok"]), "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let config = Config::new("k")
        .with_api_base(format!("{}/api/v1", server.uri()))
        .with_system_message("Be brief.".to_string())
        .with_max_tokens(16);
    let client = LLMClient::new(config);

    let stream = client.stream_chat(&[message(Role::User, "hi")]).await.unwrap();
    let mut out = Vec::new();
    let text = write_stream(stream, &mut out).await.unwrap();

    assert_eq!(text, "ok");
    assert_eq!(out, b"ok");
}

#[tokio::test]
async fn stream_ignores_events_after_done_and_malformed_lines() {
    let server = MockServer::start().await;

    let body = concat!(
        "data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\n",
        "data: {broken\n",
        "event: ping\n",
        "data: {\"error\":{\"message\":\"overloaded\"}}\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"b\"}}]}\n",
        "data: [DONE]\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"c\"}}]}\n",
    );
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let text = client_for(&server).generate("x").await.unwrap();
    assert_eq!(text, "ab");
}

#[tokio::test]
async fn unauthorized_maps_to_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("{\"error\":{\"message\":\"No auth credentials found\"}}"))
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server).stream_generate("x").await;
    assert!(matches!(result, Err(NanoError::Auth(m)) if m.contains("No auth credentials")));
}

#[tokio::test]
async fn server_error_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server).generate("x").await;
    assert!(matches!(
        result,
        Err(NanoError::Api { status, .. }) if status.as_u16() == 503
    ));
}
