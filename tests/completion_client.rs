//! HTTP-level tests for the completion client
//!
//! Each test binds a throwaway axum server on 127.0.0.1 that plays the
//! role of the completion provider.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use repair_triage_api::agents::{AgentError, ClaudeClient, CompletionClient, CompletionRequest};
use repair_triage_api::config::CompletionConfig;
use serde_json::{json, Value};

/// Start a stub provider and return its base address
async fn spawn_provider(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub provider");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    addr
}

fn client_for(addr: SocketAddr, api_key: Option<&str>, timeout: Duration) -> ClaudeClient {
    ClaudeClient::new(CompletionConfig {
        api_key: api_key.map(str::to_string),
        api_url: format!("http://{}/v1/messages", addr),
        timeout,
        ..CompletionConfig::default()
    })
    .unwrap()
}

fn request() -> CompletionRequest {
    CompletionRequest {
        model_id: "claude-3-5-sonnet-20241022".to_string(),
        max_tokens: 2048,
        combined_prompt: "Base\n\nCustomer Information:\n\n\nCustomer Request:\nSink leaks"
            .to_string(),
    }
}

#[tokio::test]
async fn test_send_returns_first_text_and_sends_expected_request() {
    async fn messages(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        let authorized = headers.get("x-api-key").map(|v| v == "test-key").unwrap_or(false)
            && headers.get("anthropic-version").map(|v| v == "2023-06-01").unwrap_or(false);
        let well_formed = body["model"] == "claude-3-5-sonnet-20241022"
            && body["max_tokens"] == 2048
            && body["messages"][0]["role"] == "user"
            && body["messages"][0]["content"]
                .as_str()
                .map_or(false, |c| c.ends_with("Sink leaks"));

        if authorized && well_formed {
            (
                StatusCode::OK,
                Json(json!({"content": [{"type": "text", "text": "{\"parts_needed\": false}"}]})),
            )
        } else {
            (StatusCode::BAD_REQUEST, Json(json!({"error": "unexpected request"})))
        }
    }

    let addr = spawn_provider(Router::new().route("/v1/messages", post(messages))).await;
    let client = client_for(addr, Some("test-key"), Duration::from_secs(5));

    let text = client.send(&request()).await.unwrap();

    assert_eq!(text, "{\"parts_needed\": false}");
}

#[tokio::test]
async fn test_non_success_status_carries_code_and_body() {
    async fn overloaded() -> (StatusCode, &'static str) {
        (StatusCode::SERVICE_UNAVAILABLE, "overloaded")
    }

    let addr = spawn_provider(Router::new().route("/v1/messages", post(overloaded))).await;
    let client = client_for(addr, Some("test-key"), Duration::from_secs(5));

    match client.send(&request()).await {
        Err(AgentError::ApiStatus { status, body }) => {
            assert_eq!(status, 503);
            assert_eq!(body, "overloaded");
        }
        other => panic!("expected ApiStatus, got {:?}", other),
    }
}

#[tokio::test]
async fn test_payload_without_content_is_malformed() {
    async fn no_content() -> Json<Value> {
        Json(json!({"id": "msg_1", "type": "message"}))
    }

    let addr = spawn_provider(Router::new().route("/v1/messages", post(no_content))).await;
    let client = client_for(addr, Some("test-key"), Duration::from_secs(5));

    assert!(matches!(
        client.send(&request()).await,
        Err(AgentError::MalformedResponse(_))
    ));
}

#[tokio::test]
async fn test_slow_provider_times_out_as_network_error() {
    async fn slow() -> Json<Value> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Json(json!({"content": [{"text": "too late"}]}))
    }

    let addr = spawn_provider(Router::new().route("/v1/messages", post(slow))).await;
    let client = client_for(addr, Some("test-key"), Duration::from_millis(200));

    assert!(matches!(
        client.send(&request()).await,
        Err(AgentError::NetworkError(_))
    ));
}

#[tokio::test]
async fn test_body_stalling_after_headers_is_network_error() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    // Raw socket so the status line goes out before the body is complete
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 8192];
        let _ = socket.read(&mut buf).await;
        let head = b"HTTP/1.1 200 OK\r\n\
            content-type: application/json\r\n\
            content-length: 100\r\n\r\n";
        socket.write_all(head).await.unwrap();
        socket.write_all(b"{\"content\":").await.unwrap();
        socket.flush().await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
    });

    let client = client_for(addr, Some("test-key"), Duration::from_millis(300));

    let result = client.send(&request()).await;

    assert!(
        matches!(result, Err(AgentError::NetworkError(_))),
        "expected NetworkError, got {:?}",
        result
    );
}

#[tokio::test]
async fn test_unreachable_provider_is_network_error() {
    // Bind then drop to get a port with nothing listening
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(addr, Some("test-key"), Duration::from_secs(2));

    assert!(matches!(
        client.send(&request()).await,
        Err(AgentError::NetworkError(_))
    ));
}

#[tokio::test]
async fn test_missing_api_key_is_auth_error() {
    let addr: SocketAddr = "127.0.0.1:9".parse().unwrap();
    let client = client_for(addr, None, Duration::from_secs(1));

    assert!(matches!(
        client.send(&request()).await,
        Err(AgentError::AuthError(_))
    ));
}
