//! Integration Tests for the Request Client
//!
//! Drives the client against a wiremock server, and against a listener that
//! drops every connection to simulate network faults.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use nuance_client::models::{ChatMessage, EndedBy};
use nuance_client::{with_retry, ApiClient, ErrorKind, RetryPolicy};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// == Helper Functions ==

const FAST_RETRY: RetryPolicy = RetryPolicy {
    retries: 2,
    delay: Duration::from_millis(50),
};

fn client_for(base: &str) -> ApiClient {
    ApiClient::new(base, Duration::from_secs(5), FAST_RETRY).unwrap()
}

async fn mock_api() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let api = client_for(&format!("{}/api", server.uri()));
    (server, api)
}

/// Accepts connections and closes them at once, counting each attempt.
async fn dropping_server() -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accepted = Arc::new(AtomicUsize::new(0));
    let counter = accepted.clone();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            drop(socket);
        }
    });

    (format!("http://{}/api", addr), accepted)
}

/// Starts a listener that answers every request with a 500 whose body stops
/// short of its declared length, then hangs up.
async fn truncating_server() -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accepted = Arc::new(AtomicUsize::new(0));
    let counter = accepted.clone();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            let mut buf = [0u8; 2048];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(
                    b"HTTP/1.1 500 Internal Server Error\r\n\
                      Content-Type: application/json\r\n\
                      Content-Length: 100\r\n\r\n{\"error\":",
                )
                .await;
            let _ = socket.shutdown().await;
        }
    });

    (format!("http://{}/api", addr), accepted)
}

// == Success Paths ==

#[tokio::test]
async fn test_start_session_success() {
    let (server, api) = mock_api().await;

    Mock::given(method("POST"))
        .and(path("/api/start"))
        .and(body_json(json!({"session_id": "s1", "mood": "happy"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "What happened that made you feel happy?",
            "turns_left": 5,
            "session_active": true,
            "error": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = api.start_session("s1", "happy").await.unwrap();
    assert_eq!(reply.response, "What happened that made you feel happy?");
    assert_eq!(reply.turns_left, 5);
    assert!(reply.session_active);
}

#[tokio::test]
async fn test_send_message_session_ended() {
    let (server, api) = mock_api().await;

    Mock::given(method("POST"))
        .and(path("/api/reply"))
        .and(body_json(json!({"session_id": "s1", "user_input": "stop"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "Thank you for sharing! Ready to generate your English article now?",
            "turns_left": 0,
            "session_active": false,
            "ended_by": "user",
            "error": null
        })))
        .mount(&server)
        .await;

    let reply = api.send_message("s1", "stop").await.unwrap();
    assert!(!reply.session_active);
    assert_eq!(reply.ended_by, Some(EndedBy::User));
}

#[tokio::test]
async fn test_history_and_end_session() {
    let (server, api) = mock_api().await;

    Mock::given(method("GET"))
        .and(path("/api/history/s1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "session_id": "s1",
            "history": [
                {"role": "system", "content": "mood: calm"},
                {"role": "ai", "content": "How was your day?"},
                {"role": "human", "content": "I go to park"}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/end/s1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "success", "session_id": "s1"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let history = api.get_history("s1").await.unwrap();
    assert_eq!(
        history.chat_messages(),
        vec![
            ChatMessage::ai("How was your day?"),
            ChatMessage::user("I go to park")
        ]
    );

    let ended = api.end_session("s1").await.unwrap();
    assert_eq!(ended.status, "success");
}

#[tokio::test]
async fn test_generate_article_success() {
    let (server, api) = mock_api().await;

    Mock::given(method("POST"))
        .and(path("/api/generate-article"))
        .and(body_json(json!({"session_id": "s1", "mood": "excited"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "session_id": "s1",
            "article": "Today I finally visited the sea.",
            "word_count": 6,
            "generated_at": "2024-05-01T10:00:00.123456"
        })))
        .mount(&server)
        .await;

    let article = api.generate_article("s1", "excited").await.unwrap();
    assert_eq!(article.word_count, 6);
    assert_eq!(article.generated_at, "2024-05-01T10:00:00.123456");
}

#[tokio::test]
async fn test_analyze_writing_both_ways() {
    let (server, api) = mock_api().await;
    let analysis = json!({
        "status": "success",
        "analysis": {
            "corrections": [{
                "type": "grammar",
                "original": "I goes to school",
                "suggestion": "I go to school",
                "explanation": "first person takes the base form"
            }],
            "total_errors": 1
        },
        "analyzed_at": "2024-05-01T10:00:00"
    });

    Mock::given(method("POST"))
        .and(path("/api/analyze-writing"))
        .and(body_json(json!({
            "conversation_data": [{"type": "user", "text": "I goes to school", "time": "10:01"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(analysis.clone()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/analyze-writing"))
        .and(body_json(json!({"session_id": "s1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(analysis))
        .expect(1)
        .mount(&server)
        .await;

    let turns = [ChatMessage::user("I goes to school").at("10:01")];
    let by_data = api.analyze_writing_with_data(&turns).await.unwrap();
    let by_session = api.analyze_writing_by_session("s1").await.unwrap();

    assert_eq!(by_data.analysis.total_errors, 1);
    assert_eq!(by_data, by_session);
}

#[tokio::test]
async fn test_health() {
    let (server, api) = mock_api().await;

    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "healthy", "service": "conversation-api"})),
        )
        .mount(&server)
        .await;

    assert!(api.health().await.unwrap().is_healthy());
}

// == Error Normalization ==

#[tokio::test]
async fn test_application_error_in_success_response() {
    let (server, api) = mock_api().await;
    let body = json!({
        "error": "invalid session",
        "response": "Invalid session. Please start a new conversation.",
        "session_active": false,
        "turns_left": 0
    });

    Mock::given(method("POST"))
        .and(path("/api/reply"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let err = api.send_message("s1", "hello").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Application);
    assert_eq!(err.message(), "invalid session");
    assert_eq!(err.status(), None);
    assert_eq!(err.details(), Some(&body));
}

#[tokio::test]
async fn test_application_error_not_retried_for_idempotent_call() {
    let (server, api) = mock_api().await;

    Mock::given(method("POST"))
        .and(path("/api/generate-article"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"error": "Article generation failed"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = api.generate_article("s1", "sad").await.unwrap_err();
    assert_eq!(err.message(), "Article generation failed");
}

#[tokio::test]
async fn test_server_error_surfaces_status_without_retry() {
    let (server, api) = mock_api().await;
    let body = json!({"error": "No conversation history found"});

    Mock::given(method("GET"))
        .and(path("/api/history/ghost"))
        .respond_with(ResponseTemplate::new(404).set_body_json(body.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let err = api.get_history("ghost").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Server);
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.message(), "No conversation history found");
    assert_eq!(err.details(), Some(&body));
}

#[tokio::test]
async fn test_server_error_without_json_body() {
    let (server, api) = mock_api().await;

    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .expect(1)
        .mount(&server)
        .await;

    let err = api.health().await.unwrap_err();
    assert_eq!(err.status(), Some(502));
    assert_eq!(err.message(), "API Error");
    assert_eq!(err.details(), Some(&json!("Bad Gateway")));
}

#[tokio::test]
async fn test_unexpected_success_body_is_decode_error() {
    let (server, api) = mock_api().await;

    Mock::given(method("GET"))
        .and(path("/api/history/s1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"history": "nope"})))
        .expect(1)
        .mount(&server)
        .await;

    let err = api.get_history("s1").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
    assert_eq!(err.status(), None);
}

// == Network Faults and Retry ==

#[tokio::test]
async fn test_network_failure_retried_with_delay() {
    let (base, accepted) = dropping_server().await;
    let api = client_for(&base);
    let started = Instant::now();

    let err = api.get_history("s1").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Network);
    assert_eq!(err.status(), None);
    assert_eq!(err.message(), "Network Error: No response received");
    assert_eq!(accepted.load(Ordering::SeqCst), 3);
    assert!(started.elapsed() >= Duration::from_millis(100));
}

#[tokio::test]
async fn test_truncated_error_body_keeps_status_and_is_not_retried() {
    let (base, accepted) = truncating_server().await;
    let api = client_for(&base);

    let err = api.get_history("s1").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Server);
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.message(), "API Error");
    assert!(err.details().is_none());
    assert_eq!(accepted.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_non_idempotent_call_attempted_once() {
    let (base, accepted) = dropping_server().await;
    let api = client_for(&base);

    let err = api.send_message("s1", "hello").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Network);
    assert_eq!(accepted.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_caller_can_opt_in_to_retry() {
    let (base, accepted) = dropping_server().await;
    let api = client_for(&base);

    let result = with_retry(FAST_RETRY, || api.send_message("s1", "hello")).await;

    assert!(result.is_err());
    assert_eq!(accepted.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = ApiClient::new(
        &format!("http://{}/api", addr),
        Duration::from_secs(5),
        RetryPolicy::none(),
    )
    .unwrap();

    let err = api.health().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_timeout_is_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/start"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"response": "late"}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let api = ApiClient::new(
        &format!("{}/api", server.uri()),
        Duration::from_millis(200),
        RetryPolicy::none(),
    )
    .unwrap();

    let err = api.start_session("s1", "tired").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
    assert_eq!(err.status(), None);
}
