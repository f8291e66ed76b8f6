//! End-to-end tests for `POST /api/analyze-image`.
//!
//! A fake Groq endpoint is served by axum on an ephemeral port and the real
//! `PavementAnalyzer` is pointed at it.

use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    routing::post,
    Json, Router,
};
use llm_bridge::{GroqConfig, PavementAnalyzer};
use secrecy::SecretString;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;
use walksafe_server::config::DEFAULT_MAX_BODY_BYTES;
use walksafe_server::page::Page;
use walksafe_server::{analysis_router, AppState};

const SECRET: &str = "gsk_test_secret_0123456789";
const CRACK: &str = r#"{"issueType":"crack","estimatedLengthMeters":1.2,"estimatedBreadthMeters":0.3,"imageTimestamp":"null","confidenceScore":0.8,"analysisNotes":"visible crack","faceBoxes":[]}"#;

/// Serve `router` on 127.0.0.1 and return the chat-completions URL
async fn spawn_upstream(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}/openai/v1/chat/completions", addr)
}

/// Fake Groq endpoint: checks the bearer token, answers with `content`
fn completion_upstream(content: &'static str) -> Router {
    Router::new().route(
        "/openai/v1/chat/completions",
        post(move |headers: HeaderMap, Json(request): Json<Value>| async move {
            let authorized = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                == Some(format!("Bearer {}", SECRET).as_str());
            if !authorized {
                return (StatusCode::UNAUTHORIZED, "bad token".to_string());
            }
            if request["response_format"]["type"] != "json_object" {
                return (StatusCode::BAD_REQUEST, "json mode required".to_string());
            }

            let body = json!({
                "id": "chatcmpl-test",
                "model": request["model"],
                "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
            });
            (StatusCode::OK, body.to_string())
        }),
    )
}

/// Fake Groq endpoint answering every call with a fixed status and body
fn fixed_upstream(status: StatusCode, body: &'static str) -> Router {
    Router::new().route(
        "/openai/v1/chat/completions",
        post(move || async move { (status, body) }),
    )
}

fn app(base_url: String, timeout_secs: u64, sanitize: bool) -> Router {
    let mut groq = GroqConfig::new(SecretString::new(SECRET.to_string()));
    groq.base_url = base_url;
    groq.timeout_secs = timeout_secs;

    let analyzer = PavementAnalyzer::from_config(groq)
        .expect("Failed to build analyzer")
        .with_sanitize(sanitize);
    analysis_router(
        AppState::new(Arc::new(analyzer), Page::embedded()),
        DEFAULT_MAX_BODY_BYTES,
    )
}

/// Post an image and return status plus raw body text
async fn analyze(app: Router) -> (StatusCode, String) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/analyze-image")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"image_base64":"/9j/4AAQSkZJRg=="}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn well_formed_analysis_is_returned_verbatim() {
    let url = spawn_upstream(completion_upstream(CRACK)).await;
    let (status, body) = analyze(app(url, 5, false)).await;

    assert_eq!(status, StatusCode::OK);
    let expected: Value = serde_json::from_str(CRACK).unwrap();
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), expected);
    assert!(!body.contains(SECRET));
}

#[tokio::test]
async fn non_json_content_is_a_parse_failure() {
    let url = spawn_upstream(completion_upstream("There is a crack in the sidewalk.")).await;
    let (status, body) = analyze(app(url, 5, false)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let value: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["error"], "Failed to parse Groq response");
    assert!(value["details"].as_str().is_some_and(|d| !d.is_empty()));
    assert!(!body.contains(SECRET));
}

#[tokio::test]
async fn non_json_envelope_is_a_parse_failure() {
    let url = spawn_upstream(fixed_upstream(StatusCode::OK, "<html>gateway</html>")).await;
    let (status, body) = analyze(app(url, 5, false)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let value: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["error"], "Failed to parse Groq response");
}

#[tokio::test]
async fn upstream_error_status_is_surfaced_without_credential() {
    let upstream_body = r#"{"error":{"message":"Invalid API Key: gsk_test_secret_0123456789"}}"#;
    let url = spawn_upstream(fixed_upstream(StatusCode::UNAUTHORIZED, upstream_body)).await;
    let (status, body) = analyze(app(url, 5, false)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let value: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["error"], "Groq API error");
    assert_eq!(value["status_code"], 401);
    assert_eq!(
        value["details"],
        r#"{"error":{"message":"Invalid API Key: [REDACTED]"}}"#
    );
    assert!(!body.contains(SECRET));
}

#[tokio::test]
async fn upstream_server_error_includes_raw_text() {
    let url = spawn_upstream(fixed_upstream(StatusCode::SERVICE_UNAVAILABLE, "over capacity")).await;
    let (status, body) = analyze(app(url, 5, false)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let value: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["status_code"], 503);
    assert_eq!(value["details"], "over capacity");
}

#[tokio::test]
async fn connection_refused_is_a_transport_error() {
    // Reserve a port, then close it so nothing is listening
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let url = format!("http://{}/openai/v1/chat/completions", addr);
    let (status, body) = analyze(app(url, 5, false)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let value: Value = serde_json::from_str(&body).unwrap();
    let error = value["error"].as_str().unwrap();
    assert!(error.starts_with("Error contacting Groq API: "));
    assert!(error.to_lowercase().contains("refused"), "{}", error);
    assert!(!body.contains(SECRET));
}

#[tokio::test]
async fn slow_upstream_times_out() {
    let slow = Router::new().route(
        "/openai/v1/chat/completions",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            "too late"
        }),
    );
    let url = spawn_upstream(slow).await;
    let (status, body) = analyze(app(url, 1, false)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let value: Value = serde_json::from_str(&body).unwrap();
    let error = value["error"].as_str().unwrap();
    assert!(error.starts_with("Error contacting Groq API: "));
    assert!(error.contains("timed out"), "{}", error);
    assert!(!error.to_lowercase().contains("refused"));
}

#[tokio::test]
async fn sanitize_clamps_model_output() {
    const WILD: &str = r#"{"issueType":"pothole","estimatedLengthMeters":-1,"estimatedBreadthMeters":0.5,"imageTimestamp":null,"confidenceScore":3,"analysisNotes":"","faceBoxes":[{"ymin":0.8,"xmin":0.1,"ymax":0.2,"xmax":2}]}"#;
    let url = spawn_upstream(completion_upstream(WILD)).await;
    let (status, body) = analyze(app(url, 5, true)).await;

    assert_eq!(status, StatusCode::OK);
    let value: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["estimatedLengthMeters"], 0.0);
    assert_eq!(value["confidenceScore"], 1.0);
    assert_eq!(value["imageTimestamp"], "null");
    assert_eq!(
        value["faceBoxes"][0],
        json!({"ymin": 0.2, "xmin": 0.1, "ymax": 0.8, "xmax": 1.0})
    );
}

#[tokio::test]
async fn sanitize_rejects_off_schema_output() {
    let url = spawn_upstream(completion_upstream(r#"{"verdict":"fine"}"#)).await;
    let (status, body) = analyze(app(url, 5, true)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let value: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["error"], "Failed to parse Groq response");
}
