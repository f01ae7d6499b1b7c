// Router-level tests for the dashboard page and analytics endpoints

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use crate::handlers;
use crate::models::ErrorRecord;
use crate::services::cache::CacheStore;
use crate::services::{ErrorLogConsumer, LoopExit};
use crate::tests::common::{
    FakeCompletion, FakeQueue, QueueEvent, TEST_PREFIX, app_state_with, memory_cache,
    processor_with,
};

const HOUR: Duration = Duration::from_secs(3600);

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

async fn seed(cache: &dyn CacheStore, error: &str, solution: &str) {
    let record = ErrorRecord::new(error, solution);
    let key = ErrorRecord::cache_key(TEST_PREFIX, error);
    cache.set_ex(&key, &record.to_json().unwrap(), HOUR).await.unwrap();
}

/// Test: queue message → consumer → cache → dashboard lists one entry
#[tokio::test]
async fn test_end_to_end_queue_to_dashboard() {
    let cache = memory_cache();
    let completion = FakeCompletion::replying("Initialize the object before use");
    let processor = Arc::new(processor_with(cache.clone(), completion.clone(), HOUR));

    let queue = FakeQueue::new(vec![
        QueueEvent::text("NullPointerException at line 42"),
        QueueEvent::Transport("end of test".to_string()),
    ]);
    let exit = ErrorLogConsumer::new(processor, Duration::from_millis(20))
        .run(Box::new(queue))
        .await;
    assert!(matches!(exit, LoopExit::TransportError(_)));

    let stored = cache.get("error:NullPointerException at line 42").await.unwrap().unwrap();
    let record = ErrorRecord::from_json(&stored).unwrap();
    assert_eq!(record.error, "NullPointerException at line 42");
    assert!(!record.solution.is_empty());

    let app = handlers::router(app_state_with(cache, completion));
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .expect("Failed to make request");

    assert_eq!(response.status(), StatusCode::OK);
    let page = body_string(response).await;
    assert_eq!(page.matches("class=\"accordion-item\"").count(), 1);
    assert!(page.contains("NullPointerException at line 42"));
    assert!(page.contains("Initialize the object before use"));
}

/// Test: predict-trends issues exactly one completion containing every cached error
#[tokio::test]
async fn test_predict_trends_single_request_with_all_errors() {
    let cache = memory_cache();
    seed(cache.as_ref(), "OOM", "add memory").await;
    seed(cache.as_ref(), "Timeout", "raise timeout").await;
    let completion = FakeCompletion::replying("Memory pressure is growing.");

    let app = handlers::router(app_state_with(cache, completion.clone()));
    let response = app
        .oneshot(Request::builder().uri("/api/predict-trends").body(Body::empty()).unwrap())
        .await
        .expect("Failed to make request");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["trend_analysis"], "Memory pressure is growing.");

    assert_eq!(completion.call_count(), 1);
    let prompt = completion.prompt(0);
    assert!(prompt.starts_with("Analyze these error patterns: "));
    assert!(prompt.contains("OOM"));
    assert!(prompt.contains("Timeout"));
}

/// Test: predict-trends surfaces completion failures as a structured 500
#[tokio::test]
async fn test_predict_trends_failure_payload() {
    let app = handlers::router(app_state_with(memory_cache(), FakeCompletion::failing("quota")));
    let response = app
        .oneshot(Request::builder().uri("/api/predict-trends").body(Body::empty()).unwrap())
        .await
        .expect("Failed to make request");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Failed to analyze trends");
    assert!(body["details"].as_str().unwrap().contains("quota"));
}

/// Test: summarize-error passes string details verbatim
#[tokio::test]
async fn test_summarize_error_success() {
    let completion = FakeCompletion::replying("Null reference in parser.");
    let app = handlers::router(app_state_with(memory_cache(), completion.clone()));

    let request = Request::builder()
        .method("POST")
        .uri("/api/summarize-error")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"error_details":"NullPointerException at line 42"}"#))
        .unwrap();
    let response = app.oneshot(request).await.expect("Failed to make request");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["summary"], "Null reference in parser.");
    assert_eq!(
        completion.prompt(0),
        "Summarize this error log: NullPointerException at line 42"
    );
}

/// Test: structured details are serialized into the prompt; failures return 500
#[tokio::test]
async fn test_summarize_error_failure_payload() {
    let completion = FakeCompletion::failing("invalid api key");
    let app = handlers::router(app_state_with(memory_cache(), completion.clone()));

    let request = Request::builder()
        .method("POST")
        .uri("/api/summarize-error")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"error_details":{"code":500,"msg":"boom"}}"#))
        .unwrap();
    let response = app.oneshot(request).await.expect("Failed to make request");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Failed to generate summary");
    assert!(body["details"].as_str().unwrap().contains("invalid api key"));
    assert!(completion.prompt(0).contains(r#""msg":"boom""#));
}

/// Test: the dashboard renders even when some entries are corrupt
#[tokio::test]
async fn test_dashboard_omits_corrupt_entries() {
    let cache = memory_cache();
    seed(cache.as_ref(), "OOM", "add memory").await;
    cache.set_ex("error:garbage", "%%%", HOUR).await.unwrap();

    let app = handlers::router(app_state_with(cache, FakeCompletion::replying("x")));
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .expect("Failed to make request");

    assert_eq!(response.status(), StatusCode::OK);
    let page = body_string(response).await;
    assert_eq!(page.matches("class=\"accordion-item\"").count(), 1);
    assert!(page.contains("OOM"));
}

/// Test: liveness route
#[tokio::test]
async fn test_health_check() {
    let app = handlers::router(app_state_with(memory_cache(), FakeCompletion::replying("x")));
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .expect("Failed to make request");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "OK");
}
