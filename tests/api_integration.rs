//! HTTP routes driven through the router without binding a socket.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use meal_alerts::config::Settings;
use meal_alerts::server::{create_app, AppState};

fn test_app() -> (Router, AppState) {
    let state = AppState::new(Settings::default());
    (create_app(state.clone()), state)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

#[tokio::test(start_paused = true)]
async fn test_create_list_and_dismiss() {
    let (app, state) = test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/notifications",
        Some(json!({
            "category": "error",
            "message": "Could not save your meal",
            "title": "Save Failed",
            "metadata": {"meal_id": 42}
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["duration_ms"], 7000);
    let id = body["id"].as_str().unwrap().to_string();

    let (status, list) = send(&app, Method::GET, "/api/v1/notifications", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["id"], id.as_str());
    assert_eq!(list[0]["category"], "error");
    assert_eq!(list[0]["metadata"]["meal_id"], 42);

    let uri = format!("/api/v1/notifications/{}", id);
    let (status, one) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(one["title"], "Save Failed");

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(state.registry.is_empty());

    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test(start_paused = true)]
async fn test_invalid_requests_are_rejected() {
    let (app, state) = test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/notifications",
        Some(json!({"category": "critical", "message": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_CATEGORY");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/notifications",
        Some(json!({"category": "info", "message": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, body) = send(&app, Method::DELETE, "/api/v1/notifications/not-an-id", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_ID");

    assert!(state.registry.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_preset_and_clear() {
    let (app, state) = test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/notifications/presets",
        Some(json!({"preset": "recommendations_ready", "count": 3})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["duration_ms"], 5000);

    state.registry.food_safety_alert("Leftover rice", "Discard after 24 hours");

    let (status, body) = send(&app, Method::DELETE, "/api/v1/notifications", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cleared"], 2);
    assert!(state.registry.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_expired_notifications_leave_the_listing() {
    let (app, _state) = test_app();

    send(
        &app,
        Method::POST,
        "/api/v1/notifications",
        Some(json!({"category": "success", "message": "Saved", "duration_ms": 100})),
    )
    .await;
    tokio::time::sleep(std::time::Duration::from_millis(101)).await;

    let (_, list) = send(&app, Method::GET, "/api/v1/notifications", None).await;
    assert_eq!(list, json!([]));
}

#[tokio::test(start_paused = true)]
async fn test_health_stats_and_metrics() {
    let (app, state) = test_app();
    state.registry.goal_reached("fiber");

    let (status, health) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["active_notifications"], 1);

    let (status, stats) = send(&app, Method::GET, "/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["active"], 1);
    assert_eq!(stats["total_added"], 1);
    assert_eq!(stats["sse_connections"], 0);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let text = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&text).contains("meal_alerts_notifications_added_total"));
}

#[tokio::test]
async fn test_stream_is_event_stream() {
    let (app, state) = test_app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/notifications/stream")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/event-stream"));
    assert_eq!(state.sse_connection_count(), 1);

    drop(response);
    assert_eq!(state.sse_connection_count(), 0);
}
