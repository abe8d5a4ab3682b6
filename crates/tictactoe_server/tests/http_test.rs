//! Tests for the REST routes, driven in-process through the router.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use tictactoe_server::{AppState, GameMetrics, MemoryStore, router};

fn setup() -> (Arc<MemoryStore>, Router) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(store.clone(), Arc::new(GameMetrics::new()));
    (store, router(state))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, String) {
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
        .oneshot(builder.body(body).expect("Bad request"))
        .await
        .expect("Request failed");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Body failed")
        .to_bytes();
    (status, String::from_utf8(bytes.to_vec()).expect("Body not UTF-8"))
}

async fn send_json(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, text) = send(app, method, uri, body).await;
    (status, serde_json::from_str(&text).expect("Body not JSON"))
}

#[tokio::test]
async fn test_health() {
    let (_store, app) = setup();
    let (status, body) = send_json(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_initial_state() {
    let (_store, app) = setup();
    let (status, body) = send_json(&app, "GET", "/api/state", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["board"], json!([null, null, null, null, null, null, null, null, null]));
    assert_eq!(body["x_is_next"], true);
    assert_eq!(body["status"], "playing");
    assert!(body.get("winner").is_none());
}

#[tokio::test]
async fn test_move_then_taken_cell() {
    let (_store, app) = setup();
    let (status, body) = send_json(&app, "POST", "/api/move/0", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["board"][0], "X");
    assert_eq!(body["x_is_next"], false);

    let (status, body) = send_json(&app, "POST", "/api/move/0", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"], "Invalid move: cell 0 is already taken");

    let (status, body) = send_json(&app, "POST", "/api/move/9", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["error"].as_str().unwrap_or_default().contains("out of bounds"));

    let (_, body) = send_json(&app, "POST", "/api/move/-1", None).await;
    assert!(body.get("error").is_some());
}

#[tokio::test]
async fn test_win_reports_line_and_updates_scores() {
    let (_store, app) = setup();
    for index in [0, 3, 1, 4] {
        send_json(&app, "POST", &format!("/api/move/{index}"), None).await;
    }
    let (_, body) = send_json(&app, "POST", "/api/move/2", None).await;
    assert_eq!(body["status"], "won");
    assert_eq!(body["winner"], "X");
    assert_eq!(body["winning_line"], json!([0, 1, 2]));

    let (_, scores) = send_json(&app, "GET", "/api/scores", None).await;
    assert_eq!(scores, json!({ "X": 1, "O": 0, "draws": 0 }));

    let (_, history) = send_json(&app, "GET", "/api/history", None).await;
    assert_eq!(history.as_array().map(Vec::len), Some(1));
    assert_eq!(history[0]["winner"], "X");
    assert!(history[0]["timestamp"].is_string());
}

#[tokio::test]
async fn test_reset_variants() {
    let (_store, app) = setup();
    send_json(&app, "POST", "/api/move/4", None).await;

    let (status, body) = send_json(&app, "POST", "/api/reset", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["x_is_next"], true);
    assert!(body.get("scores").is_none());
    assert!(body.get("history").is_none());

    let (_, body) = send_json(&app, "POST", "/api/reset", Some(json!({ "reset_stats": false }))).await;
    assert!(body.get("scores").is_none());

    let (_, body) = send_json(&app, "POST", "/api/reset", Some(json!({ "reset_stats": true }))).await;
    assert_eq!(body["scores"], json!({ "X": 0, "O": 0, "draws": 0 }));
    assert_eq!(body["history"], json!([]));
}

#[tokio::test]
async fn test_malformed_reset_body() {
    let (_store, app) = setup();
    let request = Request::builder()
        .method("POST")
        .uri("/api/reset")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .expect("Bad request");
    let response = app.oneshot(request).await.expect("Request failed");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_store_unavailable_is_503() {
    let (store, app) = setup();
    store.set_unavailable(true);

    let (status, body) = send_json(&app, "GET", "/api/state", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].is_string());

    let (status, _) = send_json(&app, "POST", "/api/move/0", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_metrics_exposition() {
    let (_store, app) = setup();
    send_json(&app, "POST", "/api/move/0", None).await;
    send_json(&app, "POST", "/api/move/0", None).await;
    send_json(&app, "POST", "/api/move/42", None).await;
    send_json(&app, "POST", "/api/reset", Some(json!({ "reset_stats": true }))).await;

    let (status, text) = send(&app, "GET", "/metrics", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(text.contains("invalid_moves_total{reason=\"cell_taken\"} 1"));
    assert!(text.contains("invalid_moves_total{reason=\"out_of_bounds\"} 1"));
    assert!(text.contains("full_game_resets_total 1"));
    assert!(text.contains("games_played_total 0"));
}

#[tokio::test]
async fn test_oversized_move_index_is_out_of_bounds() {
    let (_store, app) = setup();
    for uri in ["/api/move/99999999999999999999", "/api/move/-99999999999999999999"] {
        let (status, body) = send_json(&app, "POST", uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["error"].as_str().unwrap_or_default().contains("out of bounds"));
    }

    let (status, _) = send(&app, "POST", "/api/move/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, text) = send(&app, "GET", "/metrics", None).await;
    assert!(text.contains("invalid_moves_total{reason=\"out_of_bounds\"} 2"));
}
