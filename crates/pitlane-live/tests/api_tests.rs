//! Integration tests for the REST and live control endpoints.
//!
//! Tests drive the `Router` directly via `tower::ServiceExt` without
//! starting a TCP server.

#![allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::panic)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use pitlane_live::registry::{LiveConnection, Outbound};
use pitlane_live::router::build_router;
use pitlane_live::state::AppState;
use serde_json::Value;
use tower::ServiceExt;

async fn get(state: Arc<AppState>, uri: &str) -> (StatusCode, Value) {
    let response = build_router(state)
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

async fn post_json(state: Arc<AppState>, uri: &str, body: &Value) -> (StatusCode, Value) {
    let response = build_router(state)
        .oneshot(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

fn state() -> Arc<AppState> {
    Arc::new(AppState::new())
}

// =========================================================================
// Reference data
// =========================================================================

#[tokio::test]
async fn test_index_banner() {
    let (status, json) = get(state(), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "F1 Analytics API");
    assert_eq!(json["version"], "1.0.0");
}

#[tokio::test]
async fn test_list_drivers() {
    let (status, json) = get(state(), "/api/drivers").await;
    assert_eq!(status, StatusCode::OK);
    let drivers = json.as_array().unwrap();
    assert_eq!(drivers.len(), 10);
    assert_eq!(drivers[0]["id"], "HAM");
    assert!(drivers.iter().all(|d| d["color"].as_str().unwrap().starts_with('#')));
}

#[tokio::test]
async fn test_get_driver() {
    let (status, json) = get(state(), "/api/drivers/LEC").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Charles Leclerc");
    assert_eq!(json["number"], 16);
}

#[tokio::test]
async fn test_get_driver_not_found() {
    let (status, json) = get(state(), "/api/drivers/XYZ").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Driver not found");
    assert_eq!(json["status"], 404);
}

#[tokio::test]
async fn test_get_circuit() {
    let (status, json) = get(state(), "/api/circuit").await;
    assert_eq!(status, StatusCode::OK);
    let points = json["points"].as_array().unwrap();
    assert_eq!(points.len(), 20);
    assert_eq!(points[0]["name"], "Start/Finish");
}

#[tokio::test]
async fn test_list_sessions() {
    let (status, json) = get(state(), "/api/sessions").await;
    assert_eq!(status, StatusCode::OK);
    let sessions = json.as_array().unwrap();
    assert_eq!(sessions.len(), 2);
    assert!(sessions.iter().all(|s| s.get("lap_count").is_none()));
    assert!(
        sessions
            .iter()
            .any(|s| s["id"] == "monaco_2024_race" && s["status"] == "live")
    );
}

#[tokio::test]
async fn test_get_session_detail() {
    let (status, json) = get(state(), "/api/sessions/monaco_2024_race").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["lap_count"], 78);
    assert_eq!(json["duration"], "1:23:45.123");
    assert_eq!(json["drivers"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_get_session_not_found() {
    let (status, json) = get(state(), "/api/sessions/spa_2024_race").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Session not found");
}

// =========================================================================
// Generated data
// =========================================================================

#[tokio::test]
async fn test_telemetry_trace() {
    let (status, json) = get(state(), "/api/telemetry/monaco_2024_race/VER?lap=12").await;
    assert_eq!(status, StatusCode::OK);
    let samples = json.as_array().unwrap();
    assert_eq!(samples.len(), 100);
    assert!(samples.iter().all(|s| s["lap"] == 12 && s["driver_id"] == "VER"));
    assert!(samples[0]["lap_time"].is_f64());
    assert!(samples[1]["lap_time"].is_null());
    assert_eq!(samples[20]["sector"], 2);

    let t0 = samples[0]["timestamp"].as_f64().unwrap();
    let t1 = samples[1]["timestamp"].as_f64().unwrap();
    assert!(((t1 - t0) - 0.1).abs() < 1e-6);
}

#[tokio::test]
async fn test_telemetry_without_lap() {
    let (status, json) = get(state(), "/api/telemetry/s/NOR").await;
    assert_eq!(status, StatusCode::OK);
    assert!(json[0].get("lap").is_none());
}

#[tokio::test]
async fn test_leaderboard_sorted() {
    let (status, json) = get(state(), "/api/leaderboard/monaco_2024_race").await;
    assert_eq!(status, StatusCode::OK);
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 10);

    let positions: Vec<u64> = entries.iter().map(|e| e["position"].as_u64().unwrap()).collect();
    assert_eq!(positions, (1..=10).collect::<Vec<u64>>());
    let times: Vec<f64> = entries.iter().map(|e| e["lap_time"].as_f64().unwrap()).collect();
    assert!(times.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn test_analysis_shape() {
    let (status, json) = get(state(), "/api/analysis/monaco_2024_race/HAM").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["driver_id"], "HAM");
    assert_eq!(json["braking_points"].as_array().unwrap().len(), 3);
    assert_eq!(json["throttle_control"].as_array().unwrap().len(), 100);
    assert_eq!(json["corner_speeds"].as_array().unwrap().len(), 19);
    assert_eq!(json["speed_map"].as_array().unwrap().len(), 50);
}

#[tokio::test]
async fn test_comparison() {
    let (status, json) = get(state(), "/api/comparison/monaco_2024_race?driver1=VER&driver2=LEC").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["session_id"], "monaco_2024_race");
    assert_eq!(json["driver1"]["id"], "VER");
    assert_eq!(json["driver2"]["id"], "LEC");
    let consistency = json["driver1"]["consistency"].as_f64().unwrap();
    assert!((0.8..=1.0).contains(&consistency));
}

#[tokio::test]
async fn test_comparison_missing_driver() {
    let (status, json) = get(state(), "/api/comparison/monaco_2024_race?driver1=VER").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], 400);
}

// =========================================================================
// Live control
// =========================================================================

#[tokio::test]
async fn test_live_status_counts_connections() {
    let state = state();
    let (race, _race_rx) = LiveConnection::new("monaco_2024_race", 4);
    let (quali, _quali_rx) = LiveConnection::new("monaco_2024_q3", 4);
    let _race = state.registry.admit(Arc::new(race)).unwrap();
    let _quali = state.registry.admit(Arc::new(quali)).unwrap();

    let (status, json) = get(Arc::clone(&state), "/api/live").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["active_connections"], 2);
    assert_eq!(json["sessions"]["monaco_2024_race"], 1);
    assert_eq!(json["sessions"]["monaco_2024_q3"], 1);
    assert_eq!(json["delivery_failures"], 0);
    assert_eq!(json["tick_interval_ms"], 100);
}

#[tokio::test]
async fn test_broadcast_race_control() {
    let state = state();
    let (live, mut live_rx) = LiveConnection::new("monaco_2024_race", 4);
    let (dead, dead_rx) = LiveConnection::new("monaco_2024_race", 4);
    drop(dead_rx);
    let _live = state.registry.admit(Arc::new(live)).unwrap();
    let _dead = state.registry.admit(Arc::new(dead)).unwrap();

    let body = serde_json::json!({ "message": "SAFETY CAR DEPLOYED" });
    let (status, json) = post_json(Arc::clone(&state), "/api/live/broadcast", &body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["delivered"], 1);
    assert_eq!(json["failed"], 1);
    assert_eq!(state.registry.delivery_failures(), 1);

    let Some(Outbound::Text(text)) = live_rx.recv().await else {
        panic!("expected a text message");
    };
    let msg: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(msg["type"], "race_control");
    assert_eq!(msg["message"], "SAFETY CAR DEPLOYED");
}

#[tokio::test]
async fn test_broadcast_rejects_empty_message() {
    let body = serde_json::json!({ "message": "   " });
    let (status, _) = post_json(state(), "/api/live/broadcast", &body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_nonexistent_route_returns_404() {
    let response = build_router(state())
        .oneshot(Request::get("/api/nonexistent").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
