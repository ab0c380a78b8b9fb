//! Integration tests for the kiosk-rotator status API
//!
//! Covers health, build info, the snapshot endpoint and the SSE stream.

use axum::body::Body;
use axum::http::StatusCode;
use chrono::Utc;
use http::{header, Request};
use http_body_util::BodyExt;
use kiosk_common::events::{EventBus, KioskEvent};
use kiosk_rotator::api::{create_router, AppContext};
use kiosk_rotator::playback::PlaybackVariant;
use kiosk_rotator::queue::{Item, MediaRef};
use kiosk_rotator::snapshot::DisplaySnapshot;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::watch;
use tower::ServiceExt;

fn setup_test_server() -> (axum::Router, watch::Sender<DisplaySnapshot>, EventBus) {
    let (snapshot_tx, snapshots) = watch::channel(DisplaySnapshot::interstitial());
    let events = EventBus::new(16);
    let ctx = AppContext {
        snapshots,
        events: events.clone(),
    };
    (create_router(ctx), snapshot_tx, events)
}

async fn get_json(app: &axum::Router, path: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(path).body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).expect("response should be JSON");
    (status, json)
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _snapshots, _events) = setup_test_server();

    let (status, body) = get_json(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["module"], "kiosk-rotator");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_build_info_endpoint() {
    let (app, _snapshots, _events) = setup_test_server();

    let (status, body) = get_json(&app, "/build_info").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["git_hash"].is_string());
    assert!(body["build_timestamp"].is_string());
    assert!(body["build_profile"].is_string());
}

#[tokio::test]
async fn test_snapshot_starts_interstitial() {
    let (app, _snapshots, _events) = setup_test_server();

    let (status, body) = get_json(&app, "/snapshot").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_interstitial"], true);
    assert!(body["current_item"].is_null());
    assert_eq!(body["playlist"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_snapshot_reflects_latest_publish() {
    let (app, snapshots, _events) = setup_test_server();

    let item = Item::new(
        "42",
        MediaRef::Pair {
            video: "https://cdn.example/v/42.mp4".to_string(),
            audio: "https://cdn.example/a/42.mp3".to_string(),
        },
    );
    snapshots.send_replace(DisplaySnapshot {
        group: Some("tiktok".to_string()),
        current_item: Some(item.clone()),
        progress_fraction: 0.5,
        playlist: vec![item],
        current_index: Some(0),
        play_counts: vec![1],
        focus_row: Some(0),
        variant: Some(PlaybackVariant::Grid { columns: 3 }),
        ..DisplaySnapshot::default()
    });

    let (status, body) = get_json(&app, "/snapshot").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["group"], "tiktok");
    assert_eq!(body["is_interstitial"], false);
    assert_eq!(body["current_item"]["id"], "42");
    assert_eq!(body["current_item"]["media"]["kind"], "pair");
    assert_eq!(body["progress_fraction"], 0.5);
    assert_eq!(body["play_counts"][0], 1);
    assert_eq!(body["variant"]["kind"], "grid");
    assert_eq!(body["variant"]["columns"], 3);
}

#[tokio::test]
async fn test_events_stream_forwards_bus() {
    let (app, _snapshots, events) = setup_test_server();

    let request = Request::builder().uri("/events").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/event-stream"));

    events.emit_lossy(KioskEvent::InterstitialEntered {
        next_group: "instagram".to_string(),
        duration_secs: 50,
        timestamp: Utc::now(),
    });

    let mut body = response.into_body();
    let frame = tokio::time::timeout(Duration::from_secs(5), body.frame())
        .await
        .expect("SSE frame within timeout")
        .expect("stream still open")
        .expect("frame without error");
    let data = frame.into_data().expect("data frame");
    let text = String::from_utf8(data.to_vec()).unwrap();

    assert!(text.contains("event: InterstitialEntered"), "got {:?}", text);
    assert!(text.contains("\"next_group\":\"instagram\""), "got {:?}", text);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (app, _snapshots, _events) = setup_test_server();

    let request = Request::builder().uri("/queue").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
