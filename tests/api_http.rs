// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - GET/POST /api/interests (round-trip, invalid body, unreadable file)
// - GET /api/daily-brief (success with feeds, degraded without a chat client)

use std::path::Path;
use std::sync::Arc;

use serde_json::json;
use serde_json::Value as Json;
use shuttle_axum::axum::{
    body::{self, Body},
    http::{header, Request, StatusCode},
    Router,
};
use tower::ServiceExt as _; // for `oneshot`

use daily_briefing::api::{self, AppState};
use daily_briefing::feeds::{FeedAggregator, FeedTable, FixtureFeedSource};
use daily_briefing::interests::InterestStore;
use daily_briefing::llm::{ChatOptions, DynChat, StaticChat, UnavailableChat, LLM_UNAVAILABLE};
use daily_briefing::prompt::PromptTemplate;

const BODY_LIMIT: usize = 1024 * 1024;

const DW: &str = include_str!("fixtures/dw_rdf.xml");
const BBC: &str = include_str!("fixtures/bbc_rss.xml");

fn state(interests: &Path, llm: DynChat, with_feeds: bool) -> AppState {
    let feeds = with_feeds.then(|| {
        let source = FixtureFeedSource::new()
            .with_doc("https://rss.dw.com/rdf/rss-en-ger", DW)
            .with_doc("https://feeds.bbci.co.uk/news/world/rss.xml", BBC);
        Arc::new(FeedAggregator::new(
            FeedTable::default(),
            Arc::new(source),
            llm.clone(),
            ChatOptions::default(),
        ))
    });
    AppState {
        store: Arc::new(InterestStore::new(interests)),
        llm,
        options: ChatOptions::default(),
        template: Arc::new(PromptTemplate::default()),
        feeds,
        feed_limit: 3,
        static_dir: "static".into(),
    }
}

fn test_router(interests: &Path, llm: DynChat, with_feeds: bool) -> Router {
    api::router(state(interests, llm, with_feeds))
}

async fn body_json(resp: shuttle_axum::axum::response::Response) -> Json {
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build GET")
}

fn post_json(uri: &str, payload: &Json) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build POST")
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_router(&dir.path().join("i.json"), Arc::new(UnavailableChat), false);

    let resp = app.oneshot(get("/health")).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT).await.unwrap();
    assert_eq!(String::from_utf8(bytes.to_vec()).unwrap().trim(), "ok");
}

#[tokio::test]
async fn interests_round_trip_through_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config").join("interests.json");
    let app = test_router(&path, Arc::new(UnavailableChat), false);

    // Missing file reads as an empty set.
    let resp = app.clone().oneshot(get("/api/interests")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({}));

    let payload = json!({"News": true, "Technology": false, "Science": true});
    let resp = app
        .clone()
        .oneshot(post_json("/api/interests", &payload))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({"status": "saved"}));

    let on_disk = std::fs::read_to_string(&path).unwrap();
    assert!(on_disk.starts_with("{\n  \"News\": true,"), "{on_disk}");

    let resp = app.oneshot(get("/api/interests")).await.unwrap();
    assert_eq!(body_json(resp).await, payload);
}

#[tokio::test]
async fn non_boolean_interest_is_rejected_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("interests.json");
    let app = test_router(&path, Arc::new(UnavailableChat), false);

    let resp = app
        .oneshot(post_json("/api/interests", &json!({"News": "yes"})))
        .await
        .unwrap();
    assert!(resp.status().is_client_error(), "got {}", resp.status());
    assert!(!path.exists());
}

#[tokio::test]
async fn malformed_interest_file_is_a_500_with_error_body() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("interests.json");
    std::fs::write(&path, "{ not json").unwrap();
    let app = test_router(&path, Arc::new(UnavailableChat), false);

    let resp = app.oneshot(get("/api/interests")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let v = body_json(resp).await;
    assert!(v["error"].as_str().is_some_and(|s| !s.is_empty()), "{v}");
}

#[tokio::test]
async fn daily_brief_combines_overview_and_feed_sections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("interests.json");
    std::fs::write(&path, r#"{"News": true, "Science": false, "Sport": true}"#).unwrap();
    let app = test_router(&path, Arc::new(StaticChat::new("Überblick")), true);

    let resp = app.oneshot(get("/api/daily-brief")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let v = body_json(resp).await;

    assert_eq!(v["status"], "success");
    assert!(v["title"].as_str().unwrap().starts_with("Tägliches Briefing "));
    assert!(v.get("error_message").is_none());
    // Overview plus one section for News; Sport has no feeds, Science is off.
    assert_eq!(v["briefing_text"], "Überblick\n\nÜberblick");
    let ts = v["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok(), "{ts}");
}

#[tokio::test]
async fn daily_brief_without_chat_client_reports_error_status() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("interests.json");
    std::fs::write(&path, r#"{"News": true}"#).unwrap();
    let app = test_router(&path, Arc::new(UnavailableChat), false);

    let resp = app.oneshot(get("/api/daily-brief")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let v = body_json(resp).await;
    assert_eq!(v["status"], "error");
    assert_eq!(v["briefing_text"], LLM_UNAVAILABLE);
    assert_eq!(v["error_message"], "client unavailable");
}
