// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health, GET /api/modes
// - GET /api/trends, POST /api/trends/refresh  (cached flag, notice)
// - POST /api/generate  (term / rank resolution, missing key, 400s)
// - static page fallback

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value as Json};
use tower::ServiceExt as _; // for `oneshot`

use trendcast::api::{router, AppState};
use trendcast::generate::client::MockGenerator;
use trendcast::trends::providers::google_rss::GoogleRssProvider;
use trendcast::{Generator, TrendService, MISSING_KEY_WARNING};

const BODY_LIMIT: usize = 1024 * 1024;

const TWO_ITEM_RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss xmlns:ht="https://trends.google.com/trending/rss" version="2.0"><channel>
  <title>Daily Search Trends</title>
  <item><title>Topic A</title><ht:approx_traffic>2万+</ht:approx_traffic><link>https://example.test/a</link></item>
  <item><title>Topic B</title><ht:approx_traffic>1万+</ht:approx_traffic></item>
</channel></rss>"#;

fn static_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("static")
}

fn build(rss: &str, generator: Generator) -> Router {
    let trends = TrendService::new(
        Box::new(GoogleRssProvider::from_fixture(rss)),
        10,
        Duration::from_secs(300),
    );
    router(AppState::new(trends, generator, static_dir()))
}

/// Router whose generator has no key at all.
fn keyless() -> (Router, Arc<MockGenerator>) {
    let mock = Arc::new(MockGenerator::echo());
    (build(TWO_ITEM_RSS, Generator::new(mock.clone(), None)), mock)
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let resp = app.clone().oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    (status, bytes)
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Json) {
    let req = Request::get(uri).body(Body::empty()).expect("build GET");
    let (status, bytes) = send(app, req).await;
    (status, serde_json::from_slice(&bytes).expect("json body"))
}

async fn post_json(app: &Router, uri: &str, payload: Json) -> (StatusCode, Json) {
    let req = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build POST");
    let (status, bytes) = send(app, req).await;
    (status, serde_json::from_slice(&bytes).expect("json body"))
}

#[tokio::test]
async fn health_returns_ok() {
    let (app, _) = keyless();
    let req = Request::get("/health").body(Body::empty()).unwrap();
    let (status, bytes) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8(bytes).unwrap(), "OK");
}

#[tokio::test]
async fn modes_lists_all_four_with_labels() {
    let (app, _) = keyless();
    let (status, v) = get_json(&app, "/api/modes").await;
    assert_eq!(status, StatusCode::OK);

    let ids: Vec<&str> = v
        .as_array()
        .expect("array")
        .iter()
        .map(|m| m["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["short_video", "article", "social_post", "commentator"]);
    assert_eq!(v[0]["label"], "YouTubeショート/TikTok用");
}

#[tokio::test]
async fn trends_listing_contract_and_cache_flag() {
    let (app, _) = keyless();

    let (status, first) = get_json(&app, "/api/trends").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["source"], "google_rss");
    assert_eq!(first["cached"], false);
    assert!(first.get("fetched_at").is_some());
    assert!(first.get("notice").is_none());

    let items = first["items"].as_array().expect("items");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["rank"], 1);
    assert_eq!(items[0]["title"], "Topic A");
    assert_eq!(items[0]["metric"], "2万+");
    assert_eq!(items[0]["link"], "https://example.test/a");
    assert!(items[1]["link"]
        .as_str()
        .unwrap()
        .starts_with("https://trends.google.com/trends/explore?q=Topic%20B"));

    let (_, second) = get_json(&app, "/api/trends").await;
    assert_eq!(second["cached"], true);

    let (status, refreshed) = post_json(&app, "/api/trends/refresh", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(refreshed["cached"], false);
}

#[tokio::test]
async fn broken_source_lists_empty_with_notice() {
    let app = build(
        "<html>oops</html>",
        Generator::new(Arc::new(MockGenerator::echo()), None),
    );
    let (status, v) = get_json(&app, "/api/trends").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["items"].as_array().unwrap().len(), 0);
    assert_eq!(v["notice"], "no trends available");
    assert_eq!(v["error_kind"], "malformed");
}

#[tokio::test]
async fn generate_without_key_returns_warning_verbatim() {
    let (app, mock) = keyless();
    let (status, v) = post_json(
        &app,
        "/api/generate",
        json!({ "term": "Topic A", "mode": "article" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["output"], MISSING_KEY_WARNING);
    assert_eq!(v["term"], "Topic A");
    assert_eq!(v["mode"], "article");
    assert_eq!(v["label"], "ブログ/ニュース記事用");
    assert_eq!(mock.calls(), 0);
}

#[tokio::test]
async fn generate_by_rank_uses_last_listing_and_page_key() {
    let (app, mock) = keyless();
    get_json(&app, "/api/trends").await;

    let (status, v) = post_json(
        &app,
        "/api/generate",
        json!({ "rank": 2, "mode": "social_post", "api_key": "typed-in-page" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["term"], "Topic B");
    assert!(v["output"]
        .as_str()
        .unwrap()
        .starts_with("[mock] キーワード「Topic B」"));
    assert_eq!(mock.calls(), 1);
}

#[tokio::test]
async fn generate_defaults_to_short_video_mode() {
    let app = build(
        TWO_ITEM_RSS,
        Generator::new(Arc::new(MockGenerator::fixed("台本")), Some("k".into())),
    );
    let (status, v) = post_json(&app, "/api/generate", json!({ "term": "Topic A" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["mode"], "short_video");
    assert_eq!(v["output"], "台本");
}

#[tokio::test]
async fn generate_rejects_missing_term_and_unknown_rank() {
    let (app, _) = keyless();

    let (status, v) = post_json(&app, "/api/generate", json!({ "term": "   " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(v["error"].as_str().unwrap().contains("required"));

    get_json(&app, "/api/trends").await;
    let (status, v) = post_json(&app, "/api/generate", json!({ "rank": 9 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(v["error"].as_str().unwrap().contains("rank 9"));
}

#[tokio::test]
async fn generate_rejects_unknown_mode() {
    let (app, _) = keyless();
    let req = Request::post("/api/generate")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "term": "x", "mode": "podcast" }).to_string()))
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert!(status.is_client_error(), "got {status}");
}

#[tokio::test]
async fn index_page_is_served() {
    let (app, _) = keyless();
    let req = Request::get("/").body(Body::empty()).unwrap();
    let (status, bytes) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    let html = String::from_utf8(bytes).unwrap();
    assert!(html.contains("TrendCast"));
    assert!(html.contains("/api/generate"));
    // the page generates from the title it shows, never a rank
    assert!(html.contains("term: $('trends').selectedOptions[0].dataset.title"));
    assert!(!html.contains("rank: Number("));
}

#[tokio::test]
async fn generate_by_term_ignores_a_refreshed_list() {
    let (app, _) = keyless();
    get_json(&app, "/api/trends").await;
    post_json(&app, "/api/trends/refresh", json!({})).await;

    let (status, v) = post_json(
        &app,
        "/api/generate",
        json!({ "term": "Topic B", "rank": 1, "mode": "article" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["term"], "Topic B", "term wins over rank");
}
