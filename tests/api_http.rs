//! Integration tests for the HTTP surface.
//!
//! Covered:
//! - /health liveness
//! - POST /analyze batch shape (results + summary + cached flag)
//! - MISS then HIT for an identical batch
//! - POST /analyze/single single-item shape
//! - Input validation (empty texts -> 400 invalid_input)
//! - GET /models/info, GET /cache/stats, POST /cache/clear
//!
//! Providers are mocked so every test is deterministic and offline.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt; // for oneshot

use finsent::api::{create_router, AppState};
use finsent::cache::ResultCache;
use finsent::pipeline::Pipeline;
use finsent::providers::{MockProvider, ProviderRegistry, SentimentProvider};
use finsent::reliability::ReliabilityConfig;

/// Build the in-process app router with fixed-score providers.
fn build_app() -> Router {
    let providers: Vec<Arc<dyn SentimentProvider>> = vec![
        Arc::new(MockProvider::fixed("finbert", 0.6, 0.9)),
        Arc::new(MockProvider::fixed("vader", 0.4, 0.7)),
    ];
    let pipeline = Arc::new(Pipeline::new(
        ProviderRegistry::new(providers),
        ResultCache::in_memory(),
        ReliabilityConfig::default(),
    ));
    create_router(AppState::new(pipeline))
}

/// Helper: send a JSON request and return (status, parsed body).
async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    payload: Option<Value>,
) -> (StatusCode, Value) {
    let body = match payload {
        Some(p) => Body::from(serde_json::to_vec(&p).expect("serialize payload")),
        None => Body::empty(),
    };
    let mut builder = Request::builder().method(method).uri(uri);
    if method == "POST" {
        builder = builder.header("content-type", "application/json");
    }
    let req = builder.body(body).expect("request build");

    let resp = app.clone().oneshot(req).await.expect("router response");
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn health_is_ok() {
    let app = build_app();
    let (status, body) = send_json(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn analyze_batch_returns_results_summary_and_cached_flag() {
    let app = build_app();
    let payload = json!({
        "texts": ["AAPL earnings beat expectations", "TSLA production disappointing"],
        "tickers": ["AAPL", "TSLA"],
        "source": "news",
    });

    let (status, body) = send_json(&app, "POST", "/analyze", Some(payload.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cached"], false);

    let results = body["results"].as_array().expect("results array");
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["metadata"]["ticker"], "AAPL");
    assert_eq!(results[0]["analysis"]["source"], "news");
    assert!(results[0]["sentiment"]["confidence"].is_number());
    assert_eq!(body["summary"]["total_texts"], 2);

    // Identical request is served from the cache with the same payload.
    let (status, replay) = send_json(&app, "POST", "/analyze", Some(payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replay["cached"], true);
    assert_eq!(replay["results"], body["results"]);
    assert_eq!(replay["summary"], body["summary"]);
}

#[tokio::test]
async fn analyze_single_returns_one_item() {
    let app = build_app();
    let payload = json!({
        "text": "strong quarter for the index",
        "ticker": "DIA",
        "source": "finviz",
    });

    let (status, body) = send_json(&app, "POST", "/analyze/single", Some(payload)).await;
    assert_eq!(status, StatusCode::OK);
    // Single responses carry the item at top level, no results array.
    assert!(body.get("results").is_none());
    assert_eq!(body["metadata"]["ticker"], "DIA");
    assert_eq!(body["sentiment"]["label"], "bullish");
    assert_eq!(body["cached"], false);
}

#[tokio::test]
async fn empty_texts_is_rejected_with_400() {
    let app = build_app();
    let (status, body) = send_json(&app, "POST", "/analyze", Some(json!({"texts": []}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_input");
}

#[tokio::test]
async fn blank_entry_is_rejected_with_400() {
    let app = build_app();
    let payload = json!({"texts": ["fine", "   "]});
    let (status, body) = send_json(&app, "POST", "/analyze", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_input");
}

#[tokio::test]
async fn missing_texts_field_is_a_client_error() {
    let app = build_app();
    let (status, _) = send_json(&app, "POST", "/analyze", Some(json!({"source": "news"}))).await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn unknown_source_falls_back_to_unknown() {
    let app = build_app();
    let payload = json!({"texts": ["some text about markets"], "source": "stocktwits"});
    let (status, body) = send_json(&app, "POST", "/analyze", Some(payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"][0]["analysis"]["source"], "unknown");
}

#[tokio::test]
async fn models_info_lists_registered_models() {
    let app = build_app();
    let (status, body) = send_json(&app, "GET", "/models/info", None).await;
    assert_eq!(status, StatusCode::OK);

    let models = body["models"].as_array().expect("models array");
    assert_eq!(models.len(), 2);
    assert_eq!(models[0]["id"], "finbert");
    assert_eq!(models[0]["ensemble_weight"], 0.4);
    assert_eq!(body["label_deadband"], 0.1);
}

#[tokio::test]
async fn cache_stats_reports_memory_backend() {
    let app = build_app();
    let (status, body) = send_json(&app, "GET", "/cache/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["backend"], "memory");
    assert_eq!(body["key_prefix"], "sentiment:");
    assert_eq!(body["default_ttl"], 1800);
}

#[tokio::test]
async fn cache_clear_reports_removed_count() {
    let app = build_app();
    let payload = json!({"texts": ["a text to populate the cache"]});
    send_json(&app, "POST", "/analyze", Some(payload)).await;

    let (status, body) = send_json(&app, "POST", "/cache/clear", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cleared"], 1);

    let (_, stats) = send_json(&app, "GET", "/cache/stats", None).await;
    assert_eq!(stats["total_keys"], 0);
}
