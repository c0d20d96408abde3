use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

use crate::error::ServiceError;
use crate::options::AnalyzeOptions;
use crate::pipeline::Pipeline;
use crate::types::Source;

#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<Pipeline>,
}

impl AppState {
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        Self { pipeline }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/analyze", post(analyze))
        .route("/analyze/single", post(analyze_single))
        .route("/models/info", get(models_info))
        .route("/cache/stats", get(cache_stats))
        .route("/cache/clear", post(cache_clear))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

#[derive(serde::Deserialize)]
struct AnalyzeReq {
    texts: Vec<String>,
    #[serde(default)]
    tickers: Vec<String>,
    #[serde(default)]
    source: Source,
    #[serde(default)]
    options: AnalyzeOptions,
}

async fn analyze(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeReq>,
) -> Result<Json<Value>, ServiceError> {
    metrics::counter!("sentiment_requests_total").increment(1);

    let outcome = state
        .pipeline
        .analyze_batch(body.texts, body.tickers, body.source, body.options)
        .await?;

    let mut payload = outcome.payload;
    if let Some(obj) = payload.as_object_mut() {
        obj.insert("cached".into(), Value::Bool(outcome.cached));
    }
    Ok(Json(payload))
}

#[derive(serde::Deserialize)]
struct AnalyzeSingleReq {
    text: String,
    #[serde(default)]
    ticker: Option<String>,
    #[serde(default)]
    source: Source,
    #[serde(default)]
    options: AnalyzeOptions,
}

async fn analyze_single(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeSingleReq>,
) -> Result<Json<Value>, ServiceError> {
    metrics::counter!("sentiment_requests_total").increment(1);

    let outcome = state
        .pipeline
        .analyze_single(body.text, body.ticker, body.source, body.options)
        .await?;

    let mut payload = outcome.payload;
    if let Some(obj) = payload.as_object_mut() {
        obj.insert("cached".into(), Value::Bool(outcome.cached));
    }
    Ok(Json(payload))
}

async fn models_info(State(state): State<AppState>) -> Json<Value> {
    Json(state.pipeline.models_info())
}

async fn cache_stats(State(state): State<AppState>) -> Json<Value> {
    let stats = state.pipeline.cache().stats().await;
    Json(serde_json::to_value(stats).unwrap_or(Value::Null))
}

async fn cache_clear(State(state): State<AppState>) -> Json<Value> {
    let removed = state.pipeline.cache().invalidate_all().await;
    Json(json!({"cleared": removed}))
}
