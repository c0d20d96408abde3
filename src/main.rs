//! Ensemble Sentiment Service — Binary Entrypoint
//! Boots the Axum HTTP server, wiring routes, shared state, and middleware.

use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use finsent::api::{self, AppState};
use finsent::cache::ResultCache;
use finsent::metrics::Metrics;
use finsent::pipeline::Pipeline;
use finsent::providers::ProviderRegistry;
use finsent::reliability::ReliabilityConfig;

/// Env var pointing at the source-reliability JSON config.
const ENV_RELIABILITY_CONFIG_PATH: &str = "RELIABILITY_CONFIG_PATH";
const DEFAULT_RELIABILITY_CONFIG_PATH: &str = "config/source_reliability.json";

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("finsent=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let reliability_path = std::env::var(ENV_RELIABILITY_CONFIG_PATH)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_RELIABILITY_CONFIG_PATH));
    let reliability = ReliabilityConfig::load_from_file(&reliability_path);

    let cache = ResultCache::from_env().await;
    let metrics = Metrics::init(cache.default_ttl());

    let pipeline = Arc::new(Pipeline::new(
        ProviderRegistry::with_default_providers(),
        cache,
        reliability,
    ));

    let router = api::create_router(AppState::new(pipeline)).merge(metrics.router());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8080);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "sentiment service listening");

    axum::serve(listener, router).await?;
    Ok(())
}
