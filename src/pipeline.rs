//! # Analysis Pipeline
//!
//! Orchestrates one request end to end: cache lookup, per-item cleaning,
//! provider fan-out, ensemble combination, enrichment, batch aggregation,
//! and the cache write-back. Items inside a batch are scored concurrently;
//! providers within one item run sequentially through the registry.

use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::{derive_key, ResultCache};
use crate::enrich::{self, BatchSummary, EnrichedResult};
use crate::ensemble;
use crate::entities::{self, Entities};
use crate::error::ServiceError;
use crate::normalize;
use crate::options::AnalyzeOptions;
use crate::providers::ProviderRegistry;
use crate::reliability::ReliabilityConfig;
use crate::types::{RawItem, Source};

/// Finished batch payload. This exact shape is what gets cached, so a cache
/// hit replays it byte for byte (only the transport-level `cached` flag
/// differs between a fresh and a replayed response).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchAnalysis {
    pub results: Vec<EnrichedResult>,
    pub summary: BatchSummary,
}

/// Outcome of an analysis call, tagged with whether it came from the cache.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub payload: Value,
    pub cached: bool,
}

/// Shared per-process pipeline state. Built once at startup.
pub struct Pipeline {
    registry: ProviderRegistry,
    cache: ResultCache,
    reliability: ReliabilityConfig,
}

impl Pipeline {
    pub fn new(registry: ProviderRegistry, cache: ResultCache, reliability: ReliabilityConfig) -> Self {
        Self {
            registry,
            cache,
            reliability,
        }
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Analyze a batch of texts. Tickers are paired positionally; a shorter
    /// ticker list leaves the remaining items untagged.
    pub async fn analyze_batch(
        &self,
        texts: Vec<String>,
        tickers: Vec<String>,
        source: Source,
        options: AnalyzeOptions,
    ) -> Result<AnalysisOutcome, ServiceError> {
        if texts.is_empty() {
            return Err(ServiceError::input("texts must not be empty"));
        }
        if texts.iter().any(|t| t.trim().is_empty()) {
            return Err(ServiceError::input("texts must not contain empty entries"));
        }

        let key = derive_key(&texts, &tickers, source, &options);
        if let Some(payload) = self.cache.get(&key).await {
            tracing::debug!(%key, "serving analysis from cache");
            return Ok(AnalysisOutcome {
                payload,
                cached: true,
            });
        }

        let items: Vec<RawItem> = texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| RawItem {
                text,
                ticker: tickers.get(i).cloned(),
            })
            .collect();

        let futures = items
            .iter()
            .map(|item| self.analyze_item(item, source, &options));
        let results: Vec<EnrichedResult> = join_all(futures).await;

        let summary = enrich::summarize(&results);
        let analysis = BatchAnalysis { results, summary };
        let payload = serde_json::to_value(&analysis)
            .map_err(|e| ServiceError::internal(format!("serializing analysis: {e}")))?;

        self.cache
            .put(&key, payload.clone(), self.cache.default_ttl())
            .await;

        Ok(AnalysisOutcome {
            payload,
            cached: false,
        })
    }

    /// Analyze one text: the single-item degenerate of the batch path, with
    /// its own cache key (a one-element batch shares it).
    pub async fn analyze_single(
        &self,
        text: String,
        ticker: Option<String>,
        source: Source,
        options: AnalyzeOptions,
    ) -> Result<AnalysisOutcome, ServiceError> {
        let tickers = ticker.into_iter().collect();
        let outcome = self
            .analyze_batch(vec![text], tickers, source, options)
            .await?;

        // Unwrap the one-element batch down to its single result.
        let payload = outcome
            .payload
            .get("results")
            .and_then(|r| r.get(0))
            .cloned()
            .ok_or_else(|| ServiceError::internal("batch produced no result"))?;

        Ok(AnalysisOutcome {
            payload,
            cached: outcome.cached,
        })
    }

    /// Full treatment of one item: clean, score, combine, enrich.
    /// Providers score the cleaned text; entities are pulled from the raw
    /// text, whose original casing drives the organization/person patterns.
    async fn analyze_item(
        &self,
        item: &RawItem,
        source: Source,
        options: &AnalyzeOptions,
    ) -> EnrichedResult {
        let cleaned = normalize::normalize(&item.text, source);
        let outcomes = self.registry.score_all(&cleaned, options).await;
        let verdict = ensemble::combine(&outcomes);

        let extracted = if options.extract_entities {
            entities::extract(&item.text)
        } else {
            Entities::default()
        };

        enrich::enrich(
            &verdict,
            &item.text,
            item.ticker.clone(),
            source,
            &self.reliability,
            extracted,
            options,
        )
    }

    /// Static description of the ensemble for `/models/info`.
    pub fn models_info(&self) -> Value {
        let models: Vec<Value> = self
            .registry
            .describe()
            .into_iter()
            .map(|(id, weight)| serde_json::json!({"id": id, "ensemble_weight": weight}))
            .collect();

        serde_json::json!({
            "models": models,
            "label_deadband": crate::types::LABEL_DEADBAND,
            "default_options": AnalyzeOptions::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{FailureKind, MockProvider};
    use std::sync::Arc;

    fn mock_pipeline(outcomes: Vec<Arc<dyn crate::providers::SentimentProvider>>) -> Pipeline {
        Pipeline::new(
            ProviderRegistry::new(outcomes),
            ResultCache::in_memory(),
            ReliabilityConfig::default(),
        )
    }

    #[tokio::test]
    async fn empty_batch_is_an_input_error() {
        let p = mock_pipeline(vec![Arc::new(MockProvider::fixed("finbert", 0.5, 0.8))]);
        let err = p
            .analyze_batch(vec![], vec![], Source::News, AnalyzeOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Input(_)));
    }

    #[tokio::test]
    async fn blank_text_is_an_input_error() {
        let p = mock_pipeline(vec![Arc::new(MockProvider::fixed("finbert", 0.5, 0.8))]);
        let err = p
            .analyze_batch(
                vec!["ok".into(), "   ".into()],
                vec![],
                Source::News,
                AnalyzeOptions::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Input(_)));
    }

    #[tokio::test]
    async fn second_identical_request_is_served_from_cache() {
        let p = mock_pipeline(vec![Arc::new(MockProvider::fixed("finbert", 0.6, 0.9))]);
        let texts = vec!["AAPL earnings beat expectations".to_string()];

        let first = p
            .analyze_batch(texts.clone(), vec![], Source::News, AnalyzeOptions::default())
            .await
            .unwrap();
        assert!(!first.cached);

        let second = p
            .analyze_batch(texts, vec![], Source::News, AnalyzeOptions::default())
            .await
            .unwrap();
        assert!(second.cached);
        assert_eq!(first.payload, second.payload);
    }

    #[tokio::test]
    async fn tickers_pair_positionally() {
        let p = mock_pipeline(vec![Arc::new(MockProvider::fixed("finbert", 0.6, 0.9))]);
        let outcome = p
            .analyze_batch(
                vec!["a good quarter".into(), "a bad quarter".into()],
                vec!["AAPL".into()],
                Source::News,
                AnalyzeOptions::default(),
            )
            .await
            .unwrap();

        let results = outcome.payload["results"].as_array().unwrap();
        assert_eq!(results[0]["metadata"]["ticker"], "AAPL");
        assert!(results[1]["metadata"]["ticker"].is_null());
    }

    #[tokio::test]
    async fn all_providers_failing_yields_neutral_degenerate() {
        let p = mock_pipeline(vec![
            Arc::new(MockProvider::failing("finbert", FailureKind::Unavailable)),
            Arc::new(MockProvider::failing("vader", FailureKind::Timeout)),
        ]);
        let outcome = p
            .analyze_single(
                "anything at all".into(),
                None,
                Source::News,
                AnalyzeOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(outcome.payload["sentiment"]["label"], "neutral");
        assert_eq!(outcome.payload["sentiment"]["score"], 0.0);
    }

    #[tokio::test]
    async fn single_is_degenerate_batch() {
        let p = mock_pipeline(vec![Arc::new(MockProvider::fixed("finbert", 0.8, 0.9))]);
        let outcome = p
            .analyze_single(
                "TSLA production numbers look strong this quarter".into(),
                Some("TSLA".into()),
                Source::News,
                AnalyzeOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(outcome.payload["sentiment"]["label"], "bullish");
        assert_eq!(outcome.payload["metadata"]["ticker"], "TSLA");
    }

    #[test]
    fn models_info_lists_weights() {
        let p = mock_pipeline(vec![
            Arc::new(MockProvider::fixed("finbert", 0.0, 0.0)),
            Arc::new(MockProvider::fixed("vader", 0.0, 0.0)),
        ]);
        let info = p.models_info();
        let models = info["models"].as_array().unwrap();
        assert_eq!(models.len(), 2);
        assert_eq!(models[0]["ensemble_weight"], 0.4);
    }
}
