//! # Provider Adapter Set
//!
//! Every sentiment provider is consumed through one capability contract:
//! it either yields a [`ProviderScore`] or a declared [`ProviderFailure`],
//! never both and never a panic. Providers are collected in an ordered
//! [`ProviderRegistry`] with a fixed weight table keyed by provider id, so
//! adding or removing a provider never touches the ensemble combiner.

pub mod finbert;
pub mod lexicon;
pub mod polarity;
pub mod vader;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::options::AnalyzeOptions;
use crate::types::SentimentLabel;

pub use finbert::{FinbertProvider, MockProvider};
pub use lexicon::FinancialLexiconProvider;
pub use polarity::PolarityProvider;
pub use vader::VaderProvider;

/// One successful provider verdict for one text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderScore {
    pub provider_id: String,
    /// Signed sentiment in [-1, 1].
    pub score: f64,
    pub label: SentimentLabel,
    /// Provider's own confidence in [0, 1].
    pub confidence: f64,
    /// Opaque per-provider metadata (breakdowns, matched terms, ...).
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub extra: Value,
}

impl ProviderScore {
    pub fn new(provider_id: &str, score: f64, confidence: f64) -> Self {
        let score = score.clamp(-1.0, 1.0);
        Self {
            provider_id: provider_id.to_string(),
            score,
            label: SentimentLabel::from_score(score),
            confidence: confidence.clamp(0.0, 1.0),
            extra: Value::Null,
        }
    }

    pub fn with_extra(mut self, extra: Value) -> Self {
        self.extra = extra;
        self
    }
}

/// Why a provider produced no score. Recovered locally; never aborts a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Not configured or backing service unreachable.
    Unavailable,
    /// The call exceeded its deadline.
    Timeout,
    /// The provider answered with something unparseable.
    Malformed,
    /// Any other internal provider fault.
    Internal,
}

/// Declared provider failure: the second arm of the two-outcome contract.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("provider '{provider_id}' failed: {kind:?}")]
pub struct ProviderFailure {
    pub provider_id: String,
    pub kind: FailureKind,
}

impl ProviderFailure {
    pub fn new(provider_id: &str, kind: FailureKind) -> Self {
        Self {
            provider_id: provider_id.to_string(),
            kind,
        }
    }
}

/// Outcome of one provider invocation.
pub type ProviderOutcome = Result<ProviderScore, ProviderFailure>;

/// Capability contract every sentiment provider implements.
#[async_trait]
pub trait SentimentProvider: Send + Sync {
    /// Score one normalized text. Must not panic; all failure paths return
    /// a `ProviderFailure`.
    async fn score(&self, text: &str) -> ProviderOutcome;

    /// Stable identifier used for weighting and diagnostics.
    fn id(&self) -> &'static str;
}

/// Fixed ensemble weight per provider id. Ids absent from this table
/// contribute zero weight to the ensemble (they are not errors).
pub fn ensemble_weight(provider_id: &str) -> f64 {
    match provider_id {
        "finbert" => 0.4,
        "vader" => 0.3,
        "textblob" => 0.2,
        "financial_lexicon" => 0.1,
        _ => 0.0,
    }
}

/// Ordered set of providers, built once at startup and shared across requests.
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn SentimentProvider>>,
}

impl ProviderRegistry {
    pub fn new(providers: Vec<Arc<dyn SentimentProvider>>) -> Self {
        Self { providers }
    }

    /// Default production set: remote transformer + the three local scorers.
    pub fn with_default_providers() -> Self {
        Self::new(vec![
            Arc::new(FinbertProvider::from_env()),
            Arc::new(VaderProvider::new()),
            Arc::new(PolarityProvider::new()),
            Arc::new(FinancialLexiconProvider::new()),
        ])
    }

    /// Providers participating under the given options. The finbert/vader
    /// toggles are the only per-call participation switches; they are copied
    /// out so the iterator borrows nothing but the registry.
    pub fn active<'a>(
        &'a self,
        options: &AnalyzeOptions,
    ) -> impl Iterator<Item = &'a Arc<dyn SentimentProvider>> {
        let use_finbert = options.use_finbert;
        let use_vader = options.use_vader;
        self.providers.iter().filter(move |p| match p.id() {
            "finbert" => use_finbert,
            "vader" => use_vader,
            _ => true,
        })
    }

    /// Score one text against every active provider, sequentially.
    /// One provider failing never blocks the others; each outcome is tagged.
    pub async fn score_all(&self, text: &str, options: &AnalyzeOptions) -> Vec<ProviderOutcome> {
        let mut outcomes = Vec::new();
        for provider in self.active(options) {
            let outcome = provider.score(text).await;
            if let Err(failure) = &outcome {
                tracing::debug!(provider = %failure.provider_id, kind = ?failure.kind, "provider failed");
                metrics::counter!("sentiment_provider_failures_total").increment(1);
            }
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Ids and weights of all registered providers (for /models/info).
    pub fn describe(&self) -> Vec<(String, f64)> {
        self.providers
            .iter()
            .map(|p| (p.id().to_string(), ensemble_weight(p.id())))
            .collect()
    }
}
