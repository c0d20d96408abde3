//! Remote transformer provider: a FinBERT-style classifier served over HTTP.
//!
//! The endpoint is expected to accept `{"text": "..."}` and answer
//! `{"label": "positive|negative|neutral", "score": 0.93}`. The signed
//! ensemble score is `label_sign * score`, matching the classifier's own
//! confidence as magnitude. Unconfigured or unreachable endpoints degrade to
//! a declared failure; this provider never blocks the pipeline beyond its
//! request timeout.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

use super::{FailureKind, ProviderFailure, ProviderOutcome, ProviderScore, SentimentProvider};

/// Env var holding the inference endpoint URL, e.g. `http://finbert:8080/classify`.
pub const ENV_FINBERT_ENDPOINT: &str = "FINBERT_ENDPOINT";

/// Transformer input limit; longer texts are truncated before the call.
const MAX_INPUT_CHARS: usize = 512;

pub struct FinbertProvider {
    http: reqwest::Client,
    endpoint: Option<String>,
}

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct ClassifyResponse {
    label: String,
    score: f64,
}

impl FinbertProvider {
    pub fn new(endpoint: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("finsent/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client");
        Self { http, endpoint }
    }

    /// Build from `FINBERT_ENDPOINT`; absent var means the provider reports
    /// `Unavailable` on every call (the ensemble carries on without it).
    pub fn from_env() -> Self {
        Self::new(std::env::var(ENV_FINBERT_ENDPOINT).ok())
    }

    fn failure(&self, kind: FailureKind) -> ProviderFailure {
        ProviderFailure::new(self.id(), kind)
    }
}

#[async_trait]
impl SentimentProvider for FinbertProvider {
    async fn score(&self, text: &str) -> ProviderOutcome {
        let Some(endpoint) = self.endpoint.as_deref() else {
            return Err(self.failure(FailureKind::Unavailable));
        };

        let truncated: String = text.chars().take(MAX_INPUT_CHARS).collect();
        let resp = self
            .http
            .post(endpoint)
            .json(&ClassifyRequest { text: &truncated })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    self.failure(FailureKind::Timeout)
                } else {
                    self.failure(FailureKind::Unavailable)
                }
            })?;

        if !resp.status().is_success() {
            return Err(self.failure(FailureKind::Unavailable));
        }

        let body: ClassifyResponse = resp
            .json()
            .await
            .map_err(|_| self.failure(FailureKind::Malformed))?;

        let sign = match body.label.to_ascii_lowercase().as_str() {
            "positive" => 1.0,
            "negative" => -1.0,
            "neutral" => 0.0,
            _ => return Err(self.failure(FailureKind::Malformed)),
        };

        let confidence = body.score.clamp(0.0, 1.0);
        Ok(
            ProviderScore::new(self.id(), sign * confidence, confidence).with_extra(json!({
                "raw_label": body.label,
                "raw_score": body.score,
            })),
        )
    }

    fn id(&self) -> &'static str {
        "finbert"
    }
}

/// Deterministic provider for tests: a fixed score or a forced failure,
/// under any provider id.
pub struct MockProvider {
    id: &'static str,
    outcome: Result<(f64, f64), FailureKind>,
}

impl MockProvider {
    pub fn fixed(id: &'static str, score: f64, confidence: f64) -> Self {
        Self {
            id,
            outcome: Ok((score, confidence)),
        }
    }

    pub fn failing(id: &'static str, kind: FailureKind) -> Self {
        Self {
            id,
            outcome: Err(kind),
        }
    }
}

#[async_trait]
impl SentimentProvider for MockProvider {
    async fn score(&self, _text: &str) -> ProviderOutcome {
        match self.outcome {
            Ok((score, confidence)) => Ok(ProviderScore::new(self.id, score, confidence)),
            Err(kind) => Err(ProviderFailure::new(self.id, kind)),
        }
    }

    fn id(&self) -> &'static str {
        self.id
    }
}
