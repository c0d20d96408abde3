//! # Confidence Enhancer & Aggregator
//!
//! Per-item confidence enhancement on top of the raw ensemble confidence,
//! applied as successive multiplicative factors (order matters, clipped to
//! [0, 1] only at the end):
//!
//! 1. source reliability: `0.5 + reliability * 0.5`, so no source can zero
//!    out confidence and none can more than double it;
//! 2. text length: optimal band [50, 200] chars, linear ramp below, gentle
//!    decay (floored at 0.8) above;
//! 3. entity density: `min(1.2, 1 + n * 0.05)` when any financial entity
//!    was extracted.
//!
//! Also rolls per-item results into batch-level statistics.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::ensemble::EnsembleVerdict;
use crate::entities::Entities;
use crate::options::AnalyzeOptions;
use crate::reliability::ReliabilityConfig;
use crate::types::{Quality, SentimentLabel, Source, Strength};

/// Fully enriched verdict for one item. Created once, immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedResult {
    pub sentiment: SentimentBlock,
    pub analysis: AnalysisBlock,
    pub entities: Entities,
    pub metadata: MetadataBlock,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentBlock {
    pub score: f64,
    pub label: SentimentLabel,
    /// Enhanced confidence (after all factors), in [0, 1].
    pub confidence: f64,
    pub strength: Strength,
    pub quality: Quality,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisBlock {
    pub text_length: usize,
    pub word_count: usize,
    pub source: Source,
    pub source_reliability: f64,
    pub model_agreement: f64,
    pub processing_timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataBlock {
    pub ticker: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meets_threshold: Option<bool>,
}

/// Batch-level aggregate, recomputed fully on each batch request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total_texts: usize,
    pub average_sentiment: AverageSentiment,
    pub score_std: f64,
    pub confidence_std: f64,
    pub sentiment_distribution: LabelDistribution,
    pub quality_distribution: QualityDistribution,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AverageSentiment {
    pub score: f64,
    pub label: SentimentLabel,
    pub confidence: f64,
}

/// All three label buckets, present even when zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelDistribution {
    pub bullish: usize,
    pub bearish: usize,
    pub neutral: usize,
}

impl LabelDistribution {
    fn record(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Bullish => self.bullish += 1,
            SentimentLabel::Bearish => self.bearish += 1,
            SentimentLabel::Neutral => self.neutral += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.bullish + self.bearish + self.neutral
    }
}

/// All four quality buckets, present even when zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QualityDistribution {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub very_low: usize,
}

impl QualityDistribution {
    fn record(&mut self, quality: Quality) {
        match quality {
            Quality::High => self.high += 1,
            Quality::Medium => self.medium += 1,
            Quality::Low => self.low += 1,
            Quality::VeryLow => self.very_low += 1,
        }
    }
}

/// Enrich one ensemble verdict with the confidence factors and derived
/// classifications. `text` is the original raw item text (length factors
/// apply to what the caller sent, not to the cleaned form).
pub fn enrich(
    verdict: &EnsembleVerdict,
    text: &str,
    ticker: Option<String>,
    source: Source,
    reliability: &ReliabilityConfig,
    entities: Entities,
    options: &AnalyzeOptions,
) -> EnrichedResult {
    let text_length = text.chars().count();
    let source_reliability = reliability.reliability_for(source);

    let mut confidence = verdict.confidence;
    confidence *= 0.5 + source_reliability * 0.5;
    confidence *= length_factor(text_length);
    let entity_count = entities.count();
    if entity_count > 0 {
        confidence *= (1.0 + entity_count as f64 * 0.05).min(1.2);
    }
    let confidence = confidence.min(1.0);

    let meets_threshold = options.confidence_threshold.map(|t| confidence >= t);

    EnrichedResult {
        sentiment: SentimentBlock {
            score: round3(verdict.score),
            label: verdict.label,
            confidence: round3(confidence),
            strength: Strength::from_score(verdict.score),
            quality: Quality::from_confidence(confidence),
        },
        analysis: AnalysisBlock {
            text_length,
            word_count: text.split_whitespace().count(),
            source,
            source_reliability,
            model_agreement: round3(verdict.agreement),
            processing_timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        },
        entities,
        metadata: MetadataBlock {
            ticker,
            meets_threshold,
        },
    }
}

/// Text-length confidence factor. Very short snippets are unreliable; very
/// long ones dilute signal but are never penalized below 0.8.
fn length_factor(length: usize) -> f64 {
    let len = length as f64;
    if (50.0..=200.0).contains(&len) {
        1.0
    } else if len < 50.0 {
        0.7 + (len / 50.0) * 0.3
    } else {
        (1.0 - (len - 200.0) / 1000.0).max(0.8)
    }
}

/// Roll an ordered sequence of enriched results into batch statistics.
/// The label/quality buckets count each item's own displayed classification
/// (never re-derived from the rounded score or from the mean), so the
/// distributions always agree with the labels the caller sees per item.
/// Empty input yields all zeros with every bucket present.
pub fn summarize(results: &[EnrichedResult]) -> BatchSummary {
    let mut labels = LabelDistribution::default();
    let mut qualities = QualityDistribution::default();

    let scores: Vec<f64> = results.iter().map(|r| r.sentiment.score).collect();
    let confidences: Vec<f64> = results.iter().map(|r| r.sentiment.confidence).collect();

    for r in results {
        labels.record(r.sentiment.label);
        qualities.record(r.sentiment.quality);
    }

    let avg_score = mean(&scores);
    let avg_confidence = mean(&confidences);

    BatchSummary {
        total_texts: results.len(),
        average_sentiment: AverageSentiment {
            score: round3(avg_score),
            label: SentimentLabel::from_score(avg_score),
            confidence: round3(avg_confidence),
        },
        score_std: round3(population_std(&scores)),
        confidence_std: round3(population_std(&confidences)),
        sentiment_distribution: labels,
        quality_distribution: qualities,
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation; 0.0 for empty input.
fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}
