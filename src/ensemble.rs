//! # Ensemble Combiner
//! Pure, testable logic that merges independent provider outcomes into one
//! verdict. No I/O; suitable for unit tests and offline evaluation.
//!
//! Policy: weighted mean over successful providers (fixed weight table keyed
//! by provider id), ±0.1 label deadband, mean-of-confidences, and an
//! agreement metric derived from the spread of the successful scores.

use serde::{Deserialize, Serialize};

use crate::providers::{ensemble_weight, ProviderOutcome};
use crate::types::SentimentLabel;

/// Agreement reported when fewer than two providers succeeded: disagreement
/// cannot be measured from one sample, so a defined midpoint is used.
pub const DEFAULT_AGREEMENT: f64 = 0.5;

/// Normalization constant for the agreement metric; scores live in [-1, 1],
/// so a spread above 2 is already total disagreement.
const AGREEMENT_SPREAD: f64 = 2.0;

/// Combined verdict for one item, derived solely from the successful
/// provider scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsembleVerdict {
    pub score: f64,
    pub label: SentimentLabel,
    pub confidence: f64,
    pub agreement: f64,
}

impl EnsembleVerdict {
    /// The defined zero-provider default: nothing succeeded, so the verdict
    /// is neutral with no confidence and midpoint agreement.
    pub fn degenerate() -> Self {
        Self {
            score: 0.0,
            label: SentimentLabel::Neutral,
            confidence: 0.0,
            agreement: DEFAULT_AGREEMENT,
        }
    }
}

/// Merge provider outcomes into one verdict.
///
/// Failures are excluded up front. A successful provider whose id is absent
/// from the weight table contributes zero weight: excluded from both the
/// numerator and the denominator, never treated as an error (its confidence
/// and score still count toward the confidence mean and agreement).
pub fn combine(outcomes: &[ProviderOutcome]) -> EnsembleVerdict {
    let successes: Vec<_> = outcomes.iter().filter_map(|o| o.as_ref().ok()).collect();

    if successes.is_empty() {
        return EnsembleVerdict::degenerate();
    }

    let total_weight: f64 = successes
        .iter()
        .map(|s| ensemble_weight(&s.provider_id))
        .sum();

    // Accumulate score_i * (w_i / total) rather than dividing the weighted
    // sum at the end: for a single weighted provider the ratio is exactly
    // 1.0, so a score sitting on the deadband boundary stays on it.
    let score = if total_weight > 0.0 {
        successes
            .iter()
            .map(|s| s.score * (ensemble_weight(&s.provider_id) / total_weight))
            .sum()
    } else {
        0.0
    };

    let confidence =
        successes.iter().map(|s| s.confidence).sum::<f64>() / successes.len() as f64;

    let scores: Vec<f64> = successes.iter().map(|s| s.score).collect();
    let agreement = agreement_from_scores(&scores);

    EnsembleVerdict {
        score,
        label: SentimentLabel::from_score(score),
        confidence,
        agreement,
    }
}

/// Agreement in [0, 1] from the spread of successful scores:
/// `max(0, 1 - std/2)`. Fewer than two samples yield the fixed default.
fn agreement_from_scores(scores: &[f64]) -> f64 {
    if scores.len() < 2 {
        return DEFAULT_AGREEMENT;
    }
    let std_dev = population_std(scores);
    (1.0 - std_dev / AGREEMENT_SPREAD).clamp(0.0, 1.0)
}

/// Population standard deviation.
fn population_std(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{FailureKind, ProviderFailure, ProviderScore};

    fn ok(id: &str, score: f64, confidence: f64) -> ProviderOutcome {
        Ok(ProviderScore::new(id, score, confidence))
    }

    fn fail(id: &str) -> ProviderOutcome {
        Err(ProviderFailure::new(id, FailureKind::Unavailable))
    }

    #[test]
    fn zero_provider_default() {
        let v = combine(&[fail("finbert"), fail("vader")]);
        assert!((v.score - 0.0).abs() < 1e-9);
        assert_eq!(v.label, SentimentLabel::Neutral);
        assert!((v.confidence - 0.0).abs() < 1e-9);
        assert!((v.agreement - 0.5).abs() < 1e-9);
    }

    #[test]
    fn weighted_mean_over_successes_only() {
        // finbert 0.4 * 0.5 + vader 0.3 * -0.2 over weight 0.7
        let v = combine(&[ok("finbert", 0.5, 0.9), ok("vader", -0.2, 0.6), fail("textblob")]);
        let expected = (0.4 * 0.5 + 0.3 * (-0.2)) / 0.7;
        assert!((v.score - expected).abs() < 1e-9);
        assert!((v.confidence - 0.75).abs() < 1e-9);
    }

    #[test]
    fn unweighted_provider_is_excluded_from_mean_not_errored() {
        let v = combine(&[ok("finbert", 0.8, 0.9), ok("experimental", -1.0, 1.0)]);
        // Score ignores the unweighted provider entirely.
        assert!((v.score - 0.8).abs() < 1e-9);
        // Confidence mean still counts it.
        assert!((v.confidence - 0.95).abs() < 1e-9);
    }

    #[test]
    fn all_unweighted_yields_zero_score() {
        let v = combine(&[ok("mystery", 0.9, 0.9)]);
        assert!((v.score - 0.0).abs() < 1e-9);
        assert_eq!(v.label, SentimentLabel::Neutral);
        // Single success: agreement is the fixed default.
        assert!((v.agreement - 0.5).abs() < 1e-9);
    }

    #[test]
    fn lone_weighted_provider_score_is_bitwise_exact() {
        // w / w must be exactly 1.0 so the boundary score passes through
        // without float drift.
        let v = combine(&[ok("finbert", 0.1, 0.5), fail("vader")]);
        assert_eq!(v.score, 0.1);
        assert_eq!(v.label, SentimentLabel::Neutral);
    }

    #[test]
    fn deadband_maps_exact_boundary_to_neutral() {
        // Single weighted provider at exactly 0.1.
        let v = combine(&[ok("finbert", 0.1, 0.5)]);
        assert_eq!(v.label, SentimentLabel::Neutral);

        let v = combine(&[ok("finbert", 0.1000001, 0.5)]);
        assert_eq!(v.label, SentimentLabel::Bullish);

        let v = combine(&[ok("finbert", -0.1, 0.5)]);
        assert_eq!(v.label, SentimentLabel::Neutral);
    }

    #[test]
    fn agreement_reflects_spread() {
        let tight = combine(&[ok("finbert", 0.5, 0.8), ok("vader", 0.52, 0.7)]);
        let split = combine(&[ok("finbert", 0.9, 0.8), ok("vader", -0.9, 0.7)]);
        assert!(tight.agreement > split.agreement);
        // Identical scores agree perfectly.
        let same = combine(&[ok("finbert", 0.4, 0.8), ok("vader", 0.4, 0.7)]);
        assert!((same.agreement - 1.0).abs() < 1e-9);
    }

    #[test]
    fn agreement_is_clamped() {
        let v = combine(&[ok("finbert", 1.0, 1.0), ok("vader", -1.0, 1.0)]);
        assert!(v.agreement >= 0.0 && v.agreement <= 1.0);
    }
}
