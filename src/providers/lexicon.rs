//! Custom financial-lexicon provider ("financial_lexicon").
//!
//! Weighted term matching over a finance/market-slang lexicon, including
//! multi-word phrases. The raw score is the sum of term weight × occurrence
//! count, normalized by the text's word count and clamped to [-1, 1].
//! Confidence is `min(2 * |score|, 1)`: lexicon hits in short texts are a
//! strong signal, sparse hits in long texts a weak one.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde_json::json;

use super::{ProviderOutcome, ProviderScore, SentimentProvider};

/// Maximum matched terms surfaced in `extra`.
const TOP_TERMS: usize = 5;

static LEXICON: Lazy<Vec<(&'static str, f64)>> = Lazy::new(|| {
    vec![
        // Bullish terms
        ("bullish", 2.0),
        ("moon", 1.8),
        ("rocket", 1.5),
        ("pump", 1.3),
        ("surge", 1.4),
        ("rally", 1.3),
        ("breakout", 1.2),
        ("uptrend", 1.1),
        ("gains", 1.0),
        ("profit", 1.0),
        ("buy", 0.8),
        ("long", 0.7),
        ("hold", 0.5),
        ("diamond hands", 1.5),
        ("hodl", 1.2),
        ("to the moon", 2.0),
        ("stonks", 1.0),
        ("tendies", 1.3),
        ("lambo", 1.8),
        // Bearish terms
        ("bearish", -2.0),
        ("crash", -1.8),
        ("dump", -1.5),
        ("tank", -1.4),
        ("plummet", -1.6),
        ("collapse", -1.7),
        ("sell", -0.8),
        ("short", -0.9),
        ("puts", -0.7),
        ("bear", -1.0),
        ("recession", -1.5),
        ("bubble", -1.2),
        ("overvalued", -1.0),
        ("correction", -0.8),
        ("paper hands", -1.3),
        ("bag holder", -1.1),
        ("rekt", -1.5),
        ("rug pull", -2.0),
        // Neutral / context terms
        ("sideways", 0.0),
        ("flat", 0.0),
        ("consolidation", 0.0),
        ("volatility", 0.0),
        ("earnings", 0.0),
        ("dividend", 0.2),
        ("split", 0.1),
    ]
});

pub struct FinancialLexiconProvider;

impl FinancialLexiconProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FinancialLexiconProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Non-overlapping occurrence count of `term` in `text`.
fn count_occurrences(text: &str, term: &str) -> usize {
    text.matches(term).count()
}

#[async_trait]
impl SentimentProvider for FinancialLexiconProvider {
    async fn score(&self, text: &str) -> ProviderOutcome {
        let lowered = text.to_lowercase();
        let word_count = lowered.split_whitespace().count();

        let mut total = 0.0f64;
        let mut matched: Vec<serde_json::Value> = Vec::new();

        for (term, weight) in LEXICON.iter() {
            let count = count_occurrences(&lowered, term);
            if count == 0 {
                continue;
            }
            total += weight * count as f64;
            if matched.len() < TOP_TERMS {
                matched.push(json!({
                    "term": term,
                    "score": weight,
                    "count": count,
                }));
            }
        }

        let normalized = if word_count > 0 {
            (total / word_count as f64).clamp(-1.0, 1.0)
        } else {
            0.0
        };
        let confidence = (normalized.abs() * 2.0).min(1.0);

        Ok(
            ProviderScore::new(self.id(), normalized, confidence).with_extra(json!({
                "matched_terms": matched,
                "total_raw_score": total,
            })),
        )
    }

    fn id(&self) -> &'static str {
        "financial_lexicon"
    }
}
