//! Valence-lexicon polarity provider ("vader").
//!
//! Token-level valence scoring with negation handling: a negator within the
//! previous 1..=3 tokens flips the sign of a matched word, and booster words
//! directly before it scale the magnitude. The summed valence is squashed to
//! [-1, 1] with the usual `sum / sqrt(sum^2 + 15)` compound normalization.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde_json::json;
use std::collections::HashMap;

use super::{ProviderOutcome, ProviderScore, SentimentProvider};

/// Compound normalization constant.
const ALPHA: f64 = 15.0;
/// Booster multiplier for intensifiers directly before a scored word.
const BOOST: f64 = 1.25;

static VALENCE: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        // Positive
        ("good", 1.9),
        ("great", 3.1),
        ("strong", 2.3),
        ("beat", 2.0),
        ("beats", 2.0),
        ("gain", 1.8),
        ("gains", 1.8),
        ("growth", 1.9),
        ("profit", 2.1),
        ("profits", 2.1),
        ("rally", 2.2),
        ("surge", 2.4),
        ("soar", 2.6),
        ("soars", 2.6),
        ("up", 1.2),
        ("upgrade", 2.0),
        ("upgraded", 2.0),
        ("bullish", 2.7),
        ("win", 2.4),
        ("record", 1.5),
        ("outperform", 2.2),
        ("exceeded", 1.9),
        ("expectations", 0.4),
        ("positive", 1.9),
        ("buy", 1.3),
        ("hold", 0.3),
        // Negative
        ("bad", -2.5),
        ("weak", -1.8),
        ("miss", -1.9),
        ("missed", -1.9),
        ("loss", -2.2),
        ("losses", -2.2),
        ("drop", -1.9),
        ("drops", -1.9),
        ("fall", -1.8),
        ("falls", -1.8),
        ("fell", -1.8),
        ("down", -1.2),
        ("downgrade", -2.0),
        ("downgraded", -2.0),
        ("bearish", -2.7),
        ("crash", -3.1),
        ("plunge", -2.8),
        ("plummet", -2.9),
        ("tank", -2.4),
        ("disappointing", -2.2),
        ("disappoints", -2.2),
        ("negative", -1.9),
        ("sell", -1.3),
        ("fear", -2.0),
        ("risk", -1.1),
        ("warning", -1.7),
        ("lawsuit", -1.8),
        ("fraud", -3.0),
    ])
});

const NEGATORS: &[&str] = &[
    "not", "no", "never", "isn't", "wasn't", "aren't", "won't", "can't", "cannot", "without",
    "don't", "doesn't", "didn't",
];

const BOOSTERS: &[&str] = &["very", "extremely", "really", "hugely", "massively", "highly"];

pub struct VaderProvider;

impl VaderProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for VaderProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn tokenize(s: &str) -> Vec<String> {
    s.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|t| !t.is_empty())
        .map(|t| t.to_ascii_lowercase())
        .collect()
}

fn is_negator(tok: &str) -> bool {
    NEGATORS.contains(&tok)
}

fn is_booster(tok: &str) -> bool {
    BOOSTERS.contains(&tok)
}

#[async_trait]
impl SentimentProvider for VaderProvider {
    async fn score(&self, text: &str) -> ProviderOutcome {
        let tokens = tokenize(text);

        let mut sum = 0.0f64;
        let mut pos_hits = 0usize;
        let mut neg_hits = 0usize;

        for i in 0..tokens.len() {
            let Some(&base) = VALENCE.get(tokens[i].as_str()) else {
                continue;
            };

            // Negator within the previous 1..=3 tokens flips the sign.
            let negated = (1..=3).any(|k| i >= k && is_negator(tokens[i - k].as_str()));
            // Booster directly before scales the magnitude.
            let boosted = i >= 1 && is_booster(tokens[i - 1].as_str());

            let mut v = if negated { -base } else { base };
            if boosted {
                v *= BOOST;
            }

            if v > 0.0 {
                pos_hits += 1;
            } else if v < 0.0 {
                neg_hits += 1;
            }
            sum += v;
        }

        let compound = sum / (sum * sum + ALPHA).sqrt();
        let neutral = tokens.len().saturating_sub(pos_hits + neg_hits);

        Ok(
            ProviderScore::new(self.id(), compound, compound.abs()).with_extra(json!({
                "breakdown": {
                    "positive": pos_hits,
                    "negative": neg_hits,
                    "neutral": neutral,
                },
            })),
        )
    }

    fn id(&self) -> &'static str {
        "vader"
    }
}
