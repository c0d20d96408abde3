//! General-purpose polarity/subjectivity provider ("textblob").
//!
//! Not finance-aware: matched sentiment words carry a polarity in [-1, 1]
//! and a subjectivity in [0, 1]. Text polarity is the mean over matched
//! words, subjectivity the mean of their subjectivity values. Texts with no
//! matches are neutral and fully objective.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde_json::json;
use std::collections::HashMap;

use super::{ProviderOutcome, ProviderScore, SentimentProvider};

/// word -> (polarity, subjectivity)
static WORDS: Lazy<HashMap<&'static str, (f64, f64)>> = Lazy::new(|| {
    HashMap::from([
        ("excellent", (1.0, 1.0)),
        ("amazing", (0.6, 0.9)),
        ("great", (0.8, 0.75)),
        ("good", (0.7, 0.6)),
        ("best", (1.0, 0.3)),
        ("better", (0.5, 0.5)),
        ("strong", (0.4, 0.5)),
        ("positive", (0.2, 0.4)),
        ("impressive", (0.9, 0.9)),
        ("solid", (0.4, 0.4)),
        ("promising", (0.5, 0.6)),
        ("successful", (0.6, 0.6)),
        ("beat", (0.4, 0.4)),
        ("exceeded", (0.4, 0.5)),
        ("happy", (0.8, 1.0)),
        ("optimistic", (0.5, 0.7)),
        ("terrible", (-1.0, 1.0)),
        ("horrible", (-1.0, 1.0)),
        ("awful", (-0.9, 0.9)),
        ("bad", (-0.7, 0.65)),
        ("worst", (-1.0, 0.3)),
        ("worse", (-0.5, 0.5)),
        ("weak", (-0.4, 0.5)),
        ("negative", (-0.2, 0.4)),
        ("disappointing", (-0.6, 0.7)),
        ("poor", (-0.6, 0.6)),
        ("failed", (-0.6, 0.5)),
        ("missed", (-0.4, 0.4)),
        ("pessimistic", (-0.5, 0.7)),
        ("concerning", (-0.4, 0.6)),
        ("uncertain", (-0.3, 0.6)),
        ("risky", (-0.4, 0.6)),
    ])
});

pub struct PolarityProvider;

impl PolarityProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PolarityProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SentimentProvider for PolarityProvider {
    async fn score(&self, text: &str) -> ProviderOutcome {
        let mut polarity_sum = 0.0f64;
        let mut subjectivity_sum = 0.0f64;
        let mut hits = 0usize;

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            if let Some(&(p, s)) = WORDS.get(token.to_ascii_lowercase().as_str()) {
                polarity_sum += p;
                subjectivity_sum += s;
                hits += 1;
            }
        }

        let (polarity, subjectivity) = if hits > 0 {
            (polarity_sum / hits as f64, subjectivity_sum / hits as f64)
        } else {
            (0.0, 0.0)
        };

        Ok(
            ProviderScore::new(self.id(), polarity, polarity.abs()).with_extra(json!({
                "subjectivity": subjectivity,
            })),
        )
    }

    fn id(&self) -> &'static str {
        "textblob"
    }
}
