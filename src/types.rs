//! Shared data model: sources, sentiment labels, and the derived
//! strength/quality classifications.
//!
//! The label deadband and the strength/quality thresholds are fixed design
//! constants shared by every call site; a score becomes a label the same way
//! everywhere.

use serde::{Deserialize, Serialize};

/// Neutral deadband around zero: |score| <= 0.1 maps to Neutral.
pub const LABEL_DEADBAND: f64 = 0.1;

/// One raw input item as received from the caller. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawItem {
    pub text: String,
    pub ticker: Option<String>,
}

/// Where a batch of text came from. Unrecognized strings fall back to
/// `Unknown`, which selects the generic cleaning profile and the default
/// reliability weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Source {
    Reddit,
    Finviz,
    News,
    Yahoo,
    Twitter,
    #[default]
    Unknown,
}

impl Source {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "reddit" => Self::Reddit,
            "finviz" => Self::Finviz,
            "news" => Self::News,
            "yahoo" => Self::Yahoo,
            "twitter" => Self::Twitter,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reddit => "reddit",
            Self::Finviz => "finviz",
            Self::News => "news",
            Self::Yahoo => "yahoo",
            Self::Twitter => "twitter",
            Self::Unknown => "unknown",
        }
    }
}

impl From<String> for Source {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of the sentiment verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Bullish,
    Bearish,
    Neutral,
}

impl SentimentLabel {
    /// Score → label with the fixed ±0.1 deadband. `0.1` exactly is Neutral.
    pub fn from_score(score: f64) -> Self {
        if score > LABEL_DEADBAND {
            Self::Bullish
        } else if score < -LABEL_DEADBAND {
            Self::Bearish
        } else {
            Self::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bullish => "bullish",
            Self::Bearish => "bearish",
            Self::Neutral => "neutral",
        }
    }
}

/// Magnitude class of a verdict, from |score|.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    Strong,
    Moderate,
    Weak,
    Neutral,
}

impl Strength {
    pub fn from_score(score: f64) -> Self {
        let abs = score.abs();
        if abs >= 0.7 {
            Self::Strong
        } else if abs >= 0.4 {
            Self::Moderate
        } else if abs >= 0.1 {
            Self::Weak
        } else {
            Self::Neutral
        }
    }
}

/// Quality class of a verdict, from enhanced confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    High,
    Medium,
    Low,
    VeryLow,
}

impl Quality {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.8 {
            Self::High
        } else if confidence >= 0.6 {
            Self::Medium
        } else if confidence >= 0.4 {
            Self::Low
        } else {
            Self::VeryLow
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::VeryLow => "very_low",
        }
    }
}
