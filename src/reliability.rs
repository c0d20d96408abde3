//! # Source Reliability
//!
//! Configurable mapping from data sources (e.g. "reddit", "finviz", "news")
//! to reliability weights in `[0.0, 1.0]`, used by the confidence enhancer.
//!
//! - Loads from JSON config (weights + aliases).
//! - Case-insensitive lookup with light normalization.
//! - Aliases map alternative names to canonical sources.
//! - Fallback order: aliases, then exact match, then the default weight.
//! - Includes a built-in `default_seed()` with the known sources.

use serde::Deserialize;
use std::{collections::HashMap, fs, path::Path};

use crate::types::Source;

/// Reliability configuration, loaded from JSON or defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct ReliabilityConfig {
    /// Default reliability if no match is found.
    #[serde(default = "default_reliability")]
    pub default_weight: f64,
    /// Explicit reliabilities for canonical source names.
    #[serde(default)]
    pub weights: HashMap<String, f64>,
    /// Aliases mapping non-canonical names → canonical names.
    #[serde(default)]
    pub aliases: HashMap<String, String>,
}

fn default_reliability() -> f64 {
    0.5
}

impl ReliabilityConfig {
    /// Load configuration from a JSON file.
    /// Falls back to `default_seed()` on error.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(path) {
            Ok(s) => serde_json::from_str(&s).unwrap_or_else(|_| Self::default_seed()),
            Err(_) => Self::default_seed(),
        }
    }

    /// Reliability for a typed source.
    pub fn reliability_for(&self, source: Source) -> f64 {
        self.reliability_for_name(source.as_str())
    }

    /// Reliability lookup by raw name: alias → exact → default.
    pub fn reliability_for_name(&self, source: &str) -> f64 {
        let s = source.trim().to_ascii_lowercase();

        if let Some(canon) = self.aliases.get(&s) {
            if let Some(&w) = self.weights.get(&canon.to_ascii_lowercase()) {
                return clamp01(w);
            }
        }

        if let Some(&w) = self.weights.get(&s) {
            return clamp01(w);
        }

        clamp01(self.default_weight)
    }

    /// Built-in seed matching the documented per-source reliabilities.
    /// Used as fallback if no config file is found.
    pub(crate) fn default_seed() -> Self {
        let mut weights = HashMap::new();
        let mut aliases = HashMap::new();

        for (k, v) in [
            ("reddit", 0.7),
            ("finviz", 0.9),
            ("news", 0.85),
            ("yahoo", 0.8),
            ("twitter", 0.6),
            ("unknown", 0.5),
        ] {
            weights.insert(k.to_string(), v);
        }

        for (a, c) in [
            ("wallstreetbets", "reddit"),
            ("wsb", "reddit"),
            ("yahoo finance", "yahoo"),
            ("yahoo_finance", "yahoo"),
            ("x", "twitter"),
            ("google news", "news"),
        ] {
            aliases.insert(a.to_string(), c.to_string());
        }

        Self {
            default_weight: 0.5,
            weights,
            aliases,
        }
    }
}

impl Default for ReliabilityConfig {
    fn default() -> Self {
        Self::default_seed()
    }
}

/// Clamp to [0.0, 1.0].
fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}
