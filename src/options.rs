//! Per-call analysis options: a fixed, enumerated set of recognized toggles
//! with defaults. Unrecognized keys in the request body are ignored rather
//! than splatted through the call chain.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Recognized per-call options. Every field has a default so a missing or
/// empty `options` object is valid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalyzeOptions {
    /// Whether the transformer provider participates in the ensemble.
    pub use_finbert: bool,
    /// Whether the valence-lexicon provider participates in the ensemble.
    pub use_vader: bool,
    /// Whether financial entities are extracted and allowed to boost confidence.
    pub extract_entities: bool,
    /// Advisory threshold: results below it are flagged, never filtered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_threshold: Option<f64>,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            use_finbert: true,
            use_vader: true,
            extract_entities: true,
            confidence_threshold: None,
        }
    }
}

impl AnalyzeOptions {
    /// Canonical (sorted-key) JSON form used in cache key derivation.
    pub fn canonical_json(&self) -> String {
        let value = serde_json::to_value(self).unwrap_or(Value::Null);
        canonicalize(&value).to_string()
    }
}

/// Recursively sort object keys so serialization order never leaks into
/// cache keys. `serde_json::Map` preserves insertion order by default.
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut out = Map::new();
            for k in keys {
                out.insert(k.clone(), canonicalize(&map[k]));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}
