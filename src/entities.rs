//! Financial entity extraction: tickers, prices/percentages, organizations,
//! and persons. Tickers and prices are deduplicated sets; organization and
//! person lists are truncated to the top 5 before leaving the core.
//!
//! This runs on the raw item text: the organization and person patterns are
//! keyed off original casing, which normalization would destroy.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Ticker symbols: `$AAPL` or bare `AAPL`.
static RE_TICKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$[A-Z]{1,5}\b|\b[A-Z]{2,5}\b").expect("ticker regex"));
/// Prices and percentages: `$150.50`, `15%`, `3.5%`.
static RE_PRICE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\d+(?:\.\d{1,2})?|\b\d+(?:\.\d+)?%").expect("price regex"));
/// Organization: capitalized name followed by a corporate suffix.
static RE_ORG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([A-Z][A-Za-z&]+(?: [A-Z][A-Za-z&]+)*) (?:Inc|Corp|Corporation|Ltd|LLC|Group|Holdings|Partners|Capital|Bank)\b\.?")
        .expect("org regex")
});
/// Person: honorific or executive title followed by a capitalized name.
static RE_PERSON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:Mr|Ms|Mrs|Dr|CEO|CFO|CTO|Chairman|Chairwoman|Chair|Analyst)\.? ([A-Z][a-z]+(?: [A-Z][a-z]+)?)")
        .expect("person regex")
});

/// Maximum organizations/persons returned.
const TOP_N: usize = 5;

/// Entities extracted from one normalized text.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Entities {
    pub tickers: BTreeSet<String>,
    pub prices: BTreeSet<String>,
    pub organizations: Vec<String>,
    pub persons: Vec<String>,
}

impl Entities {
    /// Total extracted entity count, used for the confidence boost.
    pub fn count(&self) -> usize {
        self.tickers.len() + self.prices.len() + self.organizations.len() + self.persons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }
}

/// Extract financial entities from normalized text.
pub fn extract(text: &str) -> Entities {
    let tickers: BTreeSet<String> = RE_TICKER
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect();

    let prices: BTreeSet<String> = RE_PRICE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect();

    let mut organizations: Vec<String> = Vec::new();
    for caps in RE_ORG.captures_iter(text) {
        let name = caps[1].to_string();
        if !organizations.contains(&name) {
            organizations.push(name);
        }
        if organizations.len() == TOP_N {
            break;
        }
    }

    let mut persons: Vec<String> = Vec::new();
    for caps in RE_PERSON.captures_iter(text) {
        let name = caps[1].to_string();
        if !persons.contains(&name) {
            persons.push(name);
        }
        if persons.len() == TOP_N {
            break;
        }
    }

    Entities {
        tickers,
        prices,
        organizations,
        persons,
    }
}
