//! # Text Normalizer
//!
//! Source-aware cleaning of raw financial text. Each source maps to a
//! cleaning profile (social-media, listing-site, news-article, generic);
//! profile passes run in a fixed order, then a generic lowercase/whitespace
//! pass finishes the job.
//!
//! Ticker symbols and (for listing/news profiles) numeric/percentage tokens
//! are load-bearing for downstream scoring, so they are swapped for unique
//! placeholder strings before the lowercasing pass and restored verbatim
//! afterwards. The placeholder format never occurs in natural financial
//! text, and every placeholder is index-unique, so restoration is exact and
//! no marker can leak into the output.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::Source;

/// Cleaning profile selected per source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    SocialMedia,
    ListingSite,
    NewsArticle,
    Generic,
}

impl Profile {
    pub fn for_source(source: Source) -> Self {
        match source {
            Source::Reddit | Source::Twitter => Self::SocialMedia,
            Source::Finviz => Self::ListingSite,
            Source::News | Source::Yahoo => Self::NewsArticle,
            Source::Unknown => Self::Generic,
        }
    }
}

static RE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"http[s]?://[A-Za-z0-9$\-_@.&+!*(),/%#?=~]+").expect("url regex")
});
static RE_MENTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"@[A-Za-z0-9_]+").expect("mention regex"));
static RE_HASHTAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#([A-Za-z0-9_]+)").expect("hashtag regex"));
static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));
static RE_DOT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.{3,}").expect("dot-run regex"));
static RE_DASH_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"-{2,}").expect("dash-run regex"));
static RE_BANG_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"!{2,}").expect("bang-run regex"));
static RE_QMARK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\?{2,}").expect("qmark-run regex"));

/// `$`-prefixed ticker symbol: 1-5 uppercase letters.
static RE_TICKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$[A-Z]{1,5}\b").expect("ticker regex"));
/// Bare uppercase token that looks like a ticker (2-5 letters, no `$`).
static RE_BARE_TICKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z]{2,5}\b").expect("bare ticker regex"));
/// Numeric / percentage token, e.g. `150.50`, `15%`.
static RE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d+(?:\.\d+)?%?").expect("number regex"));
/// Residual emoji after the phrase mapping (common emoji blocks).
static RE_EMOJI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"[\x{1F300}-\x{1F5FF}\x{1F600}-\x{1F64F}\x{1F680}-\x{1F6FF}\x{1F1E0}-\x{1F1FF}]+",
    )
    .expect("emoji regex")
});

/// Bare uppercase words protected without a `$` prefix. Any 2-5 letter
/// all-caps word collides with the ticker shape ("TODAY", "CEO", "NYSE",
/// shouted posts), so only known heavily-discussed symbols qualify;
/// everything else needs the `$` prefix to survive lowercasing.
const KNOWN_BARE_TICKERS: &[&str] = &[
    "AAPL", "MSFT", "GOOG", "GOOGL", "AMZN", "META", "NVDA", "TSLA", "AMD", "INTC", "NFLX",
    "DIS", "BA", "JPM", "GS", "BAC", "WMT", "KO", "PFE", "XOM", "CVX", "GME", "AMC", "BB",
    "NOK", "PLTR", "COIN", "HOOD", "RIVN", "SOFI", "SPY", "QQQ", "DIA", "IWM", "VTI", "VOO",
];

/// Financially meaningful emoji → plain phrase, applied before stripping the rest.
const EMOJI_PHRASES: &[(&str, &str)] = &[
    ("\u{1F680}", "very bullish rocket"),     // 🚀
    ("\u{1F4C8}", "bullish chart up"),        // 📈
    ("\u{1F4C9}", "bearish chart down"),      // 📉
    ("\u{1F48E}", "diamond hands hold"),      // 💎
    ("\u{1F64C}", "diamond hands"),           // 🙌
    ("\u{1F4B0}", "money profit"),            // 💰
    ("\u{1F4B8}", "money loss"),              // 💸
    ("\u{1F525}", "hot trending"),            // 🔥
    ("\u{26A1}", "fast movement"),            // ⚡
    ("\u{1F319}", "to the moon bullish"),     // 🌙
    ("\u{1F43B}", "bearish"),                 // 🐻
    ("\u{1F402}", "bullish"),                 // 🐂
    ("\u{1F62D}", "sad loss"),                // 😭
    ("\u{1F921}", "clown bad decision"),      // 🤡
    ("\u{1F480}", "dead loss"),               // 💀
];

/// Colloquial financial slang → plain phrase. Matched on word boundaries so
/// partial-word collisions (e.g. "add" vs "dd") are excluded.
const SLANG_TABLE: &[(&str, &str)] = &[
    ("hodl", "hold"),
    ("stonks", "stocks"),
    ("tendies", "profits"),
    ("diamond hands", "strong hold"),
    ("paper hands", "weak sell"),
    ("to the moon", "very bullish"),
    ("yolo", "high risk bet"),
    ("fomo", "fear of missing out"),
    ("dd", "due diligence"),
    ("btfd", "buy the dip"),
    ("rekt", "lost money"),
    ("bag holder", "losing position"),
    ("pump and dump", "manipulation"),
    ("rug pull", "scam exit"),
];

static SLANG_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    SLANG_TABLE
        .iter()
        .map(|(slang, plain)| {
            let pat = format!(r"(?i)\b{}\b", regex::escape(slang));
            (Regex::new(&pat).expect("slang regex"), *plain)
        })
        .collect()
});

/// Normalize raw text for the given source. Empty or whitespace-only input
/// yields an empty string; this function never panics on any input.
pub fn normalize(text: &str, source: Source) -> String {
    let profile = Profile::for_source(source);
    normalize_with_profile(text, profile)
}

/// Profile-explicit entry, useful for tests and callers that already
/// resolved the profile.
pub fn normalize_with_profile(text: &str, profile: Profile) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    let mut out = text.to_string();

    // Profile passes in fixed order: URLs, handles/hashtags, emoji, slang,
    // HTML, punctuation runs.
    out = RE_URL.replace_all(&out, " ").into_owned();

    if profile == Profile::SocialMedia {
        out = RE_MENTION.replace_all(&out, " user_mention ").into_owned();
        out = RE_HASHTAG.replace_all(&out, "$1").into_owned();
        out = convert_emoji(&out);
        out = normalize_slang(&out);
    }

    if matches!(profile, Profile::ListingSite | Profile::NewsArticle) {
        out = html_escape::decode_html_entities(&out).into_owned();
        out = RE_TAGS.replace_all(&out, " ").into_owned();
    }

    out = RE_DOT_RUN.replace_all(&out, "...").into_owned();
    out = RE_DASH_RUN.replace_all(&out, "--").into_owned();
    out = RE_BANG_RUN.replace_all(&out, "!").into_owned();
    out = RE_QMARK_RUN.replace_all(&out, "?").into_owned();

    // Protect load-bearing tokens before the lowercasing pass.
    let (masked, protected) = protect_tokens(&out, profile);

    // Generic cleanup: lowercase, collapse whitespace, trim.
    let mut cleaned = masked.to_lowercase();
    cleaned = RE_WS.replace_all(&cleaned, " ").trim().to_string();

    restore_tokens(cleaned, &protected)
}

/// Replace financial emoji with their mapped phrases, then strip the rest.
fn convert_emoji(text: &str) -> String {
    let mut out = text.to_string();
    for (emoji, phrase) in EMOJI_PHRASES {
        if out.contains(emoji) {
            out = out.replace(emoji, &format!(" {phrase} "));
        }
    }
    RE_EMOJI.replace_all(&out, " ").into_owned()
}

/// Word-boundary slang replacement; the rest of the text is untouched
/// (lowercasing happens later, after token protection).
fn normalize_slang(text: &str) -> String {
    let mut out = text.to_string();
    for (re, plain) in SLANG_PATTERNS.iter() {
        out = re.replace_all(&out, *plain).into_owned();
    }
    out
}

/// Placeholder for the i-th protected token. Lowercasing and whitespace
/// collapse leave it untouched, and the index makes each one unique.
fn placeholder(index: usize) -> String {
    format!("__protected{index}__")
}

/// Extract protected tokens and swap each for its placeholder.
/// Tickers (`$AAPL` and bare `AAPL`) are protected for every profile;
/// numeric/percentage tokens additionally for listing/news profiles.
fn protect_tokens(text: &str, profile: Profile) -> (String, Vec<String>) {
    let mut protected: Vec<String> = Vec::new();

    let mut out = RE_TICKER
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let token = caps[0].to_string();
            let mark = placeholder(protected.len());
            protected.push(token);
            mark
        })
        .into_owned();

    out = RE_BARE_TICKER
        .replace_all(&out, |caps: &regex::Captures<'_>| {
            let token = &caps[0];
            if !KNOWN_BARE_TICKERS.contains(&token) {
                return token.to_string();
            }
            let mark = placeholder(protected.len());
            protected.push(token.to_string());
            mark
        })
        .into_owned();

    if matches!(profile, Profile::ListingSite | Profile::NewsArticle) {
        out = RE_NUMBER
            .replace_all(&out, |caps: &regex::Captures<'_>| {
                let token = caps[0].to_string();
                let mark = placeholder(protected.len());
                protected.push(token);
                mark
            })
            .into_owned();
    }

    (out, protected)
}

/// Restore each placeholder with its original token, verbatim.
fn restore_tokens(mut text: String, protected: &[String]) -> String {
    for (i, token) in protected.iter().enumerate() {
        text = text.replace(&placeholder(i), token);
    }
    text
}
