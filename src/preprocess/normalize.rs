// src/preprocess/normalize.rs
//! Noise removal for raw social-media text.
//!
//! Output is lowercase letters separated by single spaces, the format every later
//! stage tokenizes on. The step order is fixed: mentions and hashtags are removed
//! before punctuation, otherwise their `@`/`#` markers would be gone and the tokens
//! would survive as ordinary words.

use once_cell::sync::OnceCell;
use regex::Regex;

fn re_url() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    // A URL starts at `http`/`https`/`www` not glued to a preceding letter and runs
    // to the next whitespace. The captured prefix is written back.
    RE.get_or_init(|| Regex::new(r"(^|[^\p{L}])(?:http|www)\S*").unwrap())
}

fn re_mention() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"@\w+").unwrap())
}

fn re_hashtag() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"#\w+").unwrap())
}

fn re_digits() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"\d+").unwrap())
}

/// Clean a raw text field. Never fails: anything unusable becomes `""`.
pub fn normalize(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    // 0) Scraped text carries HTML entities (`&amp;`, `&quot;`)
    let decoded = html_escape::decode_html_entities(raw);

    // 1) Lowercase
    let mut out = decoded.to_lowercase();

    // 2) URLs, mentions, hashtags
    out = re_url().replace_all(&out, "${1}").into_owned();
    out = re_mention().replace_all(&out, "").into_owned();
    out = re_hashtag().replace_all(&out, "").into_owned();

    // 3) Digits
    out = re_digits().replace_all(&out, "").into_owned();

    // 4) Punctuation, symbols, emoji: keep letters and whitespace only
    out.retain(|c| c.is_alphabetic() || c.is_whitespace());

    // 5) Collapse whitespace (tabs, newlines, nbsp) and trim. Steps 3-4 can glue
    // fragments into a fresh `http`/`www` token (`w.ww`, `ht1tps`); drop those too.
    out.split_whitespace()
        .filter(|t| !is_url_head(t))
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_url_head(token: &str) -> bool {
    token.starts_with("http") || token.starts_with("www")
}

/// Same as [`normalize`] for a field that may be missing.
pub fn normalize_opt(raw: Option<&str>) -> String {
    raw.map(normalize).unwrap_or_default()
}
