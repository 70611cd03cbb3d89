//! Canonical text form for feature extraction
//!
//! Training and serving both route review text through [`normalize`] before
//! extraction, so a feature value never depends on which side computed it.

use once_cell::sync::Lazy;
use regex::Regex;

/// Runs of non-whitespace starting with a URL scheme or `www`.
static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"http\S+|www\S+|https\S+").expect("URL pattern is a valid regex literal")
});

/// Normalize a review from its optional summary and body.
///
/// Steps: join summary and body with a space, lower-case, drop URL runs,
/// keep only ASCII letters, whitespace and `.,!?`, collapse whitespace,
/// trim. Never fails; may return an empty string.
pub fn normalize(raw_summary: Option<&str>, raw_body: Option<&str>) -> String {
    let joined = format!(
        "{} {}",
        raw_summary.unwrap_or_default(),
        raw_body.unwrap_or_default()
    );
    normalize_text(&joined)
}

/// Single-field form of [`normalize`], used for request text at serving time.
pub fn normalize_text(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let without_urls = URL_PATTERN.replace_all(&lowered, "");

    let mut out = String::with_capacity(without_urls.len());
    let mut pending_space = false;
    for ch in without_urls.chars() {
        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        if !(ch.is_ascii_alphabetic() || matches!(ch, '.' | ',' | '!' | '?')) {
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(ch);
    }
    out
}
