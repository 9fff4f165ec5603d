//! Utility functions and helpers.

pub mod clock;
pub mod http;

use std::sync::LazyLock;

use chrono::DateTime;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;
use url::Url;

static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})\.(\d{1,2})\.(\d{4})").expect("valid date pattern"));

static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"));

const ELLIPSIS: &str = "...";

/// Find the first `DD.MM.YYYY`-shaped substring.
pub fn extract_date(text: &str) -> Option<&str> {
    DATE_PATTERN.find(text).map(|m| m.as_str())
}

/// Find the first `DD.MM.YYYY`-shaped substring or return `placeholder`.
pub fn extract_date_or(text: &str, placeholder: &str) -> String {
    extract_date(text).unwrap_or(placeholder).to_string()
}

/// Collapse runs of whitespace into single spaces.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove markup tags from a fragment of HTML.
pub fn strip_tags(s: &str) -> String {
    TAG_PATTERN.replace_all(s, "").trim().to_string()
}

/// Shorten text to at most `max` characters, ending with `...` when cut.
///
/// Counts grapheme clusters so umlauts and emoji are never split.
pub fn truncate(text: &str, max: usize) -> String {
    let graphemes: Vec<&str> = text.graphemes(true).collect();
    if graphemes.len() <= max {
        return text.to_string();
    }

    let keep = max.saturating_sub(ELLIPSIS.len());
    let mut result: String = graphemes[..keep].concat();
    result.push_str(ELLIPSIS);
    result
}

/// Number of user-visible characters in `text`.
pub fn char_len(text: &str) -> usize {
    text.graphemes(true).count()
}

/// Convert an RSS `pubDate` (RFC 2822, or RFC 3339) into `DD.MM.YYYY`.
pub fn format_feed_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|date| date.format("%d.%m.%Y").to_string())
}

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}
