//! Small string helpers shared by the segment variants and parsers.

use std::sync::OnceLock;

use regex::Regex;

/// True when every needle is a substring of `haystack`.
///
/// Order-insensitive token matching: `["guide", "skeptic"]` matches
/// "the skeptics' guide".
pub fn contains_all<S: AsRef<str>>(needles: &[S], haystack: &str) -> bool {
    needles.iter().all(|n| haystack.contains(n.as_ref()))
}

/// True when `text` has both a scheme and a host, e.g. `http://x.test/a`.
pub fn is_url(text: &str) -> bool {
    url_host(text).is_some()
}

/// The host (`netloc`) part of a URL, if `text` looks like one.
pub fn url_host(text: &str) -> Option<&str> {
    static URL: OnceLock<Regex> = OnceLock::new();
    let re = URL.get_or_init(|| {
        Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://([^/?#\s]+)").expect("valid url regex")
    });

    re.captures(text.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Trimmed, non-empty lines of `text`.
pub fn non_empty_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// [`non_empty_lines`] padded with empty strings up to `min_len` entries.
pub fn padded_lines(text: &str, min_len: usize) -> Vec<&str> {
    let mut lines = non_empty_lines(text);
    while lines.len() < min_len {
        lines.push("");
    }
    lines
}

/// Owned copy of a possibly-empty URL line.
pub(crate) fn optional_url(line: &str) -> Option<String> {
    if line.is_empty() {
        None
    } else {
        Some(line.to_string())
    }
}
