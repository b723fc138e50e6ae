//! Post text cleaning applied before classification.

use once_cell::sync::Lazy;
use regex::Regex;

/// Cleaned posts shorter than this many characters are not classified.
pub const MIN_CLEANED_LEN: usize = 5;

static NOISE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"http\S+|@\S+|#\S+").expect("noise pattern is valid"));

/// Strips links, mentions and hashtags from `raw` and trims the result.
///
/// A match runs from the marker to the next whitespace, wherever the marker
/// appears. Whitespace between the remaining words is left untouched.
pub fn normalize(raw: &str) -> String {
    NOISE_RE.replace_all(raw, "").trim().to_string()
}

/// Whether cleaned text is long enough to be worth classifying.
pub fn is_analyzable(cleaned: &str) -> bool {
    cleaned.chars().count() >= MIN_CLEANED_LEN
}
