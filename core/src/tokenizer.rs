use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // A word character followed by at least two more word characters or hyphens.
    static ref WORD_RE: Regex = Regex::new(r"[\w][\w-]{2,}").expect("valid regex");
}

/// Split text into raw word-like substrings. No normalization or filtering is applied.
pub fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    WORD_RE.find_iter(text).map(|m| m.as_str())
}
