use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    // Candidate runs; boundary and length rules are applied in `tokenize`.
    static ref WORD_RUN: Regex = Regex::new(r"[A-Za-z']+").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Minimum number of characters for a token to be checked.
pub const MIN_WORD_LEN: usize = 2;

/// A checkable word with character offsets into the buffer it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordToken {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// Split `text` into words: runs of ASCII letters and apostrophes at least
/// two characters long, bounded on both sides by non-word characters.
///
/// Leading and trailing apostrophes are not part of a word (`'quoted'` yields
/// `quoted`). A run touching a digit or underscore is dropped entirely, so
/// `abc123` and `snake_case` produce nothing. Offsets count characters, not
/// bytes.
pub fn tokenize(text: &str) -> Vec<WordToken> {
    let mut tokens = Vec::new();
    let mut chars_seen = 0;
    let mut bytes_seen = 0;

    for run in WORD_RUN.find_iter(text) {
        let trimmed = run.as_str().trim_matches('\'');
        if trimmed.len() < MIN_WORD_LEN {
            continue;
        }

        let lead = run.as_str().len() - run.as_str().trim_start_matches('\'').len();
        let byte_start = run.start() + lead;
        let byte_end = byte_start + trimmed.len();

        if touches_word_char(text, byte_start, byte_end) {
            continue;
        }

        chars_seen += text[bytes_seen..byte_start].chars().count();
        bytes_seen = byte_start;

        // The run is pure ASCII, so its byte and char lengths agree.
        tokens.push(WordToken {
            text: trimmed.to_string(),
            start: chars_seen,
            end: chars_seen + trimmed.len(),
        });
    }

    tokens
}

fn touches_word_char(text: &str, byte_start: usize, byte_end: usize) -> bool {
    let is_word = |c: char| c.is_ascii_alphanumeric() || c == '_';
    let before = text[..byte_start].chars().next_back().is_some_and(is_word);
    let after = text[byte_end..].chars().next().is_some_and(is_word);
    before || after
}

/// Number of characters in `text`.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Slice `text` by character offsets, or `None` if the range is inverted or
/// runs past the end.
pub fn char_slice(text: &str, start: usize, end: usize) -> Option<&str> {
    if start > end {
        return None;
    }
    let byte_start = char_to_byte(text, start)?;
    let byte_end = byte_start + char_to_byte(&text[byte_start..], end - start)?;
    Some(&text[byte_start..byte_end])
}

/// Grow the character span `start..end` outward until each side meets
/// whitespace or the edge of `text`, so no word run straddles either end.
/// `None` if the span is inverted or runs past the end.
pub fn widen_to_whitespace(text: &str, start: usize, end: usize) -> Option<(usize, usize)> {
    let chars: Vec<char> = text.chars().collect();
    if start > end || end > chars.len() {
        return None;
    }

    let lo = chars[..start]
        .iter()
        .rposition(|c| c.is_whitespace())
        .map_or(0, |i| i + 1);
    let hi = chars[end..]
        .iter()
        .position(|c| c.is_whitespace())
        .map_or(chars.len(), |i| end + i);
    Some((lo, hi))
}

fn char_to_byte(text: &str, char_offset: usize) -> Option<usize> {
    if char_offset == 0 {
        return Some(0);
    }
    match text.char_indices().nth(char_offset) {
        Some((byte, _)) => Some(byte),
        None if char_len(text) == char_offset => Some(text.len()),
        None => None,
    }
}

/// Collapse every whitespace run to a single space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}
