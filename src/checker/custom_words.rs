use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// Outcome of a bulk import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub imported: usize,
    pub failed: Vec<String>,
}

/// User-approved words. Membership turns an invalid verdict into a valid
/// one and never the reverse.
///
/// Words are stored lowercased, so lookups are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct CustomWordSet {
    words: BTreeSet<String>,
}

impl CustomWordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the word was not already present.
    pub fn add(&mut self, word: &str) -> bool {
        match normalize(word) {
            Some(word) => self.words.insert(word),
            None => false,
        }
    }

    pub fn remove(&mut self, word: &str) -> bool {
        self.words.remove(&word.trim().to_lowercase())
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    pub fn clear(&mut self) {
        self.words.clear();
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    /// Add every entry of `words`; blank or whitespace-containing entries are
    /// reported back in `failed`.
    pub fn import<I, S>(&mut self, words: I) -> ImportReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = ImportReport::default();
        for word in words {
            let word = word.as_ref();
            match normalize(word) {
                Some(normalized) => {
                    self.words.insert(normalized);
                    report.imported += 1;
                }
                None => report.failed.push(word.to_string()),
            }
        }
        report
    }

    /// Import a JSON array of strings. Malformed input imports nothing and
    /// reports no failures.
    pub fn import_json(&mut self, json: &str) -> ImportReport {
        match serde_json::from_str::<Value>(json) {
            Ok(payload @ Value::Array(_)) => self.import_value(&payload),
            Ok(_) => {
                tracing::warn!("ignoring custom word import that is not a JSON array");
                ImportReport::default()
            }
            Err(e) => {
                tracing::warn!(error = %e, "ignoring malformed custom word import");
                ImportReport::default()
            }
        }
    }

    /// Import a decoded payload: an array of words, or a string holding a
    /// JSON array. Array entries that are not usable words, strings or not,
    /// are reported in `failed`. Any other payload imports nothing.
    pub fn import_value(&mut self, payload: &Value) -> ImportReport {
        let entries = match payload {
            Value::Array(entries) => entries,
            Value::String(json) => return self.import_json(json),
            other => {
                tracing::warn!(payload = %other, "ignoring custom word import that is not a list");
                return ImportReport::default();
            }
        };

        let mut report = ImportReport::default();
        for entry in entries {
            match entry.as_str().and_then(normalize) {
                Some(word) => {
                    self.words.insert(word);
                    report.imported += 1;
                }
                None => report.failed.push(match entry {
                    Value::String(word) => word.clone(),
                    other => other.to_string(),
                }),
            }
        }
        report
    }

    /// Import a newline-separated list, skipping blank lines and `#` comments.
    pub fn import_lines(&mut self, content: &str) -> ImportReport {
        self.import(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        )
    }

    pub fn export_json(&self) -> String {
        serde_json::to_string(&self.words).unwrap_or_else(|_| "[]".to_string())
    }
}

fn normalize(word: &str) -> Option<String> {
    let word = word.trim();
    if word.is_empty() || word.chars().any(char::is_whitespace) {
        return None;
    }
    Some(word.to_lowercase())
}
