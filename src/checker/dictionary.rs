use crate::checker::suggestions;
use crate::error::DictionaryError;
use fst::{Automaton, IntoStreamer, Set, Streamer};

/// Single-word validity and correction capability.
///
/// The engine treats implementations as opaque: it never asks how a verdict
/// was reached, only whether a word is acceptable and what to offer instead.
pub trait MorphologicalDictionary: Send {
    fn check(&self, word: &str) -> bool;

    fn suggest(&self, word: &str) -> Vec<String>;
}

/// Dictionary backed by an in-memory FST of lowercased word forms.
///
/// Built from Hunspell-style sources. Only the stems listed in the word list
/// are accepted; affix flags are stripped rather than expanded. The affix
/// source contributes its `REP` table to suggestion generation.
pub struct WordListDictionary {
    set: Set<Vec<u8>>,
    replacements: Vec<(String, String)>,
    max_suggestions: usize,
}

impl WordListDictionary {
    /// Build from the raw contents of an affix file and a word list.
    pub fn from_sources(affix_rules: &str, word_list: &str) -> Result<Self, DictionaryError> {
        let words = parse_word_list(word_list);
        let mut dict = Self::from_words(words)?;
        dict.replacements = parse_replacements(affix_rules);
        Ok(dict)
    }

    /// Build from plain words. Input order and case do not matter.
    pub fn from_words<I, S>(words: I) -> Result<Self, DictionaryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut sorted: Vec<String> = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        sorted.sort();
        sorted.dedup();

        let set = Set::from_iter(sorted)?;

        Ok(Self {
            set,
            replacements: Vec::new(),
            max_suggestions: suggestions::DEFAULT_MAX_SUGGESTIONS,
        })
    }

    pub fn with_max_suggestions(mut self, max: usize) -> Self {
        self.max_suggestions = max;
        self
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.set.contains(word.to_lowercase().as_bytes())
    }

    /// All words starting with `prefix`.
    pub fn words_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut results = Vec::new();
        let mut stream = self
            .set
            .search(fst::automaton::Str::new(prefix).starts_with())
            .into_stream();

        while let Some(key) = stream.next() {
            if let Ok(word) = String::from_utf8(key.to_vec()) {
                results.push(word);
            }
        }

        results
    }

    pub fn replacements(&self) -> &[(String, String)] {
        &self.replacements
    }
}

impl MorphologicalDictionary for WordListDictionary {
    fn check(&self, word: &str) -> bool {
        self.contains(word)
    }

    fn suggest(&self, word: &str) -> Vec<String> {
        suggestions::generate(&word.to_lowercase(), self, self.max_suggestions)
    }
}

/// Extract stems from a `.dic` body: an optional leading entry count,
/// `#` comments, and `word/FLAGS` lines.
fn parse_word_list(word_list: &str) -> Vec<&str> {
    let mut lines = word_list.lines().map(str::trim).peekable();

    if let Some(first) = lines.peek() {
        if !first.is_empty() && first.chars().all(|c| c.is_ascii_digit()) {
            lines.next();
        }
    }

    lines
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let entry = line.split_whitespace().next()?;
            let stem = entry.split('/').next().unwrap_or(entry);
            (!stem.is_empty()).then_some(stem)
        })
        .collect()
}

/// Read `REP from to` pairs out of an affix file, skipping the `REP n`
/// count header.
fn parse_replacements(affix_rules: &str) -> Vec<(String, String)> {
    affix_rules
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            if fields.next()? != "REP" {
                return None;
            }
            let from = fields.next()?;
            let to = fields.next()?;
            Some((from.replace('_', " "), to.replace('_', " ")))
        })
        .collect()
}
