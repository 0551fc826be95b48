pub mod custom_words;
pub mod dictionary;
pub mod suggestions;
pub mod tokenizer;

use crate::cache::LruCache;
use crate::diff::{DiffRegion, DEFAULT_CONTEXT_WORDS};
use crate::CheckResult;
use custom_words::{CustomWordSet, ImportReport};
use dictionary::MorphologicalDictionary;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use suggestions::SuggestionService;
use tokenizer::{char_slice, collapse_whitespace, tokenize, widen_to_whitespace};

pub const DEFAULT_WORD_CACHE_CAPACITY: usize = 5000;
pub const DEFAULT_REGION_CACHE_CAPACITY: usize = 1000;
pub const DEFAULT_YIELD_INTERVAL: Duration = Duration::from_millis(16);

/// Tunables for a [`SpellCheckEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    pub word_cache_capacity: usize,
    pub region_cache_capacity: usize,
    pub context_words: usize,
    pub max_suggestions: usize,
    pub yield_interval: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            word_cache_capacity: DEFAULT_WORD_CACHE_CAPACITY,
            region_cache_capacity: DEFAULT_REGION_CACHE_CAPACITY,
            context_words: DEFAULT_CONTEXT_WORDS,
            max_suggestions: suggestions::DEFAULT_MAX_SUGGESTIONS,
            yield_interval: DEFAULT_YIELD_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub custom_words_count: usize,
    pub word_cache_size: usize,
    pub word_cache_capacity: usize,
    pub region_cache_size: usize,
    pub region_cache_capacity: usize,
    pub known_invalid_count: usize,
    pub dictionary_ready: bool,
}

#[derive(Debug, Clone)]
struct RegionCacheEntry {
    /// Whitespace-collapsed text of the widened region when it was checked.
    text: String,
    words: Vec<String>,
    /// Positions relative to the start of the widened region.
    results: Vec<CheckResult>,
}

/// Cooperative yield point for long checks.
struct Checkpoint {
    interval: Duration,
    since: Instant,
    yields: usize,
}

impl Checkpoint {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            since: Instant::now(),
            yields: 0,
        }
    }

    async fn tick(&mut self) {
        if self.since.elapsed() >= self.interval {
            tokio::task::yield_now().await;
            self.yields += 1;
            self.since = Instant::now();
        }
    }
}

/// Spell-checking state for one document session.
///
/// Word verdicts are cached by lowercased form and region results by span;
/// any change to the custom word set drops both caches. Until a dictionary
/// is installed every word is treated as valid.
pub struct SpellCheckEngine {
    dictionary: Option<Box<dyn MorphologicalDictionary>>,
    custom_words: CustomWordSet,
    word_cache: LruCache<String, bool>,
    region_cache: LruCache<String, RegionCacheEntry>,
    known_invalid: BTreeMap<String, bool>,
    last_full_text: String,
    suggestions: SuggestionService,
    yield_interval: Duration,
    yields: usize,
    context_words: usize,
}

impl SpellCheckEngine {
    pub fn new(options: EngineOptions) -> Self {
        Self {
            dictionary: None,
            custom_words: CustomWordSet::new(),
            word_cache: LruCache::new(options.word_cache_capacity),
            region_cache: LruCache::new(options.region_cache_capacity),
            known_invalid: BTreeMap::new(),
            last_full_text: String::new(),
            suggestions: SuggestionService::new(options.max_suggestions),
            yield_interval: options.yield_interval,
            yields: 0,
            context_words: options.context_words,
        }
    }

    /// Install the dictionary. Verdicts recorded before this point are
    /// discarded.
    pub fn set_dictionary(&mut self, dictionary: Box<dyn MorphologicalDictionary>) {
        self.dictionary = Some(dictionary);
        self.invalidate();
        tracing::info!("dictionary ready");
    }

    pub fn is_dictionary_ready(&self) -> bool {
        self.dictionary.is_some()
    }

    pub fn custom_words(&self) -> &CustomWordSet {
        &self.custom_words
    }

    pub fn last_full_text(&self) -> &str {
        &self.last_full_text
    }

    pub fn context_words(&self) -> usize {
        self.context_words
    }

    /// Times a check has handed control back to the runtime since this
    /// engine was created.
    pub fn yield_count(&self) -> usize {
        self.yields
    }

    /// Lowercased words currently known to be misspelled, each mapped to
    /// `false`.
    pub fn known_invalid(&self) -> &BTreeMap<String, bool> {
        &self.known_invalid
    }

    /// Check every word of `text` and make it the new session baseline.
    pub async fn check_full(&mut self, text: &str) -> Vec<CheckResult> {
        let mut checkpoint = Checkpoint::new(self.yield_interval);
        let mut results = Vec::new();

        for token in tokenize(text) {
            if !self.verdict(&token.text) {
                results.push(CheckResult {
                    word: token.text,
                    start: token.start,
                    end: token.end,
                });
            }
            checkpoint.tick().await;
        }

        tracing::debug!(
            words_flagged = results.len(),
            yields = checkpoint.yields,
            "full check complete"
        );
        self.yields += checkpoint.yields;
        self.last_full_text = text.to_string();
        results
    }

    /// Check only `regions` of `full_text`. Returned positions are relative
    /// to `full_text`. Regions that do not fit the text are skipped.
    ///
    /// Word boundaries come from `full_text`: each region is widened to the
    /// surrounding whitespace before tokenizing, and only words overlapping
    /// the region are reported.
    pub async fn check_incremental(
        &mut self,
        full_text: &str,
        regions: &[DiffRegion],
    ) -> Vec<CheckResult> {
        let mut checkpoint = Checkpoint::new(self.yield_interval);
        let mut results = Vec::new();

        for region in regions {
            let span = widen_to_whitespace(full_text, region.start, region.end)
                .and_then(|(lo, hi)| Some((lo, char_slice(full_text, lo, hi)?)));
            let Some((lo, current)) = span else {
                tracing::debug!(
                    start = region.start,
                    end = region.end,
                    "skipping region outside text"
                );
                continue;
            };

            let key = format!("{}-{}", region.start, region.end);
            let normalized = collapse_whitespace(current);

            let cached = self
                .region_cache
                .get(key.as_str())
                .filter(|entry| entry.text == normalized)
                .map(|entry| entry.results.clone());

            let local = match cached {
                Some(local) => {
                    for result in &local {
                        self.known_invalid.insert(result.word.to_lowercase(), false);
                    }
                    local
                }
                None => {
                    let mut local = Vec::new();
                    let mut words = Vec::new();
                    for token in tokenize(current) {
                        let overlaps = lo + token.start < region.end && lo + token.end > region.start;
                        if !overlaps {
                            continue;
                        }
                        if !self.verdict(&token.text) {
                            local.push(CheckResult {
                                word: token.text.clone(),
                                start: token.start,
                                end: token.end,
                            });
                        }
                        words.push(token.text);
                        checkpoint.tick().await;
                    }
                    self.region_cache.set(
                        key,
                        RegionCacheEntry {
                            text: normalized,
                            words,
                            results: local.clone(),
                        },
                    );
                    local
                }
            };

            results.extend(local.into_iter().map(|r| r.offset(lo)));
        }

        self.yields += checkpoint.yields;
        self.last_full_text = full_text.to_string();
        results
    }

    /// Accept `word` from now on. Re-checks the last text if there is one.
    pub async fn add_word(&mut self, word: &str) -> Option<Vec<CheckResult>> {
        self.custom_words.add(word);
        self.refresh().await
    }

    pub async fn remove_word(&mut self, word: &str) -> Option<Vec<CheckResult>> {
        self.custom_words.remove(word);
        self.refresh().await
    }

    pub async fn import_words(
        &mut self,
        words: &[String],
    ) -> (ImportReport, Option<Vec<CheckResult>>) {
        let report = self.custom_words.import(words);
        self.after_import(report).await
    }

    /// Import a raw JSON payload (see [`CustomWordSet::import_value`]). A
    /// payload that yields no words leaves the caches untouched.
    pub async fn import_payload(
        &mut self,
        payload: &Value,
    ) -> (ImportReport, Option<Vec<CheckResult>>) {
        let report = self.custom_words.import_value(payload);
        self.after_import(report).await
    }

    /// Drop all custom words and cached verdicts without re-checking.
    pub fn clear_words(&mut self) {
        self.custom_words.clear();
        self.invalidate();
    }

    pub fn suggest(&self, word: &str) -> Vec<String> {
        self.suggestions
            .suggest(word, self.dictionary.as_deref(), &self.custom_words)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            custom_words_count: self.custom_words.len(),
            word_cache_size: self.word_cache.len(),
            word_cache_capacity: self.word_cache.capacity(),
            region_cache_size: self.region_cache.len(),
            region_cache_capacity: self.region_cache.capacity(),
            known_invalid_count: self.known_invalid.len(),
            dictionary_ready: self.is_dictionary_ready(),
        }
    }

    /// Words recorded for a cached region span, if any.
    pub fn cached_region_words(&self, start: usize, end: usize) -> Option<&[String]> {
        self.region_cache
            .peek(format!("{}-{}", start, end).as_str())
            .map(|entry| entry.words.as_slice())
    }

    async fn after_import(
        &mut self,
        report: ImportReport,
    ) -> (ImportReport, Option<Vec<CheckResult>>) {
        if report.imported == 0 {
            return (report, None);
        }
        let recheck = self.refresh().await;
        (report, recheck)
    }

    async fn refresh(&mut self) -> Option<Vec<CheckResult>> {
        self.invalidate();
        if self.last_full_text.is_empty() {
            return None;
        }
        let text = std::mem::take(&mut self.last_full_text);
        Some(self.check_full(&text).await)
    }

    fn invalidate(&mut self) {
        self.word_cache.clear();
        self.region_cache.clear();
        self.known_invalid.clear();
        tracing::debug!("word and region caches invalidated");
    }

    fn verdict(&mut self, word: &str) -> bool {
        let key = word.to_lowercase();

        let valid = match self.word_cache.get(key.as_str()) {
            Some(&valid) => valid,
            None => match self.dictionary.as_ref() {
                Some(dictionary) => {
                    let valid = self.custom_words.contains(&key) || dictionary.check(word);
                    self.word_cache.set(key.clone(), valid);
                    valid
                }
                // Nothing can be flagged before the dictionary is loaded.
                None => true,
            },
        };

        if valid {
            self.known_invalid.remove(&key);
        } else {
            self.known_invalid.insert(key, false);
        }
        valid
    }
}

impl Default for SpellCheckEngine {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}
