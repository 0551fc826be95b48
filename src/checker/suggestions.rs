use crate::checker::custom_words::CustomWordSet;
use crate::checker::dictionary::{MorphologicalDictionary, WordListDictionary};

pub const DEFAULT_MAX_SUGGESTIONS: usize = 5;

/// Largest edit distance the fallback will still offer.
const FALLBACK_MAX_DISTANCE: usize = 2;

/// Common short words searched when the dictionary has nothing to offer.
/// Order matters: equal-distance candidates are returned in list order.
const REFERENCE_WORDS: &[&str] = &[
    "the", "be", "to", "of", "and", "in", "that", "have", "it", "for", "not", "on", "with", "he",
    "as", "you", "do", "at", "this", "but", "his", "by", "from", "they", "we", "say", "her",
    "she", "or", "an", "will", "my", "one", "all", "would", "there", "their", "what", "so", "up",
    "out", "if", "about", "who", "get", "which", "go", "me", "when", "make", "can", "like",
    "time", "no", "just", "him", "know", "take", "people", "into", "year", "your", "good",
    "some", "could", "them", "see", "other", "than", "then", "now", "look", "only", "come",
    "its", "over", "think", "also", "back", "after", "use", "two", "how", "our", "work",
    "first", "well", "way", "even", "new", "want", "because", "any", "these", "give", "day",
    "most", "us",
];

/// Correction proposals: the dictionary's own suggestions, or an
/// edit-distance search over a fixed reference list when it has none.
#[derive(Debug, Clone)]
pub struct SuggestionService {
    max_suggestions: usize,
}

impl SuggestionService {
    pub fn new(max_suggestions: usize) -> Self {
        Self { max_suggestions }
    }

    pub fn max_suggestions(&self) -> usize {
        self.max_suggestions
    }

    pub fn suggest(
        &self,
        word: &str,
        dictionary: Option<&dyn MorphologicalDictionary>,
        custom_words: &CustomWordSet,
    ) -> Vec<String> {
        if custom_words.contains(word) {
            return Vec::new();
        }

        let mut suggestions = dictionary.map(|d| d.suggest(word)).unwrap_or_default();
        if suggestions.is_empty() {
            return fallback(word, self.max_suggestions);
        }

        suggestions.truncate(self.max_suggestions);
        suggestions
    }
}

impl Default for SuggestionService {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SUGGESTIONS)
    }
}

/// Reference words within two edits of `word`, excluding exact matches, in
/// reference-list order.
pub fn fallback(word: &str, max: usize) -> Vec<String> {
    let word = word.to_lowercase();
    REFERENCE_WORDS
        .iter()
        .filter(|candidate| {
            let distance = edit_distance(&word, candidate);
            distance > 0 && distance <= FALLBACK_MAX_DISTANCE
        })
        .take(max)
        .map(|candidate| candidate.to_string())
        .collect()
}

/// Candidate corrections drawn from a word-list dictionary.
pub(crate) fn generate(word: &str, dictionary: &WordListDictionary, max_suggestions: usize) -> Vec<String> {
    let mut suggestions = Vec::new();
    let push = |candidate: String, suggestions: &mut Vec<String>| {
        if candidate != word && !suggestions.contains(&candidate) {
            suggestions.push(candidate);
        }
    };

    // 1. Replacement table from the affix file
    for (from, to) in dictionary.replacements() {
        for (idx, _) in word.match_indices(from.as_str()) {
            let candidate = format!("{}{}{}", &word[..idx], to, &word[idx + from.len()..]);
            if dictionary.contains(&candidate) {
                push(candidate, &mut suggestions);
            }
        }
    }

    // 2. Single-edit transformations
    for candidate in generate_transformations(word) {
        if dictionary.contains(&candidate) {
            push(candidate, &mut suggestions);
        }
    }

    if suggestions.len() >= max_suggestions {
        suggestions.truncate(max_suggestions);
        return suggestions;
    }

    // 3. Prefix neighbours, nearest first
    let prefix_len = if word.chars().count() >= 4 { 2 } else { 1 };
    let prefix: String = word.chars().take(prefix_len).collect();
    let mut prefix_matches: Vec<(usize, String)> = dictionary
        .words_with_prefix(&prefix)
        .into_iter()
        .map(|candidate| (edit_distance(word, &candidate), candidate))
        .filter(|(distance, _)| *distance <= FALLBACK_MAX_DISTANCE)
        .collect();
    prefix_matches.sort_by_key(|(distance, _)| *distance);

    for (_, candidate) in prefix_matches {
        push(candidate, &mut suggestions);
        if suggestions.len() >= max_suggestions {
            break;
        }
    }

    suggestions.truncate(max_suggestions);
    suggestions
}

/// Levenshtein distance counted in characters.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    let mut previous: Vec<usize> = (0..=b_chars.len()).collect();
    let mut current = vec![0; b_chars.len() + 1];

    for (i, a_char) in a_chars.iter().enumerate() {
        current[0] = i + 1;
        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = if a_char == b_char { 0 } else { 1 };
            current[j + 1] = (previous[j + 1] + 1) // deletion
                .min(current[j] + 1) // insertion
                .min(previous[j] + cost); // substitution
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b_chars.len()]
}

/// Deletions, adjacent transpositions and common keyboard/phonetic swaps.
fn generate_transformations(word: &str) -> Vec<String> {
    let mut transformations = Vec::new();
    let chars: Vec<char> = word.chars().collect();

    for i in 0..chars.len() {
        let mut new_word = chars.clone();
        new_word.remove(i);
        transformations.push(new_word.iter().collect());
    }

    for i in 0..chars.len().saturating_sub(1) {
        let mut new_word = chars.clone();
        new_word.swap(i, i + 1);
        transformations.push(new_word.iter().collect());
    }

    let common_replacements = [
        ('a', 'e'),
        ('e', 'a'),
        ('e', 'i'),
        ('i', 'e'),
        ('i', 'o'),
        ('o', 'u'),
        ('b', 'v'),
        ('c', 'k'),
        ('f', 'v'),
        ('g', 'j'),
        ('m', 'n'),
        ('n', 'm'),
        ('s', 'z'),
        ('t', 'd'),
    ];

    for (i, &ch) in chars.iter().enumerate() {
        for &(from, to) in &common_replacements {
            if ch == from {
                let mut new_word = chars.clone();
                new_word[i] = to;
                transformations.push(new_word.iter().collect());
            }
        }
    }

    transformations
}
