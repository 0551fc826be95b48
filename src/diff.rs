//! Changed-span detection between two revisions of a text.
//!
//! Only a single contiguous hunk is found: common prefix and suffix are
//! trimmed and whatever lies between is the edit. Two disjoint edits in one
//! call therefore come back as one region spanning both, so callers should
//! diff consecutive small revisions rather than distant ones.

use crate::checker::tokenizer::{char_len, char_slice, tokenize};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONTEXT_WORDS: usize = 2;

/// A character range of the new text that needs re-checking.
/// `text` is always the new text's substring over `start..end`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffRegion {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl DiffRegion {
    /// Region covering the whole of `text`.
    pub fn whole(text: &str) -> Self {
        Self {
            start: 0,
            end: char_len(text),
            text: text.to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Regions of `new_text` to re-check after it replaced `old_text`, widened by
/// `context_words` whole words on each side.
///
/// Identical texts yield no regions. An empty side yields the whole new text.
pub fn calculate_regions(old_text: &str, new_text: &str, context_words: usize) -> Vec<DiffRegion> {
    if old_text == new_text {
        return Vec::new();
    }
    if old_text.is_empty() || new_text.is_empty() {
        return vec![DiffRegion::whole(new_text)];
    }

    let old: Vec<char> = old_text.chars().collect();
    let new: Vec<char> = new_text.chars().collect();

    let prefix = old.iter().zip(&new).take_while(|(a, b)| a == b).count();
    let max_suffix = old.len().min(new.len()) - prefix;
    let suffix = old
        .iter()
        .rev()
        .zip(new.iter().rev())
        .take(max_suffix)
        .take_while(|(a, b)| a == b)
        .count();

    let (start, end) = expand_to_words(new_text, prefix, new.len() - suffix, context_words);

    merge_regions(
        vec![DiffRegion {
            start,
            end,
            text: String::new(),
        }],
        new_text,
    )
}

/// Widen `start..end` to cover every word touching it plus `context_words`
/// more on each side, clipped to the document.
fn expand_to_words(text: &str, start: usize, end: usize, context_words: usize) -> (usize, usize) {
    let words = tokenize(text);

    let first_touching = words
        .iter()
        .position(|w| w.end >= start)
        .unwrap_or(words.len());
    let first_after = words
        .iter()
        .position(|w| w.start >= end)
        .unwrap_or(words.len());

    let lo = first_touching.saturating_sub(context_words);
    let hi = (first_after + context_words).min(words.len());

    let region_start = words.get(lo).map_or(start, |w| w.start.min(start));
    let region_end = match hi.checked_sub(1).and_then(|i| words.get(i)) {
        Some(w) => w.end.max(end),
        None => end,
    };

    (region_start, region_end)
}

/// Sort regions, fold overlapping or adjacent ones together, and re-slice
/// each merged span from `text`. Inverted or out-of-bounds regions are
/// dropped.
pub fn merge_regions(mut regions: Vec<DiffRegion>, text: &str) -> Vec<DiffRegion> {
    let len = char_len(text);
    regions.retain(|r| {
        let ok = r.start <= r.end && r.end <= len;
        if !ok {
            tracing::debug!(start = r.start, end = r.end, len, "dropping malformed region");
        }
        ok
    });
    regions.sort_by_key(|r| r.start);

    let mut spans: Vec<(usize, usize)> = Vec::with_capacity(regions.len());
    for region in &regions {
        match spans.last_mut() {
            Some(last) if region.start <= last.1 => last.1 = last.1.max(region.end),
            _ => spans.push((region.start, region.end)),
        }
    }

    spans
        .into_iter()
        .filter_map(|(start, end)| {
            char_slice(text, start, end).map(|slice| DiffRegion {
                start,
                end,
                text: slice.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(start: usize, end: usize) -> DiffRegion {
        DiffRegion {
            start,
            end,
            text: String::new(),
        }
    }

    #[test]
    fn test_identical_texts_have_no_regions() {
        assert!(calculate_regions("same text", "same text", 2).is_empty());
        assert!(calculate_regions("", "", 2).is_empty());
    }

    #[test]
    fn test_empty_side_is_full_check() {
        assert_eq!(calculate_regions("", "hello world", 2), vec![DiffRegion::whole("hello world")]);
        assert_eq!(calculate_regions("hello", "", 2), vec![DiffRegion::whole("")]);
    }

    #[test]
    fn test_edit_expands_to_whole_word() {
        let regions = calculate_regions("helo wrold", "hello wrold", 0);
        assert_eq!(
            regions,
            vec![DiffRegion {
                start: 0,
                end: 5,
                text: "hello".to_string()
            }]
        );
    }

    #[test]
    fn test_context_words_on_both_sides() {
        let old = "one two three four five six seven";
        let new = "one two three fxur five six seven";

        let regions = calculate_regions(old, new, 1);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].text, "three fxur five");
        assert_eq!(char_slice(new, regions[0].start, regions[0].end), Some("three fxur five"));

        let regions = calculate_regions(old, new, 2);
        assert_eq!(regions[0].text, "two three fxur five six");
    }

    #[test]
    fn test_context_is_clipped_to_document() {
        let regions = calculate_regions("alpha beta", "alpha betta", 5);
        assert_eq!(regions[0].text, "alpha betta");
    }

    #[test]
    fn test_single_char_append_produces_region() {
        let regions = calculate_regions("hello", "hello!", 2);
        assert_eq!(regions.len(), 1);
        assert_eq!((regions[0].start, regions[0].end), (0, 6));

        let regions = calculate_regions("hello world", "hello worlds", 0);
        assert_eq!(regions[0].text, "worlds");
    }

    #[test]
    fn test_deletion_region() {
        let regions = calculate_regions("hello world again", "hello wrld again", 0);
        assert_eq!(regions[0].text, "wrld");
    }

    #[test]
    fn test_repeated_characters_do_not_overlap_prefix_and_suffix() {
        let regions = calculate_regions("aaaa", "aaaaa", 0);
        assert_eq!(regions, vec![DiffRegion::whole("aaaaa")]);
    }

    #[test]
    fn test_disjoint_edits_collapse_to_one_span() {
        let old = "first word middle text last word";
        let new = "frst word middle text lost word";

        let regions = calculate_regions(old, new, 0);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].text, "frst word middle text lost");
    }

    #[test]
    fn test_offsets_are_characters() {
        let regions = calculate_regions("café olé wrold", "café olé world", 0);
        assert_eq!((regions[0].start, regions[0].end), (9, 14));
        assert_eq!(regions[0].text, "world");
    }

    #[test]
    fn test_merge_uses_document_substring() {
        let doc = "abcdefghijklmnop";
        let merged = merge_regions(vec![region(4, 10), region(0, 5)], doc);

        assert_eq!(
            merged,
            vec![DiffRegion {
                start: 0,
                end: 10,
                text: "abcdefghij".to_string()
            }]
        );
    }

    #[test]
    fn test_merge_adjacent_and_disjoint() {
        let doc = "0123456789abcdef";
        let merged = merge_regions(vec![region(0, 3), region(3, 6), region(10, 12)], doc);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].text, "012345");
        assert_eq!(merged[1].text, "ab");
    }

    #[test]
    fn test_merge_drops_malformed() {
        let doc = "short";
        let merged = merge_regions(vec![region(3, 1), region(2, 40), region(0, 2)], doc);
        assert_eq!(merged, vec![DiffRegion {
            start: 0,
            end: 2,
            text: "sh".to_string()
        }]);
    }
}
