//! Messages exchanged between a host and the engine actor.
//!
//! On the wire each message is a JSON object tagged by `"type"`, e.g.
//! `{"type":"CHECK_TEXT","fullText":"..."}`.

use crate::checker::custom_words::ImportReport;
use crate::checker::CacheStats;
use crate::diff::DiffRegion;
use crate::CheckResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Request {
    InitDictionary {
        affix_rules: String,
        word_list: String,
    },
    CheckText {
        full_text: String,
    },
    CheckIncremental {
        full_text: String,
        regions: Vec<DiffRegion>,
    },
    AddWord {
        word: String,
    },
    RemoveWord {
        word: String,
    },
    /// `words` is normally an array of strings; anything else is
    /// answered with an empty `WORDS_IMPORTED`.
    ImportWords {
        words: Value,
    },
    ClearWords,
    GetSuggestions {
        word: String,
    },
    GetCacheStats,
}

impl Request {
    pub fn name(&self) -> &'static str {
        match self {
            Request::InitDictionary { .. } => "INIT_DICTIONARY",
            Request::CheckText { .. } => "CHECK_TEXT",
            Request::CheckIncremental { .. } => "CHECK_INCREMENTAL",
            Request::AddWord { .. } => "ADD_WORD",
            Request::RemoveWord { .. } => "REMOVE_WORD",
            Request::ImportWords { .. } => "IMPORT_WORDS",
            Request::ClearWords => "CLEAR_WORDS",
            Request::GetSuggestions { .. } => "GET_SUGGESTIONS",
            Request::GetCacheStats => "GET_CACHE_STATS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WordAction {
    AddWord,
    RemoveWord,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Response {
    DictionaryReady {
        ready: bool,
    },
    CheckResult {
        invalid_words: Vec<CheckResult>,
        current_invalid_map: BTreeMap<String, bool>,
    },
    DictionaryUpdated {
        action: WordAction,
        word: String,
    },
    WordsImported {
        imported: usize,
        failed: Vec<String>,
    },
    SuggestionsResult {
        word: String,
        suggestions: Vec<String>,
    },
    CacheStats(CacheStats),
    Error {
        message: String,
    },
}

/// Payload of a `CHECK_RESULT` response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckOutcome {
    pub invalid_words: Vec<CheckResult>,
    pub current_invalid_map: BTreeMap<String, bool>,
}

impl From<CheckOutcome> for Response {
    fn from(outcome: CheckOutcome) -> Self {
        Response::CheckResult {
            invalid_words: outcome.invalid_words,
            current_invalid_map: outcome.current_invalid_map,
        }
    }
}

impl From<ImportReport> for Response {
    fn from(report: ImportReport) -> Self {
        Response::WordsImported {
            imported: report.imported,
            failed: report.failed,
        }
    }
}

impl Response {
    pub fn into_check_outcome(self) -> Option<CheckOutcome> {
        match self {
            Response::CheckResult {
                invalid_words,
                current_invalid_map,
            } => Some(CheckOutcome {
                invalid_words,
                current_invalid_map,
            }),
            _ => None,
        }
    }
}
