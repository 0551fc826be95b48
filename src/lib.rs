pub mod cache;
pub mod checker;
pub mod cli;
pub mod config;
pub mod diff;
pub mod dict;
pub mod engine;
pub mod error;
pub mod protocol;

pub use checker::{EngineOptions, SpellCheckEngine};
pub use config::Config;
pub use engine::EngineHandle;
pub use error::{DictionaryError, EngineError};

use serde::{Deserialize, Serialize};

/// A misspelled word and its character span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub word: String,
    pub start: usize,
    pub end: usize,
}

impl CheckResult {
    /// Shift the span right by `by` characters.
    pub fn offset(self, by: usize) -> Self {
        Self {
            start: self.start + by,
            end: self.end + by,
            ..self
        }
    }
}
