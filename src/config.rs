use crate::checker::{
    EngineOptions, DEFAULT_REGION_CACHE_CAPACITY, DEFAULT_WORD_CACHE_CAPACITY,
};
use crate::checker::suggestions::DEFAULT_MAX_SUGGESTIONS;
use crate::diff::DEFAULT_CONTEXT_WORDS;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_LANGUAGE: &str = "en_US";
const LOCAL_CONFIG_FILE: &str = ".spellflow.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default)]
    pub personal_dictionary: Option<PathBuf>,

    #[serde(default = "default_word_cache_capacity")]
    pub word_cache_capacity: usize,

    #[serde(default = "default_region_cache_capacity")]
    pub region_cache_capacity: usize,

    #[serde(default = "default_context_words")]
    pub context_words: usize,

    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,

    #[serde(default = "default_yield_interval_ms")]
    pub yield_interval_ms: u64,

    #[serde(default = "default_suggestion_timeout_ms")]
    pub suggestion_timeout_ms: u64,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn default_word_cache_capacity() -> usize {
    DEFAULT_WORD_CACHE_CAPACITY
}

fn default_region_cache_capacity() -> usize {
    DEFAULT_REGION_CACHE_CAPACITY
}

fn default_context_words() -> usize {
    DEFAULT_CONTEXT_WORDS
}

fn default_max_suggestions() -> usize {
    DEFAULT_MAX_SUGGESTIONS
}

fn default_yield_interval_ms() -> u64 {
    16
}

fn default_suggestion_timeout_ms() -> u64 {
    1000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: default_language(),
            personal_dictionary: None,
            word_cache_capacity: default_word_cache_capacity(),
            region_cache_capacity: default_region_cache_capacity(),
            context_words: default_context_words(),
            max_suggestions: default_max_suggestions(),
            yield_interval_ms: default_yield_interval_ms(),
            suggestion_timeout_ms: default_suggestion_timeout_ms(),
        }
    }
}

impl Config {
    /// Load configuration with priority: CLI args > local config > global config > defaults
    pub fn load(language: Option<String>, personal_dict: Option<PathBuf>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global_config = Self::from_file(&global_path)?;
                config = config.merge(global_config);
            }
        }

        let local_path = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_path.exists() {
            let local_config = Self::from_file(&local_path)?;
            config = config.merge(local_config);
        }

        if let Some(language) = language {
            config.language = language;
        }
        if let Some(dict) = personal_dict {
            config.personal_dictionary = Some(dict);
        }

        if config.personal_dictionary.is_none() {
            config.personal_dictionary = Self::default_personal_dict_path();
        }

        if let Some(path) = &config.personal_dictionary {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .context("Failed to create personal dictionary directory")?;
            }
            if !path.exists() {
                fs::write(path, "").context("Failed to create personal dictionary file")?;
            }
        }

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn merge(mut self, other: Self) -> Self {
        // Values in `other` win when they differ from the defaults
        if other.language != DEFAULT_LANGUAGE {
            self.language = other.language;
        }
        if other.personal_dictionary.is_some() {
            self.personal_dictionary = other.personal_dictionary;
        }
        if other.word_cache_capacity != default_word_cache_capacity() {
            self.word_cache_capacity = other.word_cache_capacity;
        }
        if other.region_cache_capacity != default_region_cache_capacity() {
            self.region_cache_capacity = other.region_cache_capacity;
        }
        if other.context_words != default_context_words() {
            self.context_words = other.context_words;
        }
        if other.max_suggestions != default_max_suggestions() {
            self.max_suggestions = other.max_suggestions;
        }
        if other.yield_interval_ms != default_yield_interval_ms() {
            self.yield_interval_ms = other.yield_interval_ms;
        }
        if other.suggestion_timeout_ms != default_suggestion_timeout_ms() {
            self.suggestion_timeout_ms = other.suggestion_timeout_ms;
        }
        self
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            word_cache_capacity: self.word_cache_capacity,
            region_cache_capacity: self.region_cache_capacity,
            context_words: self.context_words,
            max_suggestions: self.max_suggestions,
            yield_interval: Duration::from_millis(self.yield_interval_ms),
        }
    }

    pub fn suggestion_timeout(&self) -> Duration {
        Duration::from_millis(self.suggestion_timeout_ms)
    }

    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "spellflow").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    pub fn default_personal_dict_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "spellflow").map(|dirs| dirs.config_dir().join("personal.txt"))
    }

    pub fn data_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "spellflow").map(|dirs| dirs.data_dir().to_path_buf())
    }
}
