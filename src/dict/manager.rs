use crate::checker::dictionary::WordListDictionary;
use crate::error::DictionaryError;
use anyhow::{Context, Result};
use colored::*;
use std::fs;
use std::path::{Path, PathBuf};

const AFFIX_EXT: &str = "aff";
const WORD_LIST_EXT: &str = "dic";

/// Raw dictionary data as handed to the engine with `INIT_DICTIONARY`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DictionarySources {
    pub affix_rules: String,
    pub word_list: String,
}

impl DictionarySources {
    /// Read a word list and, if given, its affix file.
    pub fn from_paths(word_list: &Path, affix: Option<&Path>) -> Result<Self, DictionaryError> {
        let word_list = fs::read_to_string(word_list)?;
        let affix_rules = match affix {
            Some(path) => fs::read_to_string(path)?,
            None => String::new(),
        };
        Ok(Self {
            affix_rules,
            word_list,
        })
    }

    /// Sources for an installed language, if present.
    pub fn installed(language: &str) -> Result<Option<Self>> {
        let data_dir = data_dir()?;
        Self::installed_in(&data_dir, language)
    }

    fn installed_in(data_dir: &Path, language: &str) -> Result<Option<Self>> {
        let (aff, dic) = paths_for(data_dir, language);
        if !dic.exists() {
            return Ok(None);
        }
        let affix = aff.exists().then_some(aff.as_path());
        Self::from_paths(&dic, affix)
            .map(Some)
            .with_context(|| format!("Failed to read dictionary: {}", dic.display()))
    }
}

fn data_dir() -> Result<PathBuf> {
    crate::config::Config::data_dir().context("Failed to get data directory")
}

fn paths_for(data_dir: &Path, language: &str) -> (PathBuf, PathBuf) {
    (
        data_dir.join(format!("{}.{}", language, AFFIX_EXT)),
        data_dir.join(format!("{}.{}", language, WORD_LIST_EXT)),
    )
}

fn installed_languages(data_dir: &Path) -> Result<Vec<String>> {
    if !data_dir.exists() {
        return Ok(Vec::new());
    }

    let mut languages = Vec::new();
    for entry in fs::read_dir(data_dir)? {
        let path = entry?.path();
        if path.extension().and_then(|s| s.to_str()) == Some(WORD_LIST_EXT) {
            if let Some(language) = path.file_stem().and_then(|s| s.to_str()) {
                languages.push(language.to_string());
            }
        }
    }
    languages.sort();
    Ok(languages)
}

fn install_into(data_dir: &Path, language: &str, affix: Option<&Path>, word_list: &Path) -> Result<PathBuf> {
    // Refuse sources the engine could not load.
    let sources = DictionarySources::from_paths(word_list, affix)
        .with_context(|| format!("Failed to read dictionary: {}", word_list.display()))?;
    let dictionary = WordListDictionary::from_sources(&sources.affix_rules, &sources.word_list)
        .with_context(|| format!("Invalid word list: {}", word_list.display()))?;
    if dictionary.is_empty() {
        anyhow::bail!("Word list has no entries: {}", word_list.display());
    }

    fs::create_dir_all(data_dir).context("Failed to create data directory")?;
    let (aff_path, dic_path) = paths_for(data_dir, language);
    fs::write(&dic_path, &sources.word_list)
        .with_context(|| format!("Failed to write {}", dic_path.display()))?;
    if affix.is_some() {
        fs::write(&aff_path, &sources.affix_rules)
            .with_context(|| format!("Failed to write {}", aff_path.display()))?;
    }
    Ok(dic_path)
}

pub fn list_dictionaries() -> Result<()> {
    let data_dir = data_dir()?;
    let languages = installed_languages(&data_dir)?;

    if languages.is_empty() {
        println!("{}", "No dictionaries installed.".yellow());
        println!(
            "Run {} to install one.",
            "spellflow dict install en_US --dic en_US.dic --aff en_US.aff".cyan()
        );
        return Ok(());
    }

    println!("{}", "Installed dictionaries:".bold());
    println!();

    for language in &languages {
        let (aff, dic) = paths_for(&data_dir, language);
        let size_kb = fs::metadata(&dic)?.len() / 1024;
        let affix_note = if aff.exists() { "" } else { " no affix file" };
        println!(
            "  {} {} ({}{})",
            "✓".green(),
            language.cyan().bold(),
            format!("{}KB", size_kb).dimmed(),
            affix_note.dimmed()
        );
    }

    println!();
    println!(
        "Data directory: {}",
        data_dir.display().to_string().dimmed()
    );

    Ok(())
}

pub fn install_dictionary(language: &str, affix: Option<&Path>, word_list: &Path) -> Result<()> {
    let data_dir = data_dir()?;
    let dic_path = install_into(&data_dir, language, affix, word_list)?;

    println!(
        "{} Dictionary installed: {}",
        "✓".green().bold(),
        dic_path.display().to_string().cyan()
    );
    Ok(())
}

pub fn show_info(language: &str) -> Result<()> {
    let data_dir = data_dir()?;

    let Some(sources) = DictionarySources::installed_in(&data_dir, language)? else {
        println!(
            "{} Dictionary for {} not found.",
            "✗".red().bold(),
            language.yellow()
        );
        println!(
            "Run {} to install it.",
            format!("spellflow dict install {} --dic <FILE>", language).cyan()
        );
        return Ok(());
    };

    let (aff, dic) = paths_for(&data_dir, language);
    println!("{}", format!("Dictionary: {}", language).bold());
    println!("  Word list: {}", dic.display());
    if aff.exists() {
        println!("  Affix file: {}", aff.display());
    }

    match WordListDictionary::from_sources(&sources.affix_rules, &sources.word_list) {
        Ok(dict) => {
            println!("  Words: {}", dict.len().to_string().yellow());
            println!("  Replacement rules: {}", dict.replacements().len());
        }
        Err(e) => {
            println!("  {}: {}", "Error loading dictionary".red(), e);
        }
    }

    Ok(())
}
