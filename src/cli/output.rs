use crate::CheckResult;
use colored::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// A misspelling positioned for display. Lines and columns are 1-based and
/// counted in characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Misspelling {
    pub line: usize,
    pub column: usize,
    pub word: String,
    pub suggestions: Vec<String>,
    pub context: String,
}

impl Misspelling {
    pub fn locate(text: &str, result: &CheckResult, suggestions: Vec<String>) -> Self {
        let (line, column) = line_column(text, result.start);
        let context = text
            .lines()
            .nth(line - 1)
            .unwrap_or_default()
            .trim()
            .to_string();

        Self {
            line,
            column,
            word: result.word.clone(),
            suggestions,
            context,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub file: PathBuf,
    pub errors: Vec<Misspelling>,
}

#[derive(Debug, Serialize)]
struct JsonOutput<'a> {
    files_checked: usize,
    total_errors: usize,
    files: &'a [FileReport],
}

/// Convert a character offset into a 1-based line and column.
pub fn line_column(text: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;
    for c in text.chars().take(offset) {
        if c == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}

pub fn print_file_errors(report: &FileReport, colored_output: bool) {
    if report.errors.is_empty() {
        return;
    }

    let file_name = report.file.display().to_string();

    if colored_output {
        println!("\n{}", file_name.bold().underline());
    } else {
        println!("\n{}", file_name);
    }

    for error in &report.errors {
        let line_info = format!("{}:{}", error.line, error.column);

        if colored_output {
            println!(
                "  {} {} {}",
                line_info.blue().bold(),
                error.word.red().bold(),
                format_context(&error.context, &error.word, colored_output)
            );
        } else {
            println!("  {} {} {}", line_info, error.word, &error.context);
        }

        if !error.suggestions.is_empty() {
            println!("    → {}", format_suggestions(&error.suggestions, colored_output));
        }
    }
}

pub fn print_json_report(reports: &[FileReport]) -> serde_json::Result<()> {
    let output = JsonOutput {
        files_checked: reports.len(),
        total_errors: reports.iter().map(|r| r.errors.len()).sum(),
        files: reports,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub fn print_suggestions(word: &str, suggestions: &[String], colored_output: bool) {
    if suggestions.is_empty() {
        if colored_output {
            println!("{} {}", word.yellow().bold(), "(no suggestions)".dimmed());
        } else {
            println!("{} (no suggestions)", word);
        }
        return;
    }

    let word = if colored_output {
        word.yellow().bold().to_string()
    } else {
        word.to_string()
    };
    println!("{} → {}", word, format_suggestions(suggestions, colored_output));
}

fn format_suggestions(suggestions: &[String], colored_output: bool) -> String {
    if colored_output {
        suggestions
            .iter()
            .map(|s| s.green().to_string())
            .collect::<Vec<_>>()
            .join(&", ".dimmed().to_string())
    } else {
        suggestions.join(", ")
    }
}

fn format_context(context: &str, word: &str, colored: bool) -> String {
    if colored {
        context.replace(word, &word.red().bold().to_string())
    } else {
        context.to_string()
    }
}

pub fn print_check_summary(total_errors: usize, files: &[impl AsRef<Path>], colored: bool) {
    println!();
    let file_word = if files.len() == 1 { "file" } else { "files" };
    if total_errors == 0 {
        if colored {
            println!("{}", "✓ No spelling errors found!".green().bold());
        } else {
            println!("✓ No spelling errors found!");
        }
    } else {
        let error_word = if total_errors == 1 { "error" } else { "errors" };
        if colored {
            println!(
                "{} {} {} found in {} {}",
                "✗".red().bold(),
                total_errors.to_string().red().bold(),
                error_word,
                files.len(),
                file_word
            );
        } else {
            println!(
                "✗ {} {} found in {} {}",
                total_errors,
                error_word,
                files.len(),
                file_word
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::Text.to_string(), "text");
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_line_column_counts_characters() {
        let text = "first line\nsécond wrold";
        assert_eq!(line_column(text, 0), (1, 1));
        assert_eq!(line_column(text, 11), (2, 1));
        // "sécond " is seven characters but eight bytes.
        assert_eq!(line_column(text, 18), (2, 8));
    }

    #[test]
    fn test_locate_takes_trimmed_line_as_context() {
        let text = "ok\n   helo there\n";
        let result = CheckResult {
            word: "helo".to_string(),
            start: 6,
            end: 10,
        };
        let misspelling = Misspelling::locate(text, &result, vec!["hello".to_string()]);

        assert_eq!(misspelling.line, 2);
        assert_eq!(misspelling.column, 4);
        assert_eq!(misspelling.context, "helo there");
        assert_eq!(misspelling.suggestions, vec!["hello"]);
    }

    #[test]
    fn test_uncolored_suggestions() {
        let suggestions = vec!["hello".to_string(), "help".to_string()];
        assert_eq!(format_suggestions(&suggestions, false), "hello, help");
    }
}
