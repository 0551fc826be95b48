use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use spellflow::checker::custom_words::CustomWordSet;
use spellflow::cli::output::{self, FileReport, Misspelling, OutputFormat};
use spellflow::dict::{self, DictionarySources};
use spellflow::protocol::{Request, Response};
use spellflow::{Config, EngineHandle};
use std::fs;
use std::io;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "spellflow")]
#[command(version, about = "Incremental spell checking for editors and the command line", long_about = None)]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Generate shell completion script
    #[arg(long, value_name = "SHELL")]
    completion: Option<Shell>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check files for misspellings
    Check {
        /// Files to check
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,

        /// Output format (text, json)
        #[arg(short = 'o', long, default_value = "text")]
        format: OutputFormat,

        /// Exit with code 0 even if errors are found
        #[arg(long)]
        no_fail: bool,

        #[command(flatten)]
        engine: EngineArgs,
    },
    /// Print suggestions for words
    Suggest {
        #[arg(value_name = "WORDS", required = true)]
        words: Vec<String>,

        #[command(flatten)]
        engine: EngineArgs,
    },
    /// Run the engine over stdin/stdout, one JSON message per line
    Serve {
        #[command(flatten)]
        engine: EngineArgs,
    },
    /// Dictionary management
    Dict {
        #[command(subcommand)]
        action: DictCommands,
    },
}

#[derive(Subcommand, Debug)]
enum DictCommands {
    /// List installed dictionaries
    List,
    /// Show dictionary info
    Info {
        /// Language code
        language: String,
    },
    /// Install a dictionary from local Hunspell-style files
    Install {
        /// Language code (e.g., en_US, en_GB)
        language: String,

        /// Word list (.dic)
        #[arg(long, value_name = "FILE")]
        dic: PathBuf,

        /// Affix file (.aff)
        #[arg(long, value_name = "FILE")]
        aff: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct EngineArgs {
    /// Language/dictionary to use (e.g., en_US, en_GB)
    #[arg(short, long)]
    language: Option<String>,

    /// Personal dictionary file
    #[arg(long)]
    personal_dict: Option<PathBuf>,

    /// Word list to load instead of the installed dictionary
    #[arg(long, value_name = "FILE")]
    dic: Option<PathBuf>,

    /// Affix file to go with --dic
    #[arg(long, value_name = "FILE", requires = "dic")]
    aff: Option<PathBuf>,

    /// Accept these words for this run only
    #[arg(long)]
    add_to_dict: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    if let Some(shell) = cli.completion {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "spellflow", &mut io::stdout());
        return Ok(());
    }

    if cli.no_color {
        colored::control::set_override(false);
    }
    let colored_output = !cli.no_color;

    let Some(command) = cli.command else {
        anyhow::bail!("No command specified. Use --help for usage information.");
    };

    match command {
        Commands::Check {
            files,
            format,
            no_fail,
            engine,
        } => {
            let engine = start_engine(&engine).await?;
            let total_errors = check_files(&engine, &files, format, colored_output).await?;
            if total_errors > 0 && !no_fail {
                std::process::exit(1);
            }
        }
        Commands::Suggest { words, engine } => {
            let engine = start_engine(&engine).await?;
            for word in &words {
                let suggestions = engine.suggestions(word.as_str()).await;
                output::print_suggestions(word, &suggestions, colored_output);
            }
        }
        Commands::Serve { engine } => {
            let engine = start_engine(&engine).await?;
            serve(&engine).await?;
        }
        Commands::Dict { action } => match action {
            DictCommands::List => dict::manager::list_dictionaries()?,
            DictCommands::Info { language } => dict::manager::show_info(&language)?,
            DictCommands::Install { language, dic, aff } => {
                dict::manager::install_dictionary(&language, aff.as_deref(), &dic)?
            }
        },
    }

    Ok(())
}

/// Spawn an engine, load its dictionary and seed the custom words.
async fn start_engine(args: &EngineArgs) -> Result<EngineHandle> {
    let config = Config::load(args.language.clone(), args.personal_dict.clone())?;
    let engine = EngineHandle::spawn(config.engine_options())
        .with_suggestion_timeout(config.suggestion_timeout());

    let sources = match &args.dic {
        Some(dic) => Some(
            DictionarySources::from_paths(dic, args.aff.as_deref())
                .with_context(|| format!("Failed to read dictionary: {}", dic.display()))?,
        ),
        None => DictionarySources::installed(&config.language)?,
    };
    match sources {
        Some(sources) => engine
            .init_dictionary(sources.affix_rules, sources.word_list)
            .await
            .context("Failed to load dictionary")?,
        None => tracing::warn!(
            language = %config.language,
            "no dictionary installed, every word will be accepted"
        ),
    }

    let mut words = CustomWordSet::new();
    if let Some(path) = &config.personal_dictionary {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read personal dictionary: {}", path.display()))?;
        words.import_lines(&content);
    }
    let report = words.import(&args.add_to_dict);
    for word in &report.failed {
        tracing::warn!(word = %word, "ignoring invalid custom word");
    }

    if !words.is_empty() {
        engine
            .import_words(words.iter().map(str::to_string).collect())
            .await?;
    }

    Ok(engine)
}

async fn check_files(
    engine: &EngineHandle,
    files: &[PathBuf],
    format: OutputFormat,
    colored_output: bool,
) -> Result<usize> {
    let mut reports = Vec::new();

    for file_path in files {
        if !file_path.exists() {
            eprintln!("Error: File not found: {}", file_path.display());
            continue;
        }

        let text = fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read file: {}", file_path.display()))?;
        let outcome = engine.check_text(text.as_str()).await?;

        let mut errors = Vec::with_capacity(outcome.invalid_words.len());
        for result in &outcome.invalid_words {
            let suggestions = engine.suggestions(result.word.as_str()).await;
            errors.push(Misspelling::locate(&text, result, suggestions));
        }

        let report = FileReport {
            file: file_path.clone(),
            errors,
        };
        if format == OutputFormat::Text {
            output::print_file_errors(&report, colored_output);
        }
        reports.push(report);
    }

    let total_errors = reports.iter().map(|r| r.errors.len()).sum();
    match format {
        OutputFormat::Text => output::print_check_summary(total_errors, files, colored_output),
        OutputFormat::Json => output::print_json_report(&reports)?,
    }

    Ok(total_errors)
}

/// Forward JSON-lines requests from stdin to the engine until stdin closes.
async fn serve(engine: &EngineHandle) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let responses = match serde_json::from_str::<Request>(&line) {
            Ok(request) => engine.request(request).await?,
            Err(e) => {
                tracing::debug!(error = %e, "rejecting malformed request");
                vec![Response::Error {
                    message: format!("Invalid request: {}", e),
                }]
            }
        };

        for response in responses {
            let mut json = serde_json::to_string(&response)?;
            json.push('\n');
            stdout.write_all(json.as_bytes()).await?;
        }
        stdout.flush().await?;
    }

    Ok(())
}
