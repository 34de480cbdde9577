// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use indicatif::{ProgressBar, ProgressStyle};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use russian_anki::app_config::{self, Config};
use russian_anki::database::{DatabaseConnection, VocabularyStore};
use russian_anki::translation::{BatchReport, BatchTranslator, Translator};
use russian_anki::{TranslationResult, extract_words};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate the new Russian words found in text files
    Translate {
        /// Text files to scan for Russian words
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,

        /// Where to write the translations as JSON
        #[arg(short, long, default_value = "translations.json")]
        output: PathBuf,

        /// Translate words even if they are already in the vocabulary
        #[arg(long)]
        include_known: bool,
    },

    /// Translate words given on the command line and print them as JSON
    Word {
        /// Russian words to translate
        #[arg(value_name = "WORDS", required = true)]
        words: Vec<String>,
    },

    /// Generate shell completions for russian-anki
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// russian-anki - Russian vocabulary translation for flashcards
///
/// Extracts Russian words from text, skips the ones you already know and
/// translates the rest with an LLM provider.
#[derive(Parser, Debug)]
#[command(name = "russian-anki")]
#[command(version)]
#[command(about = "Translate Russian vocabulary into structured flashcard entries")]
#[command(long_about = "russian-anki extracts Russian words from text files and translates them using LLM providers.

EXAMPLES:
    russian-anki translate chapter1.txt                # Translate new words, write translations.json
    russian-anki translate -o out.json a.txt b.txt     # Several files, custom output
    russian-anki -w 10 --no-cache translate a.txt      # More workers, bypass the cache
    russian-anki word книга собака                     # Print translations to stdout
    russian-anki completions bash > russian-anki.bash  # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically. The OpenRouter API key is read from the config
    or from the OPENROUTER_API_KEY environment variable.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long = "config", default_value = "conf.json", global = true)]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,

    /// Model name to use for translation
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Number of words translated concurrently
    #[arg(short, long, global = true)]
    workers: Option<usize>,

    /// Do not read or write the translation cache
    #[arg(long, global = true)]
    no_cache: bool,

    /// Vocabulary database path
    #[arg(long, env = "RUSSIAN_ANKI_VOCAB_DB", global = true)]
    vocab_db: Option<PathBuf>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and label for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, label) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", color, now, label, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Trace is the ceiling; the effective level is lowered once the config is known
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "russian-anki", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(&cli)?;

    match &cli.command {
        Commands::Translate {
            files,
            output,
            include_known,
        } => run_translate(&cli, &config, files, output, *include_known).await,
        Commands::Word { words } => run_word(&config, words).await,
        Commands::Completions { .. } => Ok(()),
    }
}

/// Load the configuration, apply command line overrides and validate it
fn load_config(cli: &CommandLineOptions) -> Result<Config> {
    if let Some(level) = cli.log_level {
        log::set_max_level(app_config::LogLevel::from(level).to_level_filter());
    }

    let mut config = Config::load_or_create(&cli.config_path)?;

    if let Some(model) = &cli.model {
        config.translation.override_model(model);
    }
    if let Some(workers) = cli.workers {
        config.batch.max_workers = workers;
    }
    if cli.no_cache {
        config.cache.enabled = false;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level.into();
    } else {
        log::set_max_level(config.log_level.to_level_filter());
    }

    config
        .validate()
        .context("Configuration validation failed")?;

    Ok(config)
}

/// Build a progress bar for `total` words
fn word_progress_bar(total: usize) -> ProgressBar {
    let progress_bar = ProgressBar::new(total as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} words ({percent}%) {eta}")
        .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%)"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress_bar.set_style(style.progress_chars("#>-"));
    progress_bar
}

async fn run_translate(
    cli: &CommandLineOptions,
    config: &Config,
    files: &[PathBuf],
    output: &Path,
    include_known: bool,
) -> Result<()> {
    let mut candidates = BTreeSet::new();
    for file in files {
        let text = tokio::fs::read_to_string(file)
            .await
            .with_context(|| format!("Failed to read input file: {}", file.display()))?;
        let words = extract_words(&text);
        info!("Found {} Russian words in {}", words.len(), file.display());
        candidates.extend(words);
    }

    let vocab_path = match &cli.vocab_db {
        Some(path) => path.clone(),
        None => DatabaseConnection::default_vocabulary_path()?,
    };
    let vocabulary = VocabularyStore::new(DatabaseConnection::new(&vocab_path)?);

    let words = if include_known {
        candidates.into_iter().collect::<Vec<_>>()
    } else {
        vocabulary.filter_unknown(candidates).await?
    };

    if words.is_empty() {
        warn!("No new words to translate");
        write_results(output, &[])?;
        return Ok(());
    }

    let translator = Translator::from_config(config)?;
    let batch = BatchTranslator::new(translator.clone(), config.batch.max_workers);

    let progress_bar = word_progress_bar(words.len());
    let bar = progress_bar.clone();
    let report: BatchReport = batch
        .translate_all(&words, move |done, _total| bar.set_position(done as u64))
        .await;
    progress_bar.finish_and_clear();

    for skipped in &report.skipped {
        warn!("Skipped '{}': {}", skipped.word, skipped.reason);
    }

    vocabulary.add_entries(&report.results).await?;
    write_results(output, &report.results)?;

    let stats = translator.cache().stats();
    info!(
        "Translated {} of {} words ({} skipped), cache hit rate {:.0}%",
        report.results.len(),
        report.attempted(),
        report.skipped.len(),
        stats.hit_rate() * 100.0
    );
    info!("Success: {}", output.display());

    Ok(())
}

async fn run_word(config: &Config, words: &[String]) -> Result<()> {
    let translator = Translator::from_config(config)?;
    let results = translator
        .batch_translate(words, config.batch.max_workers)
        .await;

    if results.is_empty() {
        return Err(anyhow!("No translations produced for: {}", words.join(", ")));
    }

    let json = serde_json::to_string_pretty(&results)
        .context("Failed to serialize translations to JSON")?;
    println!("{}", json);
    Ok(())
}

/// Write results as pretty-printed JSON
fn write_results(output: &Path, results: &[TranslationResult]) -> Result<()> {
    let json = serde_json::to_string_pretty(results)
        .context("Failed to serialize translations to JSON")?;
    std::fs::write(output, json)
        .with_context(|| format!("Failed to write translations to: {}", output.display()))?;
    Ok(())
}
