// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use transcache::app_config::{Config, LogLevel};
use transcache::backup;
use transcache::{
    SortOrder, StoreManager, Translation, TranslationEntry, TranslationHistory,
};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for SortOrder to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliSortOrder {
    Asc,
    Desc,
}

impl From<CliSortOrder> for SortOrder {
    fn from(order: CliSortOrder) -> Self {
        match order {
            CliSortOrder::Asc => SortOrder::Asc,
            CliSortOrder::Desc => SortOrder::Desc,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List cached translations, newest first by default
    List {
        /// Number of entries to skip
        #[arg(long)]
        from: Option<usize>,

        /// Maximum number of entries to show (defaults to the configured page size)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Show every entry
        #[arg(long, conflicts_with = "limit")]
        all: bool,

        /// Key order
        #[arg(short, long, value_enum, default_value = "desc")]
        order: CliSortOrder,
    },

    /// Show one cached translation by key
    Get {
        /// Entry key
        key: i64,
    },

    /// Find the first translation matching the given fields
    Find {
        /// Original text (required, uses the index)
        #[arg(short, long)]
        text: String,

        /// Source language code
        #[arg(short, long)]
        source_language: Option<String>,

        /// Target language code
        #[arg(short = 'T', long)]
        target_language: Option<String>,

        /// Translator that produced the entry
        #[arg(long)]
        translator: Option<String>,
    },

    /// Add a translation
    Add {
        /// Original text
        #[arg(short, long)]
        text: String,

        /// Translated text
        #[arg(short = 'r', long)]
        translation: String,

        /// Source language code
        #[arg(short, long)]
        source_language: String,

        /// Target language code
        #[arg(short = 'T', long)]
        target_language: String,

        /// Translator that produced the entry
        #[arg(long)]
        translator: Option<String>,
    },

    /// Delete one translation by key
    Delete {
        /// Entry key
        key: i64,
    },

    /// Delete every translation partially matching a JSON criteria object,
    /// e.g. '{"originalText": "hello", "sourceLanguage": "en"}'
    Purge {
        /// Translation-shaped JSON criteria; must contain originalText
        criteria: String,
    },

    /// Remove every cached translation
    Flush {
        /// Confirm the irreversible removal
        #[arg(long)]
        yes: bool,
    },

    /// Show store statistics
    Stats,

    /// Reclaim unused space in the store file
    Vacuum,

    /// Export all translations to a JSON file
    Export {
        /// Output file
        output: PathBuf,
    },

    /// Import translations from a JSON file
    Import {
        /// Input file
        input: PathBuf,
    },

    /// Generate shell completions for transcache
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// transcache - local translation cache store
///
/// Inspect and maintain the persistent store of previously computed translations.
#[derive(Parser, Debug)]
#[command(name = "transcache")]
#[command(version)]
#[command(about = "Inspect and maintain the local translation cache")]
#[command(long_about = "transcache manages the persistent store of previously computed translations.

EXAMPLES:
    transcache list                                  # Newest translations first
    transcache list --from 20 --limit 20 -o asc      # Second page, oldest first
    transcache find -t hello -s en -T fr             # First matching translation
    transcache purge '{\"originalText\": \"hello\"}'   # Delete all matches
    transcache export backup.json                    # Save everything to JSON
    transcache completions bash > transcache.bash    # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: PathBuf,

    /// Store file path (overrides the configuration)
    #[arg(short, long, env = "TRANSCACHE_DB", global = true)]
    database: Option<PathBuf>,

    /// Set logging level
    #[arg(short = 'L', long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
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

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
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
            let color = Self::color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:<5} {}\x1B[0m",
                color,
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Start permissive; the effective level is applied once config is loaded
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "transcache", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(&cli)?;
    log::set_max_level(config.log_level.to_level_filter());

    let manager = StoreManager::from_config(&config.store)?;
    run_command(cli.command, &manager, &config).await
}

/// Load the config file, apply CLI overrides and validate the result
fn load_config(cli: &CommandLineOptions) -> Result<Config> {
    let (mut config, created) = Config::load_or_create(&cli.config_path)?;
    if created {
        warn!(
            "Config file not found at '{}', created default config.",
            cli.config_path.display()
        );
    }

    if let Some(database) = &cli.database {
        config.store.database_path = Some(database.clone());
    }

    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone().into();
    }

    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

async fn run_command(command: Commands, manager: &StoreManager, config: &Config) -> Result<()> {
    match command {
        Commands::List {
            from,
            limit,
            all,
            order,
        } => {
            let limit = if all {
                None
            } else {
                Some(limit.unwrap_or(config.store.default_page_size))
            };
            let records = manager.get_entries(from, limit, order.into()).await?;
            print_json(&records)?;
        }
        Commands::Get { key } => match manager.get_entry(key).await? {
            Some(entry) => print_json(&entry)?,
            None => info!("No translation with key {}", key),
        },
        Commands::Find {
            text,
            source_language,
            target_language,
            translator,
        } => {
            let criteria = build_find_criteria(text, source_language, target_language, translator);
            match manager.find_entry(&criteria).await? {
                Some(record) => print_json(&record)?,
                None => info!("No matching translation"),
            }
        }
        Commands::Add {
            text,
            translation,
            source_language,
            target_language,
            translator,
        } => {
            let entry = TranslationEntry::new(
                Translation::new(text, translation, source_language, target_language),
                translator,
            );
            let key = manager.add_entry(&entry).await?;
            println!("{}", key);
        }
        Commands::Delete { key } => {
            manager.delete_entry(key).await?;
            info!("Deleted translation {}", key);
        }
        Commands::Purge { criteria } => {
            let criteria: Value =
                serde_json::from_str(&criteria).context("Criteria must be a JSON object")?;
            let deleted = manager.delete_entries(&criteria).await?;
            info!("Deleted {} matching translation(s)", deleted);
        }
        Commands::Flush { yes } => {
            if !yes {
                return Err(anyhow!("Refusing to flush without --yes"));
            }
            let deleted = manager.flush().await?;
            info!("Flushed {} translation(s)", deleted);
        }
        Commands::Stats => {
            let stats = manager.get_store().await?.stats().await?;
            println!("{}", stats);
        }
        Commands::Vacuum => {
            manager.get_store().await?.vacuum().await?;
            info!("Store vacuumed");
        }
        Commands::Export { output } => {
            let file = File::create(&output)
                .with_context(|| format!("Failed to create export file: {}", output.display()))?;
            let store = manager.get_store().await?;
            let count = backup::export_to_writer(store, BufWriter::new(file)).await?;
            info!("Exported {} translation(s) to {}", count, output.display());
        }
        Commands::Import { input } => {
            let file = File::open(&input)
                .with_context(|| format!("Failed to open import file: {}", input.display()))?;
            let store = manager.get_store().await?;
            let keys = backup::import_from_reader(store, BufReader::new(file)).await?;
            info!("Imported {} translation(s) from {}", keys.len(), input.display());
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}

/// Criteria object for `find`, naming only the fields that were given
fn build_find_criteria(
    text: String,
    source_language: Option<String>,
    target_language: Option<String>,
    translator: Option<String>,
) -> Value {
    let mut translation = serde_json::Map::new();
    translation.insert("originalText".to_string(), Value::String(text));
    if let Some(source_language) = source_language {
        translation.insert("sourceLanguage".to_string(), Value::String(source_language));
    }
    if let Some(target_language) = target_language {
        translation.insert("targetLanguage".to_string(), Value::String(target_language));
    }

    let mut criteria = serde_json::Map::new();
    criteria.insert("translation".to_string(), Value::Object(translation));
    if let Some(translator) = translator {
        criteria.insert("translator".to_string(), Value::String(translator));
    }
    Value::Object(criteria)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}
