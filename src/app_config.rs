use anyhow::{anyhow, Context, Result};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Translation store settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation store configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StoreConfig {
    /// Location of the store file; the user data directory when unset
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// How long to wait on a file locked by another process, in milliseconds
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Whether to switch the store file to write-ahead logging
    #[serde(default = "default_true")]
    pub enable_wal: bool,

    /// Number of entries listed when no limit is given
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            busy_timeout_ms: default_busy_timeout_ms(),
            enable_wal: true,
            default_page_size: default_page_size(),
        }
    }
}

impl StoreConfig {
    /// Configured store path, or the default location under the data directory
    pub fn resolve_database_path(&self) -> Result<PathBuf> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => default_database_path(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching filter for the `log` facade
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Default store filename
const DEFAULT_DB_FILENAME: &str = "transcache.db";

/// Default store directory name under the user's data directory
const DEFAULT_DB_DIRNAME: &str = "transcache";

/// Get the default store path
pub fn default_database_path() -> Result<PathBuf> {
    let base_dir = dirs::data_local_dir()
        .or_else(dirs::data_dir)
        .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("share")))
        .ok_or_else(|| anyhow!("Could not determine data directory"))?;

    Ok(base_dir.join(DEFAULT_DB_DIRNAME).join(DEFAULT_DB_FILENAME))
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

fn default_page_size() -> usize {
    20
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load the configuration from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;

        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load the configuration, writing a default one first if the file is missing.
    /// Returns the config and whether it was freshly created.
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<(Self, bool)> {
        let path = path.as_ref();
        if path.exists() {
            return Ok((Self::load(path)?, false));
        }

        let config = Config::default();
        config.save(path)?;
        Ok((config, true))
    }

    /// Save the configuration as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_json =
            serde_json::to_string_pretty(self).context("Failed to serialize config to JSON")?;

        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))?;

        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.store.busy_timeout_ms == 0 {
            return Err(anyhow!("store.busy_timeout_ms must be greater than zero"));
        }

        if self.store.default_page_size == 0 {
            return Err(anyhow!("store.default_page_size must be greater than zero"));
        }

        if let Some(path) = &self.store.database_path {
            if path.as_os_str().is_empty() {
                return Err(anyhow!("store.database_path must not be empty"));
            }
            if path.is_dir() {
                return Err(anyhow!(
                    "store.database_path points to a directory: {}",
                    path.display()
                ));
            }
        }

        Ok(())
    }
}
