/*!
 * Lazily opened store handle.
 *
 * A `StoreManager` is built once at startup and handed to whoever needs the
 * translation store. The first `get_store` call opens the file and prepares
 * its schema; concurrent first calls wait on the same initialization and
 * receive the same handle.
 */

use async_trait::async_trait;
use log::info;
use serde_json::Value;
use std::path::PathBuf;
use tokio::sync::OnceCell;

use super::models::{SortOrder, StoredRecord, TranslationEntry};
use super::store::{TranslationHistory, TranslationStore};
use crate::app_config::StoreConfig;
use crate::errors::{StoreError, StoreResult};

/// Where the store keeps its data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// SQLite file on disk
    File(PathBuf),
    /// Private in-memory database
    Memory,
}

/// Owner of the process-wide translation store handle
pub struct StoreManager {
    location: StoreLocation,
    config: StoreConfig,
    store: OnceCell<TranslationStore>,
}

impl StoreManager {
    /// Manager for a store at `location`; nothing is opened yet
    pub fn new(location: StoreLocation, config: StoreConfig) -> Self {
        Self {
            location,
            config,
            store: OnceCell::new(),
        }
    }

    /// Manager for the store file named by `config`
    pub fn from_config(config: &StoreConfig) -> anyhow::Result<Self> {
        let path = config.resolve_database_path()?;
        Ok(Self::new(StoreLocation::File(path), config.clone()))
    }

    /// Manager for a private in-memory store
    pub fn in_memory() -> Self {
        Self::new(StoreLocation::Memory, StoreConfig::default())
    }

    /// Where the store lives
    pub fn location(&self) -> &StoreLocation {
        &self.location
    }

    /// Whether the store has been opened
    pub fn is_open(&self) -> bool {
        self.store.initialized()
    }

    /// The shared store handle, opening it on first use
    pub async fn get_store(&self) -> StoreResult<&TranslationStore> {
        self.store
            .get_or_try_init(|| async {
                let location = self.location.clone();
                let config = self.config.clone();

                let store = tokio::task::spawn_blocking(move || match location {
                    StoreLocation::File(path) => TranslationStore::open(path, &config),
                    StoreLocation::Memory => TranslationStore::open_in_memory(),
                })
                .await??;

                info!("Translation store ready ({:?})", self.location);
                Ok::<_, StoreError>(store)
            })
            .await
    }
}

#[async_trait]
impl TranslationHistory for StoreManager {
    async fn add_entry(&self, entry: &TranslationEntry) -> StoreResult<i64> {
        self.get_store().await?.add_entry(entry).await
    }

    async fn delete_entry(&self, key: i64) -> StoreResult<()> {
        self.get_store().await?.delete_entry(key).await
    }

    async fn get_entry(&self, key: i64) -> StoreResult<Option<TranslationEntry>> {
        self.get_store().await?.get_entry(key).await
    }

    async fn get_entries(
        &self,
        from: Option<usize>,
        limit: Option<usize>,
        order: SortOrder,
    ) -> StoreResult<Vec<StoredRecord>> {
        self.get_store().await?.get_entries(from, limit, order).await
    }

    async fn find_entry(&self, criteria: &Value) -> StoreResult<Option<StoredRecord>> {
        self.get_store().await?.find_entry(criteria).await
    }

    async fn delete_entries(&self, criteria: &Value) -> StoreResult<usize> {
        self.get_store().await?.delete_entries(criteria).await
    }

    async fn flush(&self) -> StoreResult<usize> {
        self.get_store().await?.flush().await
    }
}
