/*!
 * Store connection management.
 *
 * This module opens the SQLite file behind the translation store, brings its
 * schema up to date, and provides async-safe transactional access using
 * tokio's spawn_blocking.
 */

use log::{debug, info};
use parking_lot::Mutex;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::schema::{self, TranslationsHistory};
use crate::app_config::StoreConfig;
use crate::errors::{StoreError, StoreResult};

/// Path reported for in-memory stores
const IN_MEMORY_PATH: &str = ":memory:";

/// Connection wrapper with thread-safe access
#[derive(Clone)]
pub struct StoreConnection {
    /// Path to the database file
    db_path: PathBuf,
    /// Single connection shared by every operation
    connection: Arc<Mutex<Connection>>,
}

impl StoreConnection {
    /// Open (creating on first run) the store file at `db_path`
    pub fn open<P: AsRef<Path>>(db_path: P, config: &StoreConfig) -> StoreResult<Self> {
        let db_path = db_path.as_ref().to_path_buf();

        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Directory {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        info!("Opening translation store at: {:?}", db_path);

        let mut conn = Connection::open(&db_path).map_err(|source| StoreError::Open {
            path: db_path.clone(),
            source,
        })?;

        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
        if config.enable_wal {
            let mode: String =
                conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;
            debug!("Journal mode: {}", mode);
        }

        schema::initialize::<TranslationsHistory>(&mut conn)?;

        Ok(Self {
            db_path,
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create an in-memory store (for testing)
    pub fn open_in_memory() -> StoreResult<Self> {
        debug!("Creating in-memory translation store");

        let mut conn = Connection::open_in_memory().map_err(|source| StoreError::Open {
            path: PathBuf::from(IN_MEMORY_PATH),
            source,
        })?;

        schema::initialize::<TranslationsHistory>(&mut conn)?;

        Ok(Self {
            db_path: PathBuf::from(IN_MEMORY_PATH),
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    /// Get the database file path
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Whether the store lives only in memory
    pub fn is_in_memory(&self) -> bool {
        self.db_path.as_os_str() == IN_MEMORY_PATH
    }

    /// Run `f` against the raw connection outside of any transaction
    pub async fn execute_async<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.connection.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn.lock();
            f(&conn)
        })
        .await?
    }

    /// Run `f` inside a deferred (read) transaction
    pub async fn read_async<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Transaction) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        self.transaction_async(TransactionBehavior::Deferred, f).await
    }

    /// Run `f` inside an immediate (write) transaction.
    ///
    /// The transaction commits only if `f` succeeds; otherwise it is rolled
    /// back when dropped and none of its changes persist.
    pub async fn write_async<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Transaction) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        self.transaction_async(TransactionBehavior::Immediate, f).await
    }

    async fn transaction_async<F, T>(&self, behavior: TransactionBehavior, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Transaction) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.connection.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock();

            let tx = conn.transaction_with_behavior(behavior)?;
            let result = f(&tx)?;
            tx.commit()?;

            Ok(result)
        })
        .await?
    }

    /// Vacuum the database to reclaim space
    pub async fn vacuum(&self) -> StoreResult<()> {
        self.execute_async(|conn| {
            conn.execute("VACUUM", [])?;
            Ok(())
        })
        .await
    }

    /// Size of the database file in bytes (0 for in-memory stores)
    pub fn file_size(&self) -> u64 {
        if self.is_in_memory() {
            return 0;
        }
        std::fs::metadata(&self.db_path)
            .map(|m| m.len())
            .unwrap_or(0)
    }
}
