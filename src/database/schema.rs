/*!
 * Schema definitions and migrations.
 *
 * Each persisted collection implements `VersionedStorage`: it can create its
 * storage from scratch at the current version and upgrade older storage one
 * version at a time. Versions are tracked per collection in `schema_versions`.
 */

use log::{debug, info};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior};

use crate::errors::{StoreError, StoreResult};

/// Contract every versioned collection fulfils
pub trait VersionedStorage {
    /// Name of the persisted collection
    const NAME: &'static str;

    /// Version this build expects on disk
    const VERSION: i32;

    /// Create the storage at `VERSION` on a fresh database
    fn prepare_storage(conn: &Connection) -> StoreResult<()>;

    /// Upgrade the storage from `from_version` to `from_version + 1`
    fn migrate(conn: &Connection, from_version: i32) -> StoreResult<()>;
}

/// Table holding cached translations
pub const TRANSLATIONS_TABLE: &str = "translations_history";

/// Name of the secondary index over `translation.originalText`
pub const ORIGINAL_TEXT_INDEX: &str = "idx_translations_history_original_text";

/// Expression the secondary index is built on. Queries must repeat it verbatim
/// for SQLite to pick the index.
pub const ORIGINAL_TEXT_EXPR: &str = "json_extract(data, '$.translation.originalText')";

/// Schema of the translation cache collection
pub struct TranslationsHistory;

impl TranslationsHistory {
    fn create_table(conn: &Connection) -> StoreResult<()> {
        conn.execute_batch(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {TRANSLATIONS_TABLE} (
                key INTEGER PRIMARY KEY AUTOINCREMENT,
                data TEXT NOT NULL
            );
            "#
        ))?;
        Ok(())
    }

    fn create_original_text_index(conn: &Connection) -> StoreResult<()> {
        conn.execute_batch(&format!(
            "CREATE INDEX IF NOT EXISTS {ORIGINAL_TEXT_INDEX} ON {TRANSLATIONS_TABLE} ({ORIGINAL_TEXT_EXPR});"
        ))?;
        Ok(())
    }
}

impl VersionedStorage for TranslationsHistory {
    const NAME: &'static str = TRANSLATIONS_TABLE;
    const VERSION: i32 = 2;

    fn prepare_storage(conn: &Connection) -> StoreResult<()> {
        Self::create_table(conn)?;
        Self::create_original_text_index(conn)?;
        Ok(())
    }

    fn migrate(conn: &Connection, from_version: i32) -> StoreResult<()> {
        match from_version {
            1 => Self::create_original_text_index(conn),
            _ => Err(StoreError::UnsupportedSchemaVersion {
                collection: Self::NAME.to_string(),
                found: from_version,
                supported: Self::VERSION,
            }),
        }
    }
}

/// Bring the collection `S` up to date.
///
/// Runs inside one immediate transaction so two processes opening the same
/// file cannot both create or migrate it.
pub fn initialize<S: VersionedStorage>(conn: &mut Connection) -> StoreResult<()> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    ensure_version_table(&tx)?;
    let current_version = get_schema_version(&tx, S::NAME)?;

    if current_version == 0 {
        info!("Initializing '{}' schema v{}", S::NAME, S::VERSION);
        S::prepare_storage(&tx)?;
        set_schema_version(&tx, S::NAME, S::VERSION)?;
    } else if current_version < S::VERSION {
        info!(
            "Migrating '{}' schema from v{} to v{}",
            S::NAME,
            current_version,
            S::VERSION
        );
        let mut version = current_version;
        while version < S::VERSION {
            S::migrate(&tx, version)?;
            version += 1;
            set_schema_version(&tx, S::NAME, version)?;
        }
    } else if current_version > S::VERSION {
        return Err(StoreError::UnsupportedSchemaVersion {
            collection: S::NAME.to_string(),
            found: current_version,
            supported: S::VERSION,
        });
    } else {
        debug!("Schema '{}' is up to date (v{})", S::NAME, current_version);
    }

    tx.commit()?;
    Ok(())
}

fn ensure_version_table(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_versions (
            collection TEXT PRIMARY KEY,
            version INTEGER NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

/// Version recorded for `collection`, or 0 if it was never created
pub fn get_schema_version(conn: &Connection, collection: &str) -> StoreResult<i32> {
    let version = conn
        .query_row(
            "SELECT version FROM schema_versions WHERE collection = ?1",
            [collection],
            |row| row.get(0),
        )
        .optional()?;

    Ok(version.unwrap_or(0))
}

fn set_schema_version(conn: &Connection, collection: &str, version: i32) -> StoreResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO schema_versions (collection, version, updated_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![collection, version, chrono::Utc::now().to_rfc3339()],
    )?;
    Ok(())
}
