/*!
 * Translation store operations.
 *
 * Every operation opens exactly one transaction on the `translations_history`
 * collection, does its work through a `RecordCursor` or a single statement,
 * and waits for the transaction to finish before returning.
 */

use async_trait::async_trait;
use log::debug;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::connection::StoreConnection;
use super::cursor::RecordCursor;
use super::matcher::partial_match;
use super::models::{SortOrder, StoreStats, StoredRecord, TranslationEntry};
use super::schema::{ORIGINAL_TEXT_EXPR, TRANSLATIONS_TABLE};
use crate::app_config::StoreConfig;
use crate::errors::{StoreError, StoreResult};

/// Operations the translation cache exposes to its callers
#[async_trait]
pub trait TranslationHistory: Send + Sync {
    /// Insert an entry and return the key assigned to it
    async fn add_entry(&self, entry: &TranslationEntry) -> StoreResult<i64>;

    /// Remove the entry with `key`; a missing key is not an error
    async fn delete_entry(&self, key: i64) -> StoreResult<()>;

    /// Look up a single entry by key
    async fn get_entry(&self, key: i64) -> StoreResult<Option<TranslationEntry>>;

    /// Page through entries by key, skipping `from` records and returning at most `limit`
    async fn get_entries(
        &self,
        from: Option<usize>,
        limit: Option<usize>,
        order: SortOrder,
    ) -> StoreResult<Vec<StoredRecord>>;

    /// First entry partially matching `criteria`, which must name `translation.originalText`
    async fn find_entry(&self, criteria: &Value) -> StoreResult<Option<StoredRecord>>;

    /// Delete every entry whose translation partially matches `criteria`
    async fn delete_entries(&self, criteria: &Value) -> StoreResult<usize>;

    /// Remove every entry
    async fn flush(&self) -> StoreResult<usize>;
}

/// Persistent, indexed store of computed translations
#[derive(Clone)]
pub struct TranslationStore {
    db: StoreConnection,
    records_scanned: Arc<AtomicU64>,
}

impl TranslationStore {
    /// Wrap an already opened connection
    pub fn new(db: StoreConnection) -> Self {
        Self {
            db,
            records_scanned: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Open the store file at `path`
    pub fn open<P: AsRef<Path>>(path: P, config: &StoreConfig) -> StoreResult<Self> {
        Ok(Self::new(StoreConnection::open(path, config)?))
    }

    /// Create a store that lives only in memory
    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self::new(StoreConnection::open_in_memory()?))
    }

    /// Underlying connection
    pub fn connection(&self) -> &StoreConnection {
        &self.db
    }

    /// Total number of rows stepped by cursors since the store was opened
    pub fn records_scanned(&self) -> u64 {
        self.records_scanned.load(Ordering::Relaxed)
    }

    fn record_scan(&self, visited: u64) {
        self.records_scanned.fetch_add(visited, Ordering::Relaxed);
    }

    // =========================================================================
    // Mutation Operations
    // =========================================================================

    /// Insert an entry and return the key assigned to it
    pub async fn add_entry(&self, entry: &TranslationEntry) -> StoreResult<i64> {
        let data = serde_json::to_string(entry)?;

        let key = self
            .db
            .write_async(move |tx| {
                tx.execute(
                    &format!("INSERT INTO {TRANSLATIONS_TABLE} (data) VALUES (?1)"),
                    [data],
                )?;
                Ok(tx.last_insert_rowid())
            })
            .await?;

        debug!(
            "Stored translation {} for '{}'",
            key,
            truncate_text(&entry.translation.original_text, 30)
        );
        Ok(key)
    }

    /// Insert several entries in one transaction, returning their keys in order
    pub async fn add_entries(&self, entries: &[TranslationEntry]) -> StoreResult<Vec<i64>> {
        let documents = entries
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<Vec<_>, _>>()?;

        let keys = self
            .db
            .write_async(move |tx| {
                let mut stmt =
                    tx.prepare(&format!("INSERT INTO {TRANSLATIONS_TABLE} (data) VALUES (?1)"))?;
                let mut keys = Vec::with_capacity(documents.len());
                for data in documents {
                    stmt.execute([data])?;
                    keys.push(tx.last_insert_rowid());
                }
                Ok(keys)
            })
            .await?;

        debug!("Stored {} translations in one batch", keys.len());
        Ok(keys)
    }

    /// Remove the entry with `key`; a missing key is not an error
    pub async fn delete_entry(&self, key: i64) -> StoreResult<()> {
        let deleted = self
            .db
            .write_async(move |tx| {
                Ok(tx.execute(
                    &format!("DELETE FROM {TRANSLATIONS_TABLE} WHERE key = ?1"),
                    [key],
                )?)
            })
            .await?;

        debug!("Delete of translation {} removed {} record(s)", key, deleted);
        Ok(())
    }

    /// Remove every entry. Keys are not reused afterwards.
    pub async fn flush(&self) -> StoreResult<usize> {
        let deleted = self
            .db
            .write_async(|tx| Ok(tx.execute(&format!("DELETE FROM {TRANSLATIONS_TABLE}"), [])?))
            .await?;

        debug!("Flushed {} translations", deleted);
        Ok(deleted)
    }

    // =========================================================================
    // Query Operations
    // =========================================================================

    /// Look up a single entry by key
    pub async fn get_entry(&self, key: i64) -> StoreResult<Option<TranslationEntry>> {
        self.db
            .read_async(move |tx| {
                let mut stmt = tx.prepare_cached(&format!(
                    "SELECT key, data FROM {TRANSLATIONS_TABLE} WHERE key = ?1"
                ))?;
                let mut cursor = RecordCursor::open(tx, &mut stmt, [key])?;
                let record = cursor.next_record()?;
                Ok(record.map(|record| record.data))
            })
            .await
    }

    /// Page through entries by key.
    ///
    /// `from` is an offset: that many records are skipped in `order` before
    /// collecting. At most `limit` records are returned, or all remaining ones
    /// when `limit` is `None`.
    pub async fn get_entries(
        &self,
        from: Option<usize>,
        limit: Option<usize>,
        order: SortOrder,
    ) -> StoreResult<Vec<StoredRecord>> {
        if limit == Some(0) {
            return Ok(Vec::new());
        }

        let (records, visited) = self
            .db
            .read_async(move |tx| {
                let mut stmt = tx.prepare_cached(&format!(
                    "SELECT key, data FROM {TRANSLATIONS_TABLE} ORDER BY key {}",
                    order.as_sql()
                ))?;
                let mut cursor = RecordCursor::open(tx, &mut stmt, [])?;

                if let Some(from) = from.filter(|&from| from > 0) {
                    cursor.advance(from)?;
                }

                let mut records = Vec::with_capacity(limit.unwrap_or(0).min(1024));
                while limit.is_none_or(|limit| records.len() < limit) {
                    match cursor.next_record()? {
                        Some(record) => records.push(record),
                        None => break,
                    }
                }

                Ok((records, cursor.visited()))
            })
            .await?;

        self.record_scan(visited);
        Ok(records)
    }

    /// Number of stored entries
    pub async fn count(&self) -> StoreResult<i64> {
        self.db
            .read_async(|tx| {
                Ok(tx.query_row(
                    &format!("SELECT COUNT(*) FROM {TRANSLATIONS_TABLE}"),
                    [],
                    |row| row.get(0),
                )?)
            })
            .await
    }

    /// Summary figures for the store
    pub async fn stats(&self) -> StoreResult<StoreStats> {
        let (entry_count, oldest_timestamp, newest_timestamp) = self
            .db
            .read_async(|tx| {
                Ok(tx.query_row(
                    &format!(
                        "SELECT COUNT(*), MIN(json_extract(data, '$.timestamp')), MAX(json_extract(data, '$.timestamp')) FROM {TRANSLATIONS_TABLE}"
                    ),
                    [],
                    |row| {
                        Ok((
                            row.get::<_, i64>(0)?,
                            row.get::<_, Option<i64>>(1)?,
                            row.get::<_, Option<i64>>(2)?,
                        ))
                    },
                )?)
            })
            .await?;

        Ok(StoreStats {
            entry_count,
            oldest_timestamp,
            newest_timestamp,
            file_size_bytes: self.db.file_size(),
        })
    }

    /// Reclaim space left behind by deletions
    pub async fn vacuum(&self) -> StoreResult<()> {
        self.db.vacuum().await
    }

    // =========================================================================
    // Match Operations
    // =========================================================================

    /// First entry, in key order, that partially matches `criteria`.
    ///
    /// `criteria` is shaped like a stored entry and must contain a string at
    /// `translation.originalText`; only records sharing that text are visited.
    pub async fn find_entry(&self, criteria: &Value) -> StoreResult<Option<StoredRecord>> {
        let original_text = index_key(criteria.pointer("/translation/originalText"))?;
        let criteria = criteria.clone();

        let (found, visited) = self
            .db
            .read_async(move |tx| {
                let mut stmt = tx.prepare_cached(&select_by_original_text())?;
                let mut cursor = RecordCursor::open(tx, &mut stmt, [&original_text])?;

                while let Some((key, value)) = cursor.next_value()? {
                    if partial_match(&criteria, &value) {
                        let record = RecordCursor::decode(key, value)?;
                        return Ok((Some(record), cursor.visited()));
                    }
                }

                Ok((None, cursor.visited()))
            })
            .await?;

        self.record_scan(visited);
        Ok(found)
    }

    /// Delete every entry whose `translation` partially matches `criteria`.
    ///
    /// `criteria` is shaped like a translation and must contain a string
    /// `originalText`. All matching records are removed in one transaction, or
    /// none are if anything fails. Returns the number of deleted records.
    pub async fn delete_entries(&self, criteria: &Value) -> StoreResult<usize> {
        let original_text = index_key(criteria.get("originalText"))?;
        let criteria = criteria.clone();

        let (deleted, visited) = self
            .db
            .write_async(move |tx| {
                let mut stmt = tx.prepare(&select_by_original_text())?;
                let mut cursor = RecordCursor::open(tx, &mut stmt, [&original_text])?;
                let mut deleted = 0usize;

                while let Some((_, value)) = cursor.next_value()? {
                    let matches = value
                        .get("translation")
                        .is_some_and(|translation| partial_match(&criteria, translation));
                    if matches && cursor.delete_current()? {
                        deleted += 1;
                    }
                }

                Ok((deleted, cursor.visited()))
            })
            .await?;

        self.record_scan(visited);
        debug!("Deleted {} translations matching criteria", deleted);
        Ok(deleted)
    }
}

#[async_trait]
impl TranslationHistory for TranslationStore {
    async fn add_entry(&self, entry: &TranslationEntry) -> StoreResult<i64> {
        TranslationStore::add_entry(self, entry).await
    }

    async fn delete_entry(&self, key: i64) -> StoreResult<()> {
        TranslationStore::delete_entry(self, key).await
    }

    async fn get_entry(&self, key: i64) -> StoreResult<Option<TranslationEntry>> {
        TranslationStore::get_entry(self, key).await
    }

    async fn get_entries(
        &self,
        from: Option<usize>,
        limit: Option<usize>,
        order: SortOrder,
    ) -> StoreResult<Vec<StoredRecord>> {
        TranslationStore::get_entries(self, from, limit, order).await
    }

    async fn find_entry(&self, criteria: &Value) -> StoreResult<Option<StoredRecord>> {
        TranslationStore::find_entry(self, criteria).await
    }

    async fn delete_entries(&self, criteria: &Value) -> StoreResult<usize> {
        TranslationStore::delete_entries(self, criteria).await
    }

    async fn flush(&self) -> StoreResult<usize> {
        TranslationStore::flush(self).await
    }
}

/// Statement walking the original text index in key order
fn select_by_original_text() -> String {
    format!("SELECT key, data FROM {TRANSLATIONS_TABLE} WHERE {ORIGINAL_TEXT_EXPR} = ?1 ORDER BY key")
}

/// Extract the indexed original text from criteria
fn index_key(value: Option<&Value>) -> StoreResult<String> {
    value
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(StoreError::MissingOriginalText)
}

/// Truncate text to a maximum length with ellipsis
fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}
