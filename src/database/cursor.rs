/*!
 * Streaming cursor over stored records.
 *
 * A `RecordCursor` steps a prepared `SELECT key, data ...` statement one row at
 * a time. Offsets, limits and position-scoped deletes are all expressed on the
 * cursor, so nothing is materialized before it is needed.
 */

use rusqlite::{Connection, Params, Rows, Statement};
use serde_json::Value;

use super::models::{StoredRecord, TranslationEntry};
use super::schema::TRANSLATIONS_TABLE;
use crate::errors::StoreResult;

/// Ordered iteration handle over `(key, data)` rows
pub struct RecordCursor<'a> {
    conn: &'a Connection,
    rows: Rows<'a>,
    current_key: Option<i64>,
    visited: u64,
}

impl<'a> RecordCursor<'a> {
    /// Start stepping `stmt`, which must select `key` then `data`
    pub fn open<P: Params>(
        conn: &'a Connection,
        stmt: &'a mut Statement<'_>,
        params: P,
    ) -> StoreResult<Self> {
        let rows = stmt.query(params)?;
        Ok(Self {
            conn,
            rows,
            current_key: None,
            visited: 0,
        })
    }

    /// Skip up to `count` rows without decoding them. Returns how many were skipped.
    pub fn advance(&mut self, count: usize) -> StoreResult<usize> {
        let mut skipped = 0;
        while skipped < count {
            if self.step()?.is_none() {
                break;
            }
            skipped += 1;
        }
        Ok(skipped)
    }

    /// Next row as its key and raw JSON document
    pub fn next_value(&mut self) -> StoreResult<Option<(i64, Value)>> {
        match self.step()? {
            Some((key, data)) => Ok(Some((key, serde_json::from_str(&data)?))),
            None => Ok(None),
        }
    }

    /// Next row decoded into a `StoredRecord`
    pub fn next_record(&mut self) -> StoreResult<Option<StoredRecord>> {
        match self.step()? {
            Some((key, data)) => {
                let data: TranslationEntry = serde_json::from_str(&data)?;
                Ok(Some(StoredRecord { key, data }))
            }
            None => Ok(None),
        }
    }

    /// Decode a value previously returned by `next_value`
    pub fn decode(key: i64, value: Value) -> StoreResult<StoredRecord> {
        Ok(StoredRecord {
            key,
            data: serde_json::from_value(value)?,
        })
    }

    /// Delete the row the cursor is positioned on.
    ///
    /// SQLite allows deleting the row most recently returned by a pending
    /// SELECT on the same connection. Returns false if there is no current row.
    pub fn delete_current(&mut self) -> StoreResult<bool> {
        let Some(key) = self.current_key.take() else {
            return Ok(false);
        };

        let mut stmt = self
            .conn
            .prepare_cached(&format!("DELETE FROM {TRANSLATIONS_TABLE} WHERE key = ?1"))?;
        let deleted = stmt.execute([key])?;
        Ok(deleted > 0)
    }

    /// Number of rows stepped so far
    pub fn visited(&self) -> u64 {
        self.visited
    }

    fn step(&mut self) -> StoreResult<Option<(i64, String)>> {
        match self.rows.next()? {
            Some(row) => {
                let key: i64 = row.get(0)?;
                let data: String = row.get(1)?;
                self.current_key = Some(key);
                self.visited += 1;
                Ok(Some((key, data)))
            }
            None => {
                self.current_key = None;
                Ok(None)
            }
        }
    }
}
