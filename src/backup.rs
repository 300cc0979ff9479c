/*!
 * Export and import of the translation store.
 *
 * Exports are a JSON array of stored records in ascending key order. Imports
 * accept a JSON array of entries (or of exported records) and insert them in
 * a single transaction; the store assigns fresh keys.
 */

use anyhow::{Context, Result};
use log::info;
use serde::Deserialize;
use std::io::{Read, Write};

use crate::database::{SortOrder, StoredRecord, TranslationEntry, TranslationStore};

/// One element of an import file
#[derive(Deserialize)]
#[serde(untagged)]
enum ImportItem {
    Record(StoredRecord),
    Entry(TranslationEntry),
}

impl ImportItem {
    fn into_entry(self) -> TranslationEntry {
        match self {
            ImportItem::Record(record) => record.data,
            ImportItem::Entry(entry) => entry,
        }
    }
}

/// Write every stored record to `writer`. Returns the number exported.
pub async fn export_to_writer<W: Write>(store: &TranslationStore, writer: W) -> Result<usize> {
    let records = store
        .get_entries(None, None, SortOrder::Asc)
        .await
        .context("Failed to read translations for export")?;

    serde_json::to_writer_pretty(writer, &records).context("Failed to write export")?;

    info!("Exported {} translations", records.len());
    Ok(records.len())
}

/// Read entries from `reader` and add them to the store. Returns the new keys.
pub async fn import_from_reader<R: Read>(store: &TranslationStore, reader: R) -> Result<Vec<i64>> {
    let items: Vec<ImportItem> =
        serde_json::from_reader(reader).context("Failed to parse import file")?;
    let entries: Vec<TranslationEntry> = items.into_iter().map(ImportItem::into_entry).collect();

    let keys = store
        .add_entries(&entries)
        .await
        .context("Failed to store imported translations")?;

    info!("Imported {} translations", keys.len());
    Ok(keys)
}
