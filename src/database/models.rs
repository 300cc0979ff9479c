/*!
 * Stored entity models.
 *
 * These structures describe the JSON document persisted for each cached
 * translation and the key/value pairs handed back to callers.
 */

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// One translation unit as produced by a translation provider.
///
/// Only `originalText` is required; providers differ in what else they
/// return, so the remaining fields may be absent from a stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Translation {
    /// Text that was submitted for translation (indexed)
    pub original_text: String,
    /// Text returned by the provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated_text: Option<String>,
    /// Source language code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_language: Option<String>,
    /// Target language code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_language: Option<String>,
    /// Any further provider-specific fields, kept verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Translation {
    /// Create a translation without extra fields
    pub fn new(
        original_text: impl Into<String>,
        translated_text: impl Into<String>,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
    ) -> Self {
        Self {
            original_text: original_text.into(),
            translated_text: Some(translated_text.into()),
            source_language: Some(source_language.into()),
            target_language: Some(target_language.into()),
            extra: Map::new(),
        }
    }

    /// Create a translation carrying only the original text
    pub fn original(original_text: impl Into<String>) -> Self {
        Self {
            original_text: original_text.into(),
            translated_text: None,
            source_language: None,
            target_language: None,
            extra: Map::new(),
        }
    }

    /// Attach an additional opaque field
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }
}

/// Value persisted for every cached translation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationEntry {
    /// The translation itself
    pub translation: Translation,
    /// Creation time in milliseconds since the Unix epoch
    pub timestamp: i64,
    /// Provider that produced the translation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translator: Option<String>,
}

impl TranslationEntry {
    /// Create an entry stamped with the current time
    pub fn new(translation: Translation, translator: Option<String>) -> Self {
        Self {
            translation,
            timestamp: chrono::Utc::now().timestamp_millis(),
            translator,
        }
    }

    /// Create an entry with an explicit timestamp
    pub fn with_timestamp(translation: Translation, timestamp: i64, translator: Option<String>) -> Self {
        Self {
            translation,
            timestamp,
            translator,
        }
    }
}

/// A persisted entry together with the key the store assigned to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Auto-assigned primary key
    pub key: i64,
    /// Stored entry
    pub data: TranslationEntry,
}

/// Traversal order over primary keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Oldest first
    Asc,
    /// Newest first
    #[default]
    Desc,
}

impl SortOrder {
    pub(crate) fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "asc"),
            SortOrder::Desc => write!(f, "desc"),
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(anyhow::anyhow!("Invalid sort order: {}", s)),
        }
    }
}

/// Summary figures for the store
#[derive(Debug, Clone, PartialEq)]
pub struct StoreStats {
    /// Number of stored entries
    pub entry_count: i64,
    /// Smallest entry timestamp, if any entries exist
    pub oldest_timestamp: Option<i64>,
    /// Largest entry timestamp, if any entries exist
    pub newest_timestamp: Option<i64>,
    /// Database file size in bytes (0 for in-memory stores)
    pub file_size_bytes: u64,
}

impl fmt::Display for StoreStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Entries: {}, Oldest: {}, Newest: {}, Size: {} KB",
            self.entry_count,
            self.oldest_timestamp.map_or_else(|| "-".to_string(), |t| t.to_string()),
            self.newest_timestamp.map_or_else(|| "-".to_string(), |t| t.to_string()),
            self.file_size_bytes / 1024
        )
    }
}
