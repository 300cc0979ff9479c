/*!
 * Error types for the translation store.
 *
 * Store operations return `StoreResult`, built on the thiserror-derived
 * `StoreError`. Configuration and CLI code use anyhow on top of these.
 */

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while opening or operating on the translation store
#[derive(Error, Debug)]
pub enum StoreError {
    /// Match criteria did not name the indexed original text
    #[error("Criteria must contain a string `originalText` to use the original text index")]
    MissingOriginalText,

    /// The store file could not be opened
    #[error("Failed to open translation store at {path:?}: {source}")]
    Open {
        /// Location of the store file
        path: PathBuf,
        /// Underlying SQLite error
        #[source]
        source: rusqlite::Error,
    },

    /// The directory holding the store file could not be created
    #[error("Failed to create store directory {path:?}: {source}")]
    Directory {
        /// Directory that could not be created
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A statement or transaction failed inside the storage engine
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// A stored document could not be encoded or decoded
    #[error("Failed to encode or decode a stored entry: {0}")]
    Codec(#[from] serde_json::Error),

    /// The on-disk schema was written by a newer build
    #[error("Unsupported schema version {found} for '{collection}' (this build supports up to {supported})")]
    UnsupportedSchemaVersion {
        /// Collection whose version is too new
        collection: String,
        /// Version found on disk
        found: i32,
        /// Latest version this build understands
        supported: i32,
    },

    /// The blocking worker running a store operation failed
    #[error("Store task failed: {0}")]
    Task(String),
}

impl StoreError {
    /// Whether the error is a caller mistake rather than a storage failure
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::MissingOriginalText)
    }
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(error: tokio::task::JoinError) -> Self {
        Self::Task(error.to_string())
    }
}

/// Result alias used by every store operation
pub type StoreResult<T> = std::result::Result<T, StoreError>;
