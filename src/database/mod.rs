/*!
 * Persistent storage of computed translations.
 *
 * This module provides the SQLite-backed translation cache:
 * - A lazily opened, shared store handle (`StoreManager`)
 * - Keyed inserts, deletes, point lookups and paginated listing
 * - Partial-match search and bulk deletion over the original text index
 */

pub mod connection;
pub mod cursor;
pub mod manager;
pub mod matcher;
pub mod models;
pub mod schema;
pub mod store;

// Re-export main types
pub use connection::StoreConnection;
pub use manager::{StoreLocation, StoreManager};
pub use matcher::partial_match;
pub use models::{SortOrder, StoreStats, StoredRecord, Translation, TranslationEntry};
pub use store::{TranslationHistory, TranslationStore};
