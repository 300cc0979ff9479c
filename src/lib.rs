/*!
 * # transcache - local translation cache store
 *
 * A Rust library that records previously computed translations so they can be
 * looked up instead of asking a translation provider again.
 *
 * ## Features
 *
 * - Persistent SQLite store with auto-assigned, never reused keys
 * - Secondary index over each translation's original text
 * - One transaction per operation
 * - Paginated listing with offset and limit, newest first by default
 * - Partial-match search and bulk deletion
 * - JSON export and import
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `database`: The translation store:
 *   - `database::manager`: Lazily opened, shared store handle
 *   - `database::store`: Store operations and the `TranslationHistory` trait
 *   - `database::cursor`: Streaming cursor over stored records
 *   - `database::matcher`: One-directional partial equality
 *   - `database::schema`: Versioned schema and migrations
 * - `backup`: Export and import
 * - `errors`: Custom error types for the store
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod backup;
pub mod database;
pub mod errors;

// Re-export main types for easier usage
pub use app_config::Config;
pub use database::{
    SortOrder, StoreLocation, StoreManager, StoredRecord, Translation, TranslationEntry,
    TranslationHistory, TranslationStore,
};
pub use errors::{StoreError, StoreResult};
