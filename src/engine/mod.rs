//! The list mutation engine.
//!
//! [`Catalog`] owns the store and handles whole lists (create, load, rename,
//! delete, enumerate). [`ListEngine`] holds one loaded list and applies item
//! operations to it, persisting the full item tree after every change.
//!
//! Persisted layout:
//! - `todo-title-{id}`: the list title
//! - `todo-{id}`: the item tree as a JSON array
//! - `todo-index`: JSON array of list ids in creation order

pub mod catalog;
pub mod ids;
pub mod session;

pub use catalog::Catalog;
pub use session::ListEngine;

use crate::io::kv::StorageError;

/// Prefix of the per-list title keys
pub const TITLE_PREFIX: &str = "todo-title-";
/// Prefix of the per-list item keys
pub const ITEMS_PREFIX: &str = "todo-";
/// Key of the list index record
pub const INDEX_KEY: &str = "todo-index";

pub fn title_key(list_id: &str) -> String {
    format!("{}{}", TITLE_PREFIX, list_id)
}

pub fn items_key(list_id: &str) -> String {
    format!("{}{}", ITEMS_PREFIX, list_id)
}

/// Ids whose items key would land on the index record or on a title key.
/// Minted ids are all digits and never reserved.
pub fn is_reserved_id(list_id: &str) -> bool {
    let key = items_key(list_id);
    key == INDEX_KEY || key.starts_with(TITLE_PREFIX)
}

/// Error type for engine operations
#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("stored data under {key} is corrupt: {source}")]
    CorruptData {
        key: String,
        source: serde_json::Error,
    },
    #[error("'{id}' cannot be a list id")]
    ReservedId { id: String },
    #[error("could not encode {key}: {source}")]
    Encode {
        key: String,
        source: serde_json::Error,
    },
}
