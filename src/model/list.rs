use serde::{Deserialize, Serialize};

use super::item::TopLevelItem;

/// Title shown for a list whose title was never stored
pub const DEFAULT_TITLE: &str = "Untitled";

/// A fully loaded to-do list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoList {
    /// Opaque, time-derived list id
    pub id: String,
    pub title: String,
    /// Top-level items in display order
    pub items: Vec<TopLevelItem>,
}

impl TodoList {
    /// An empty list carrying the placeholder title
    pub fn empty(id: &str, default_title: &str) -> Self {
        TodoList {
            id: id.to_string(),
            title: default_title.to_string(),
            items: Vec::new(),
        }
    }

    /// Total number of entries on both levels
    pub fn entry_count(&self) -> usize {
        self.items.iter().map(|i| 1 + i.sub_items.len()).sum()
    }
}

/// One row of the list index. Derived from stored keys, never stored itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListEntry {
    pub id: String,
    pub title: String,
}
