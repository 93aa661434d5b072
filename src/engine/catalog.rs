use std::collections::HashSet;

use crate::engine::session::ListEngine;
use crate::engine::{
    INDEX_KEY, ITEMS_PREFIX, ListError, TITLE_PREFIX, ids, is_reserved_id, items_key, title_key,
};
use crate::io::kv::KeyValueStore;
use crate::model::item::TopLevelItem;
use crate::model::list::{DEFAULT_TITLE, ListEntry, TodoList};

/// All lists kept in one store.
#[derive(Debug)]
pub struct Catalog<S> {
    store: S,
    default_title: String,
}

impl<S: KeyValueStore> Catalog<S> {
    pub fn new(store: S) -> Self {
        Catalog {
            store,
            default_title: DEFAULT_TITLE.to_string(),
        }
    }

    /// Placeholder used for lists without a stored title
    pub fn with_default_title(mut self, title: impl Into<String>) -> Self {
        self.default_title = title.into();
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Create a list with `title` and return its new id. No items entry is
    /// written; an absent entry reads back as an empty list.
    pub fn create_list(&mut self, title: &str) -> Result<String, ListError> {
        let mut index = self.read_index()?;
        let mut in_use: HashSet<String> = index.iter().cloned().collect();
        in_use.extend(self.scan_ids()?);
        let id = ids::mint_id(|candidate| in_use.contains(candidate));

        self.store.set(&title_key(&id), title)?;
        index.push(id.clone());
        if let Err(e) = self.write_index(&index) {
            // Keep title and index in step: an unindexed list would be invisible
            if let Err(rollback) = self.store.remove(&title_key(&id)) {
                log::warn!("could not remove title of unindexed list {}: {}", id, rollback);
            }
            return Err(e);
        }
        log::info!("created list {} ({:?})", id, title);
        Ok(id)
    }

    /// Load a list. Absent title or items are valid state, not errors.
    pub fn load_list(&self, list_id: &str) -> Result<TodoList, ListError> {
        load_list(&self.store, list_id, &self.default_title)
    }

    pub fn rename_list(&mut self, list_id: &str, title: &str) -> Result<(), ListError> {
        check_id(list_id)?;
        self.store.set(&title_key(list_id), title)?;
        log::debug!("renamed list {} to {:?}", list_id, title);
        Ok(())
    }

    /// Remove every stored trace of a list. Idempotent.
    pub fn delete_list(&mut self, list_id: &str) -> Result<(), ListError> {
        if is_reserved_id(list_id) {
            return Ok(());
        }
        self.store.remove(&items_key(list_id))?;
        self.store.remove(&title_key(list_id))?;
        if let Some(mut index) = self.stored_index()? {
            let before = index.len();
            index.retain(|i| i != list_id);
            if index.len() != before {
                self.write_index(&index)?;
            }
        }
        log::info!("deleted list {}", list_id);
        Ok(())
    }

    /// Whether `list_id` is one of the lists [`Catalog::list_lists`] returns
    pub fn exists(&self, list_id: &str) -> Result<bool, ListError> {
        if is_reserved_id(list_id) {
            return Ok(false);
        }
        Ok(self.read_index()?.iter().any(|id| id == list_id))
    }

    /// The stored title, without reading the items
    pub fn stored_title(&self, list_id: &str) -> Result<Option<String>, ListError> {
        check_id(list_id)?;
        Ok(self.store.get(&title_key(list_id))?)
    }

    /// All lists with their titles, in creation order.
    pub fn list_lists(&self) -> Result<Vec<ListEntry>, ListError> {
        self.read_index()?
            .into_iter()
            .map(|id| -> Result<ListEntry, ListError> {
                let title = self
                    .store
                    .get(&title_key(&id))?
                    .unwrap_or_else(|| self.default_title.clone());
                Ok(ListEntry { id, title })
            })
            .collect()
    }

    /// Start an editing session on one list.
    pub fn open(&mut self, list_id: &str) -> Result<ListEngine<&mut S>, ListError> {
        let list = load_list(&self.store, list_id, &self.default_title)?;
        Ok(ListEngine::new(&mut self.store, list))
    }

    // -----------------------------------------------------------------------
    // Recovery
    // -----------------------------------------------------------------------

    /// The raw stored item payload, if any
    pub fn raw_items(&self, list_id: &str) -> Result<Option<String>, ListError> {
        check_id(list_id)?;
        Ok(self.store.get(&items_key(list_id))?)
    }

    /// If the stored items of `list_id` are unreadable, drop them so the
    /// list reads back as empty. Returns the dropped payload; `None` means
    /// there was nothing to recover from.
    pub fn reset_corrupt_list(&mut self, list_id: &str) -> Result<Option<String>, ListError> {
        check_id(list_id)?;
        let key = items_key(list_id);
        let Some(raw) = self.store.get(&key)? else {
            return Ok(None);
        };
        if serde_json::from_str::<Vec<TopLevelItem>>(&raw).is_ok() {
            return Ok(None);
        }
        self.store.remove(&key)?;
        log::warn!("reset corrupt items of list {}", list_id);
        Ok(Some(raw))
    }

    // -----------------------------------------------------------------------
    // Index
    // -----------------------------------------------------------------------

    /// The index record, if one has been written
    fn stored_index(&self) -> Result<Option<Vec<String>>, ListError> {
        match self.store.get(INDEX_KEY)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| ListError::CorruptData {
                    key: INDEX_KEY.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    /// List ids from the index record, or from a key scan for stores that
    /// predate the index.
    fn read_index(&self) -> Result<Vec<String>, ListError> {
        match self.stored_index()? {
            Some(index) => Ok(index),
            None => self.scan_ids(),
        }
    }

    /// Every id with a stored title or items, in key order, without repeats
    fn scan_ids(&self) -> Result<Vec<String>, ListError> {
        let mut seen = HashSet::new();
        Ok(self
            .store
            .list_keys()?
            .into_iter()
            .filter_map(|key| {
                key.strip_prefix(TITLE_PREFIX)
                    .or_else(|| key.strip_prefix(ITEMS_PREFIX))
                    .map(str::to_string)
            })
            .filter(|id| !is_reserved_id(id) && seen.insert(id.clone()))
            .collect())
    }

    fn write_index(&mut self, index: &[String]) -> Result<(), ListError> {
        let encoded = serde_json::to_string(index).map_err(|source| ListError::Encode {
            key: INDEX_KEY.to_string(),
            source,
        })?;
        self.store.set(INDEX_KEY, &encoded)?;
        Ok(())
    }
}

fn check_id(list_id: &str) -> Result<(), ListError> {
    if is_reserved_id(list_id) {
        return Err(ListError::ReservedId {
            id: list_id.to_string(),
        });
    }
    Ok(())
}

/// Read title and items for `list_id` from `store`.
pub fn load_list<S: KeyValueStore + ?Sized>(
    store: &S,
    list_id: &str,
    default_title: &str,
) -> Result<TodoList, ListError> {
    check_id(list_id)?;
    let mut list = TodoList::empty(list_id, default_title);
    if let Some(title) = store.get(&title_key(list_id))? {
        list.title = title;
    }
    let key = items_key(list_id);
    if let Some(raw) = store.get(&key)? {
        list.items = serde_json::from_str(&raw).map_err(|source| {
            log::warn!("items of list {} are unreadable: {}", list_id, source);
            ListError::CorruptData {
                key: key.clone(),
                source,
            }
        })?;
    }
    Ok(list)
}
