use crate::engine::{ListError, catalog, ids, items_key};
use crate::io::kv::KeyValueStore;
use crate::model::item::TopLevelItem;
use crate::model::list::TodoList;
use crate::ops::item_ops::{self, InsertPosition};

/// An editing session on one list.
///
/// Every operation that changes the tree writes the whole item sequence back
/// to the store before the in-memory copy is updated, so a failed write
/// leaves the session showing exactly what is stored. Empty text and unknown
/// ids are no-ops, reported as `false` / `None`.
#[derive(Debug)]
pub struct ListEngine<S> {
    store: S,
    list: TodoList,
}

impl<S: KeyValueStore> ListEngine<S> {
    pub(crate) fn new(store: S, list: TodoList) -> Self {
        ListEngine { store, list }
    }

    /// Load `list_id` from `store` and start a session on it.
    pub fn open(store: S, list_id: &str, default_title: &str) -> Result<Self, ListError> {
        let list = catalog::load_list(&store, list_id, default_title)?;
        Ok(ListEngine { store, list })
    }

    /// The canonical list as last persisted
    pub fn list(&self) -> &TodoList {
        &self.list
    }

    pub fn items(&self) -> &[TopLevelItem] {
        &self.list.items
    }

    /// Append a top-level item. Returns the new id, or `None` for blank text.
    pub fn add_item(&mut self, text: &str) -> Result<Option<String>, ListError> {
        let id = self.mint_item_id();
        let added = self.apply("add_item", |items| {
            item_ops::add_item(items, id.clone(), text)
        })?;
        Ok(added.then_some(id))
    }

    /// Append a sub-item under `parent_id`. Returns the new id, or `None`
    /// for blank text or an unknown parent.
    pub fn add_sub_item(&mut self, parent_id: &str, text: &str) -> Result<Option<String>, ListError> {
        let id = self.mint_item_id();
        let added = self.apply("add_sub_item", |items| {
            item_ops::add_sub_item(items, parent_id, id.clone(), text)
        })?;
        Ok(added.then_some(id))
    }

    pub fn edit_item(&mut self, item_id: &str, text: &str) -> Result<bool, ListError> {
        self.apply("edit_item", |items| item_ops::edit_item(items, item_id, text))
    }

    pub fn delete_item(&mut self, item_id: &str, is_sub_item: bool) -> Result<bool, ListError> {
        self.apply("delete_item", |items| {
            item_ops::delete_item(items, item_id, is_sub_item)
        })
    }

    /// Reattach a sub-item to another parent. An unknown or missing parent
    /// leaves the tree unchanged.
    pub fn move_sub_item(
        &mut self,
        sub_item_id: &str,
        new_parent_id: Option<&str>,
    ) -> Result<bool, ListError> {
        self.apply("move_sub_item", |items| {
            item_ops::move_sub_item(items, sub_item_id, new_parent_id)
        })
    }

    pub fn promote_sub_item(&mut self, sub_item_id: &str) -> Result<bool, ListError> {
        self.apply("promote_sub_item", |items| {
            item_ops::promote_sub_item(items, sub_item_id)
        })
    }

    pub fn reorder_item(&mut self, item_id: &str, position: &InsertPosition) -> Result<bool, ListError> {
        self.apply("reorder_item", |items| {
            item_ops::reorder_item(items, item_id, position)
        })
    }

    pub fn reorder_sub_item(
        &mut self,
        sub_item_id: &str,
        position: &InsertPosition,
    ) -> Result<bool, ListError> {
        self.apply("reorder_sub_item", |items| {
            item_ops::reorder_sub_item(items, sub_item_id, position)
        })
    }

    fn mint_item_id(&self) -> String {
        ids::mint_id(|candidate| item_ops::contains_id(&self.list.items, candidate))
    }

    /// Run `op` on a copy of the items; persist and adopt the copy if it
    /// reports a change.
    fn apply(
        &mut self,
        op_name: &str,
        op: impl FnOnce(&mut Vec<TopLevelItem>) -> bool,
    ) -> Result<bool, ListError> {
        let mut items = self.list.items.clone();
        if !op(&mut items) {
            log::debug!("{} on list {}: no change", op_name, self.list.id);
            return Ok(false);
        }

        let key = items_key(&self.list.id);
        let encoded = serde_json::to_string(&items).map_err(|source| ListError::Encode {
            key: key.clone(),
            source,
        })?;
        self.store.set(&key, &encoded)?;
        self.list.items = items;
        log::debug!("{} on list {}: saved", op_name, self.list.id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Catalog;
    use crate::io::kv::{MemoryStore, StorageError};
    use pretty_assertions::assert_eq;

    fn texts(items: &[TopLevelItem]) -> Vec<&str> {
        items.iter().map(|i| i.text.as_str()).collect()
    }

    fn fresh() -> (Catalog<MemoryStore>, String) {
        let mut cat = Catalog::new(MemoryStore::new());
        let id = cat.create_list("Groceries").unwrap();
        (cat, id)
    }

    #[test]
    fn test_add_item_persists() {
        let (mut cat, id) = fresh();
        let item_id = {
            let mut engine = cat.open(&id).unwrap();
            let item_id = engine.add_item("Milk").unwrap().unwrap();
            assert_eq!(engine.items().len(), 1);
            item_id
        };
        let list = cat.load_list(&id).unwrap();
        assert_eq!(list.items.len(), 1);
        assert_eq!(list.items[0].id, item_id);
        assert_eq!(list.items[0].text, "Milk");
    }

    #[test]
    fn test_add_blank_is_noop_and_writes_nothing() {
        let (mut cat, id) = fresh();
        let mut engine = cat.open(&id).unwrap();
        assert_eq!(engine.add_item("").unwrap(), None);
        assert_eq!(engine.add_item("   ").unwrap(), None);
        assert!(engine.items().is_empty());
        drop(engine);
        assert_eq!(cat.raw_items(&id).unwrap(), None);
    }

    #[test]
    fn test_item_ids_unique_within_list() {
        let (mut cat, id) = fresh();
        let mut engine = cat.open(&id).unwrap();
        let a = engine.add_item("a").unwrap().unwrap();
        let b = engine.add_item("b").unwrap().unwrap();
        let c = engine.add_sub_item(&a, "c").unwrap().unwrap();
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
    }

    #[test]
    fn test_groceries_scenario() {
        let (mut cat, id) = fresh();
        let mut engine = cat.open(&id).unwrap();
        let milk = engine.add_item("Milk").unwrap().unwrap();
        engine.add_item("Bread").unwrap().unwrap();
        engine.add_sub_item(&milk, "2%").unwrap().unwrap();
        drop(engine);

        let list = cat.load_list(&id).unwrap();
        assert_eq!(list.title, "Groceries");
        assert_eq!(texts(&list.items), vec!["Milk", "Bread"]);
        assert_eq!(list.items[0].sub_items.len(), 1);
        assert_eq!(list.items[0].sub_items[0].text, "2%");
        assert_eq!(list.items[0].sub_items[0].parent_id.as_deref(), Some(milk.as_str()));
        assert!(list.items[1].sub_items.is_empty());
    }

    #[test]
    fn test_edit_twice_keeps_one_item() {
        let (mut cat, id) = fresh();
        let mut engine = cat.open(&id).unwrap();
        engine.add_item("a").unwrap();
        let b = engine.add_item("b").unwrap().unwrap();
        engine.add_item("c").unwrap();

        assert!(engine.edit_item(&b, "X").unwrap());
        assert!(engine.edit_item(&b, "Y").unwrap());
        assert_eq!(texts(engine.items()), vec!["a", "Y", "c"]);
        assert_eq!(engine.items().iter().filter(|i| i.id == b).count(), 1);
    }

    #[test]
    fn test_edit_sub_item_through_engine() {
        let (mut cat, id) = fresh();
        let mut engine = cat.open(&id).unwrap();
        let milk = engine.add_item("Milk").unwrap().unwrap();
        let sub = engine.add_sub_item(&milk, "2%").unwrap().unwrap();
        assert!(engine.edit_item(&sub, "Skim").unwrap());
        assert_eq!(engine.items()[0].sub_items[0].text, "Skim");
    }

    #[test]
    fn test_delete_top_level_with_sub_items() {
        let (mut cat, id) = fresh();
        let mut engine = cat.open(&id).unwrap();
        let a = engine.add_item("a").unwrap().unwrap();
        engine.add_sub_item(&a, "a1").unwrap();
        engine.add_item("b").unwrap();
        engine.add_item("c").unwrap();

        assert!(engine.delete_item(&a, false).unwrap());
        assert_eq!(texts(engine.items()), vec!["b", "c"]);
        assert!(!engine.delete_item(&a, false).unwrap());
    }

    #[test]
    fn test_move_then_promote() {
        let (mut cat, id) = fresh();
        let mut engine = cat.open(&id).unwrap();
        let a = engine.add_item("A").unwrap().unwrap();
        let b = engine.add_item("B").unwrap().unwrap();
        let s = engine.add_sub_item(&a, "s").unwrap().unwrap();

        assert!(engine.move_sub_item(&s, Some(&b)).unwrap());
        assert!(engine.items()[0].sub_items.is_empty());
        assert_eq!(engine.items()[1].sub_items.len(), 1);
        assert_eq!(engine.items()[1].sub_items[0].id, s);
        assert_eq!(engine.items()[1].sub_items[0].text, "s");

        assert!(engine.promote_sub_item(&s).unwrap());
        assert!(engine.items().iter().all(|i| i.sub_items.iter().all(|x| x.id != s)));
        let last = engine.items().last().unwrap();
        assert_eq!(last.id, s);
        assert_eq!(last.text, "s");
        drop(engine);

        // The promoted entry is stored without a parent
        let raw = cat.raw_items(&id).unwrap().unwrap();
        let stored: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(stored[2].get("parentId").is_none());
    }

    #[test]
    fn test_move_to_unknown_parent_keeps_tree() {
        let (mut cat, id) = fresh();
        let mut engine = cat.open(&id).unwrap();
        let a = engine.add_item("A").unwrap().unwrap();
        let s = engine.add_sub_item(&a, "s").unwrap().unwrap();
        let before = engine.list().clone();

        assert!(!engine.move_sub_item(&s, Some("no-such-item")).unwrap());
        assert!(!engine.move_sub_item(&s, None).unwrap());
        assert_eq!(engine.list(), &before);
    }

    #[test]
    fn test_reorder_through_engine() {
        let (mut cat, id) = fresh();
        let mut engine = cat.open(&id).unwrap();
        engine.add_item("a").unwrap();
        let b = engine.add_item("b").unwrap().unwrap();
        assert!(engine.reorder_item(&b, &InsertPosition::Top).unwrap());
        drop(engine);
        assert_eq!(texts(&cat.load_list(&id).unwrap().items), vec!["b", "a"]);
    }

    #[test]
    fn test_failed_write_leaves_session_unchanged() {
        let store = MemoryStore::with_quota(120);
        let mut engine = ListEngine::open(store, "1", "Untitled").unwrap();
        engine.add_item("fits").unwrap().unwrap();
        let before = engine.list().clone();

        let err = engine.add_item(&"x".repeat(200)).unwrap_err();
        assert!(matches!(
            err,
            ListError::Storage(StorageError::QuotaExceeded { .. })
        ));
        assert_eq!(engine.list(), &before);
    }

    #[test]
    fn test_lists_do_not_share_items() {
        let mut cat = Catalog::new(MemoryStore::new());
        let a = cat.create_list("A").unwrap();
        let b = cat.create_list("B").unwrap();
        cat.open(&b).unwrap().add_item("only in B").unwrap();
        let b_before = cat.raw_items(&b).unwrap();

        let mut engine = cat.open(&a).unwrap();
        let x = engine.add_item("x").unwrap().unwrap();
        engine.add_sub_item(&x, "y").unwrap();
        engine.delete_item(&x, false).unwrap();
        drop(engine);

        assert_eq!(cat.raw_items(&b).unwrap(), b_before);
        assert_eq!(texts(&cat.load_list(&b).unwrap().items), vec!["only in B"]);
    }
}
