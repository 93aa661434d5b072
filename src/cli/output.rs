use serde::Serialize;

use crate::model::item::{SubItem, TopLevelItem};
use crate::model::list::{ListEntry, TodoList};
use crate::util::unicode::{max_width, pad_to_width};

/// Widest title column `td lists` will print before truncating
const TITLE_COLUMN_MAX: usize = 40;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct ListJson {
    pub id: String,
    pub title: String,
    pub items: Vec<ItemJson>,
}

#[derive(Serialize)]
pub struct ItemJson {
    pub id: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sub_items: Vec<ItemJson>,
}

#[derive(Serialize)]
pub struct ListEntryJson {
    pub id: String,
    pub title: String,
}

#[derive(Serialize)]
pub struct IdJson {
    pub id: String,
}

#[derive(Serialize)]
pub struct ShareJson {
    pub id: String,
    pub url: String,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn list_to_json(list: &TodoList) -> ListJson {
    ListJson {
        id: list.id.clone(),
        title: list.title.clone(),
        items: list.items.iter().map(item_to_json).collect(),
    }
}

pub fn item_to_json(item: &TopLevelItem) -> ItemJson {
    ItemJson {
        id: item.id.clone(),
        text: item.text.clone(),
        parent_id: None,
        sub_items: item.sub_items.iter().map(sub_item_to_json).collect(),
    }
}

fn sub_item_to_json(sub: &SubItem) -> ItemJson {
    ItemJson {
        id: sub.id.clone(),
        text: sub.text.clone(),
        parent_id: sub.parent_id.clone(),
        sub_items: Vec::new(),
    }
}

pub fn entry_to_json(entry: &ListEntry) -> ListEntryJson {
    ListEntryJson {
        id: entry.id.clone(),
        title: entry.title.clone(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// One line per list: title column, then id
pub fn format_list_entries(entries: &[ListEntry]) -> Vec<String> {
    let width = max_width(entries.iter().map(|e| e.title.as_str())).min(TITLE_COLUMN_MAX);
    entries
        .iter()
        .map(|e| format!("{}  {}", pad_to_width(&e.title, width), e.id))
        .collect()
}

/// A list header followed by its items, sub-items indented under their parent
pub fn format_list(list: &TodoList) -> Vec<String> {
    let mut lines = vec![format!("== {} ({}) ==", list.title, list.id)];
    if list.items.is_empty() {
        lines.push("  (empty)".to_string());
        return lines;
    }
    for item in &list.items {
        lines.push(format!("- {}  {}", item.text, item.id));
        for sub in &item.sub_items {
            lines.push(format!("    - {}  {}", sub.text, sub.id));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn groceries() -> TodoList {
        let mut milk = TopLevelItem::new("1".into(), "Milk".into());
        milk.sub_items.push(SubItem::new("11".into(), "2%".into(), "1"));
        TodoList {
            id: "100".into(),
            title: "Groceries".into(),
            items: vec![milk, TopLevelItem::new("2".into(), "Bread".into())],
        }
    }

    #[test]
    fn test_format_list_tree() {
        assert_eq!(
            format_list(&groceries()),
            vec![
                "== Groceries (100) ==",
                "- Milk  1",
                "    - 2%  11",
                "- Bread  2",
            ]
        );
    }

    #[test]
    fn test_format_empty_list() {
        let list = TodoList::empty("7", "Untitled");
        assert_eq!(format_list(&list), vec!["== Untitled (7) ==", "  (empty)"]);
    }

    #[test]
    fn test_list_entries_aligned() {
        let entries = vec![
            ListEntry {
                id: "1".into(),
                title: "Groceries".into(),
            },
            ListEntry {
                id: "2".into(),
                title: "Chores".into(),
            },
        ];
        assert_eq!(
            format_list_entries(&entries),
            vec!["Groceries  1", "Chores     2"]
        );
    }

    #[test]
    fn test_list_json_shape() {
        let json = serde_json::to_value(list_to_json(&groceries())).unwrap();
        assert_eq!(json["items"][0]["sub_items"][0]["parent_id"], "1");
        assert!(json["items"][1].get("sub_items").is_none());
        assert!(json["items"][0].get("parent_id").is_none());
    }
}
