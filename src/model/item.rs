use serde::{Deserialize, Serialize};

/// An entry directly under a list. Owns its sub-items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopLevelItem {
    /// Unique within the owning list
    pub id: String,
    pub text: String,
    /// Sub-items in display order
    #[serde(default)]
    pub sub_items: Vec<SubItem>,
}

impl TopLevelItem {
    pub fn new(id: String, text: String) -> Self {
        TopLevelItem {
            id,
            text,
            sub_items: Vec::new(),
        }
    }
}

/// A leaf entry owned by exactly one top-level item.
///
/// Sub-items carry no children field, so a list can never grow deeper than
/// two levels. On disk they keep the same record shape as top-level items
/// (an always-empty `subItems` array) so stored lists stay readable by older
/// clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredSubItem", into = "StoredSubItem")]
pub struct SubItem {
    pub id: String,
    pub text: String,
    /// Id of the item this entry was created under. Informational only:
    /// ownership is always derived from containment.
    pub parent_id: Option<String>,
}

impl SubItem {
    pub fn new(id: String, text: String, parent_id: &str) -> Self {
        SubItem {
            id,
            text,
            parent_id: Some(parent_id.to_string()),
        }
    }
}

/// Promotion: the sub-item keeps its id and text and forgets its parent.
impl From<SubItem> for TopLevelItem {
    fn from(sub: SubItem) -> Self {
        TopLevelItem::new(sub.id, sub.text)
    }
}

/// A stored sub-item had children of its own.
#[derive(Debug, thiserror::Error)]
#[error("sub-item {0} has nested sub-items; lists are only two levels deep")]
pub struct NestedSubItems(pub String);

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSubItem {
    id: String,
    text: String,
    #[serde(default)]
    sub_items: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_id: Option<String>,
}

impl TryFrom<StoredSubItem> for SubItem {
    type Error = NestedSubItems;

    fn try_from(stored: StoredSubItem) -> Result<Self, Self::Error> {
        if !stored.sub_items.is_empty() {
            return Err(NestedSubItems(stored.id));
        }
        Ok(SubItem {
            id: stored.id,
            text: stored.text,
            parent_id: stored.parent_id,
        })
    }
}

impl From<SubItem> for StoredSubItem {
    fn from(sub: SubItem) -> Self {
        StoredSubItem {
            id: sub.id,
            text: sub.text,
            sub_items: Vec::new(),
            parent_id: sub.parent_id,
        }
    }
}
