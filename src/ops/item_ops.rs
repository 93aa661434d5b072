use crate::model::item::{SubItem, TopLevelItem};

/// Where to put an entry when reordering within its sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertPosition {
    /// First in the sequence
    Top,
    /// Last in the sequence
    Bottom,
    /// Directly after the sibling with this id
    After(String),
}

/// Where an id was found in a list's tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    TopLevel(usize),
    Sub { parent: usize, index: usize },
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// Find an id among top-level items first, then among each top-level item's
/// sub-items in stored order. First match wins.
pub fn locate(items: &[TopLevelItem], id: &str) -> Option<Location> {
    if let Some(idx) = items.iter().position(|i| i.id == id) {
        return Some(Location::TopLevel(idx));
    }
    find_sub_item(items, id).map(|(parent, index)| Location::Sub { parent, index })
}

/// Whether `id` is used anywhere in the tree (either level)
pub fn contains_id(items: &[TopLevelItem], id: &str) -> bool {
    locate(items, id).is_some()
}

fn find_sub_item(items: &[TopLevelItem], sub_id: &str) -> Option<(usize, usize)> {
    items.iter().enumerate().find_map(|(p, item)| {
        item.sub_items
            .iter()
            .position(|s| s.id == sub_id)
            .map(|i| (p, i))
    })
}

/// Remove the first sub-item with `sub_id`, scanning parents in order.
fn take_sub_item(items: &mut [TopLevelItem], sub_id: &str) -> Option<SubItem> {
    let (parent, index) = find_sub_item(items, sub_id)?;
    Some(items[parent].sub_items.remove(index))
}

// ---------------------------------------------------------------------------
// Create / edit / delete
// ---------------------------------------------------------------------------

/// Append a top-level item. Blank text is a no-op; non-blank text is stored
/// exactly as given.
pub fn add_item(items: &mut Vec<TopLevelItem>, id: String, text: &str) -> bool {
    if text.trim().is_empty() {
        return false;
    }
    items.push(TopLevelItem::new(id, text.to_string()));
    true
}

/// Append a sub-item under `parent_id`. No-op on blank text or unknown parent.
pub fn add_sub_item(items: &mut [TopLevelItem], parent_id: &str, id: String, text: &str) -> bool {
    if text.trim().is_empty() {
        return false;
    }
    let Some(parent) = items.iter_mut().find(|i| i.id == parent_id) else {
        return false;
    };
    parent
        .sub_items
        .push(SubItem::new(id, text.to_string(), parent_id));
    true
}

/// Replace the text of the item or sub-item with `id`, in place.
pub fn edit_item(items: &mut [TopLevelItem], id: &str, text: &str) -> bool {
    match locate(items, id) {
        Some(Location::TopLevel(idx)) => {
            items[idx].text = text.to_string();
            true
        }
        Some(Location::Sub { parent, index }) => {
            items[parent].sub_items[index].text = text.to_string();
            true
        }
        None => false,
    }
}

/// Delete a top-level item (with its sub-items), or every sub-item with
/// `id` across all parents when `is_sub_item` is set.
pub fn delete_item(items: &mut Vec<TopLevelItem>, id: &str, is_sub_item: bool) -> bool {
    if is_sub_item {
        let mut removed = false;
        for item in items.iter_mut() {
            let before = item.sub_items.len();
            item.sub_items.retain(|s| s.id != id);
            removed |= item.sub_items.len() != before;
        }
        removed
    } else {
        let before = items.len();
        items.retain(|i| i.id != id);
        items.len() != before
    }
}

// ---------------------------------------------------------------------------
// Structural moves
// ---------------------------------------------------------------------------

/// Move a sub-item to the end of another top-level item's sub-items.
///
/// No-op when the sub-item is not found, when no new parent is given, or
/// when the new parent does not exist (the sub-item stays where it was).
/// The recorded `parent_id` is carried over unchanged.
pub fn move_sub_item(items: &mut [TopLevelItem], sub_id: &str, new_parent_id: Option<&str>) -> bool {
    let Some(new_parent_id) = new_parent_id else {
        return false;
    };
    let Some(target) = items.iter().position(|i| i.id == new_parent_id) else {
        return false;
    };
    let Some(sub) = take_sub_item(items, sub_id) else {
        return false;
    };
    items[target].sub_items.push(sub);
    true
}

/// Detach a sub-item from its parent and append it as a top-level item.
pub fn promote_sub_item(items: &mut Vec<TopLevelItem>, sub_id: &str) -> bool {
    let Some(sub) = take_sub_item(items, sub_id) else {
        return false;
    };
    items.push(TopLevelItem::from(sub));
    true
}

/// Reposition a top-level item among the top-level items.
pub fn reorder_item(items: &mut Vec<TopLevelItem>, id: &str, position: &InsertPosition) -> bool {
    reposition(items, id, position, |i| i.id.as_str())
}

/// Reposition a sub-item among its current siblings.
pub fn reorder_sub_item(items: &mut [TopLevelItem], sub_id: &str, position: &InsertPosition) -> bool {
    let Some((parent, _)) = find_sub_item(items, sub_id) else {
        return false;
    };
    reposition(&mut items[parent].sub_items, sub_id, position, |s| s.id.as_str())
}

/// Move the element with `id` to `position`. Returns false when nothing
/// changed: unknown id, unknown or self anchor, or already in place.
fn reposition<T>(
    seq: &mut Vec<T>,
    id: &str,
    position: &InsertPosition,
    id_of: impl Fn(&T) -> &str,
) -> bool {
    let Some(from) = seq.iter().position(|t| id_of(t) == id) else {
        return false;
    };
    if let InsertPosition::After(anchor) = position
        && (anchor == id || !seq.iter().any(|t| id_of(t) == anchor))
    {
        return false;
    }

    let elem = seq.remove(from);
    let to = match position {
        InsertPosition::Top => 0,
        InsertPosition::Bottom => seq.len(),
        InsertPosition::After(anchor) => seq
            .iter()
            .position(|t| id_of(t) == anchor)
            .map_or(seq.len(), |i| i + 1),
    };
    seq.insert(to, elem);
    to != from
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
