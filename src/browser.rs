//! Equipment browsing: search, selection and borrow-form suggestions

use serde::Serialize;

use crate::models::EquipmentItem;

/// Maximum number of autocomplete entries
pub const SUGGESTION_LIMIT: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub id: i64,
    pub sku: String,
    pub name: String,
    pub available: i64,
}

impl From<&EquipmentItem> for Suggestion {
    fn from(item: &EquipmentItem) -> Self {
        Self {
            id: item.id,
            sku: item.sku_str().to_string(),
            name: item.name_str().to_string(),
            available: item.available(),
        }
    }
}

fn haystack(item: &EquipmentItem) -> String {
    [
        item.name.as_deref(),
        item.sku.as_deref(),
        item.category.as_deref(),
        item.location.as_deref(),
        item.status.as_deref(),
    ]
    .iter()
    .map(|field| field.unwrap_or(""))
    .collect::<Vec<_>>()
    .join(" ")
    .to_lowercase()
}

/// Items whose name, sku, category, location or status contains `query`
/// (case-insensitive). A blank query keeps everything.
pub fn filter_items<'a>(items: &'a [EquipmentItem], query: &str) -> Vec<&'a EquipmentItem> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return items.iter().collect();
    }
    items
        .iter()
        .filter(|item| haystack(item).contains(&needle))
        .collect()
}

pub fn suggest(items: &[EquipmentItem], query: &str) -> Vec<Suggestion> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    items
        .iter()
        .filter(|item| {
            item.sku_str().to_lowercase().contains(&needle)
                || item.name_str().to_lowercase().contains(&needle)
        })
        .take(SUGGESTION_LIMIT)
        .map(Suggestion::from)
        .collect()
}

/// The requested item when present in `items`, else the first one
pub fn select_item<'a>(items: &[&'a EquipmentItem], requested: Option<i64>) -> Option<&'a EquipmentItem> {
    requested
        .and_then(|id| items.iter().find(|item| item.id == id).copied())
        .or_else(|| items.first().copied())
}

/// Internal id of the item whose sku is exactly `sku`
pub fn resolve_sku(items: &[EquipmentItem], sku: &str) -> Option<i64> {
    let sku = sku.trim();
    if sku.is_empty() {
        return None;
    }
    items.iter().find(|item| item.sku_str() == sku).map(|item| item.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, sku: &str, name: &str, location: &str) -> EquipmentItem {
        EquipmentItem {
            id,
            sku: Some(sku.into()),
            name: Some(name.into()),
            location: Some(location.into()),
            category: Some("equipment".into()),
            status: Some("active".into()),
            ..Default::default()
        }
    }

    fn inventory() -> Vec<EquipmentItem> {
        vec![
            item(1, "OSC-1", "Oscilloscope", "Shelf A1"),
            item(2, "MM-7", "Multimeter", "Drawer 3"),
            item(3, "PSU-2", "Bench power supply", "shelf b2"),
        ]
    }

    #[test]
    fn filter_matches_any_field_case_insensitively() {
        let items = inventory();
        let ids: Vec<i64> = filter_items(&items, "SHELF").iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(filter_items(&items, "  ").len(), 3);
        assert!(filter_items(&items, "retired").is_empty());
    }

    #[test]
    fn selection_falls_back_to_first_visible_item() {
        let items = inventory();
        let visible = filter_items(&items, "");
        assert_eq!(select_item(&visible, Some(2)).map(|i| i.id), Some(2));
        assert_eq!(select_item(&visible, Some(99)).map(|i| i.id), Some(1));
        assert_eq!(select_item(&[], Some(1)), None);
    }

    #[test]
    fn suggestions_are_capped() {
        let items: Vec<_> = (1..=12).map(|id| item(id, &format!("CAB-{}", id), "Cable", "Bin")).collect();
        assert_eq!(suggest(&items, "cab").len(), SUGGESTION_LIMIT);
        assert!(suggest(&items, "").is_empty());
        assert_eq!(suggest(&inventory(), "multi")[0].sku, "MM-7");
    }

    #[test]
    fn sku_resolution_is_exact() {
        let items = inventory();
        assert_eq!(resolve_sku(&items, " MM-7\n"), Some(2));
        assert_eq!(resolve_sku(&items, "MM"), None);
        assert_eq!(resolve_sku(&items, ""), None);
    }
}
