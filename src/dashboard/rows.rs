//! Table rows joined with equipment master data

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{BorrowRecord, CalibrationLog, EquipmentItem, MaintenanceRecord};

const PLACEHOLDER: &str = "-";

/// Equipment lookup by internal id
pub struct ItemIndex<'a> {
    by_id: HashMap<i64, &'a EquipmentItem>,
}

impl<'a> ItemIndex<'a> {
    pub fn new(equipment: &'a [EquipmentItem]) -> Self {
        Self {
            by_id: equipment.iter().map(|item| (item.id, item)).collect(),
        }
    }

    pub fn get(&self, id: Option<i64>) -> Option<&'a EquipmentItem> {
        id.and_then(|id| self.by_id.get(&id).copied())
    }

    /// Sku of the referenced item, `-` when unknown
    pub fn sku(&self, id: Option<i64>) -> String {
        self.get(id)
            .and_then(|item| item.sku.clone())
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    }

    /// Name of the referenced item, `-` when unknown
    pub fn name(&self, id: Option<i64>) -> String {
        self.get(id)
            .and_then(|item| item.name.clone())
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BorrowRow {
    #[serde(flatten)]
    pub record: BorrowRecord,
    pub item_sku: String,
    pub item_name: String,
    /// `OVERDUE` or empty
    pub overdue_flag: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct MaintenanceRow {
    #[serde(flatten)]
    pub record: MaintenanceRecord,
    pub item_sku: String,
    pub item_name: String,
    /// `open` or `closed`
    pub state: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalibrationRow {
    #[serde(flatten)]
    pub record: CalibrationLog,
    pub item_sku: String,
    pub item_name: String,
}

pub fn borrow_rows(
    records: &[BorrowRecord],
    index: &ItemIndex<'_>,
    now: DateTime<Utc>,
) -> Vec<BorrowRow> {
    records
        .iter()
        .map(|record| BorrowRow {
            item_sku: index.sku(record.item_id),
            item_name: index.name(record.item_id),
            overdue_flag: if record.is_overdue(now) { "OVERDUE" } else { "" },
            record: record.clone(),
        })
        .collect()
}

pub fn maintenance_rows(records: &[MaintenanceRecord], index: &ItemIndex<'_>) -> Vec<MaintenanceRow> {
    records
        .iter()
        .map(|record| MaintenanceRow {
            item_sku: index.sku(record.item_id),
            item_name: index.name(record.item_id),
            state: if record.is_open() { "open" } else { "closed" },
            record: record.clone(),
        })
        .collect()
}

pub fn calibration_rows(records: &[CalibrationLog], index: &ItemIndex<'_>) -> Vec<CalibrationRow> {
    records
        .iter()
        .map(|record| CalibrationRow {
            item_sku: index.sku(record.item_id),
            item_name: index.name(record.item_id),
            record: record.clone(),
        })
        .collect()
}
