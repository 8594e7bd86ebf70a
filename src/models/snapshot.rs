//! Dashboard snapshot (`GET /api/dashboard-stat`)

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use super::{ActivityLog, BorrowRecord, CalibrationLog, EquipmentItem, MaintenanceRecord, StorageRow};

/// Every table the dashboard derives from, fetched in one request.
///
/// A table missing from the response stays `None` so the matching
/// dashboard section can fall back to its empty state. The backend reports
/// a failed table query as an object in place of the list; that table is
/// treated as missing too. Rows that do not decode are skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawSnapshot")]
pub struct DashboardSnapshot {
    #[serde(rename = "log_lab_equipment_master", default)]
    pub equipment: Option<Vec<EquipmentItem>>,
    #[serde(rename = "log_lab_borrow_records", default)]
    pub borrows: Option<Vec<BorrowRecord>>,
    #[serde(rename = "log_lab_maintenance_records", default)]
    pub maintenance: Option<Vec<MaintenanceRecord>>,
    #[serde(rename = "log_lab_calibration_logs", default)]
    pub calibrations: Option<Vec<CalibrationLog>>,
    #[serde(rename = "log_lab_activity_logs", default)]
    pub activity: Option<Vec<ActivityLog>>,
    #[serde(rename = "log_lab_storage", default)]
    pub storage: Option<Vec<StorageRow>>,
}

impl DashboardSnapshot {
    pub fn equipment(&self) -> &[EquipmentItem] {
        self.equipment.as_deref().unwrap_or(&[])
    }

    pub fn borrows(&self) -> &[BorrowRecord] {
        self.borrows.as_deref().unwrap_or(&[])
    }

    pub fn maintenance(&self) -> &[MaintenanceRecord] {
        self.maintenance.as_deref().unwrap_or(&[])
    }
}

#[derive(Deserialize)]
struct RawSnapshot {
    #[serde(default)]
    log_lab_equipment_master: Option<Value>,
    #[serde(default)]
    log_lab_borrow_records: Option<Value>,
    #[serde(default)]
    log_lab_maintenance_records: Option<Value>,
    #[serde(default)]
    log_lab_calibration_logs: Option<Value>,
    #[serde(default)]
    log_lab_activity_logs: Option<Value>,
    #[serde(default)]
    log_lab_storage: Option<Value>,
}

impl From<RawSnapshot> for DashboardSnapshot {
    fn from(raw: RawSnapshot) -> Self {
        Self {
            equipment: decode_table("log_lab_equipment_master", raw.log_lab_equipment_master),
            borrows: decode_table("log_lab_borrow_records", raw.log_lab_borrow_records),
            maintenance: decode_table("log_lab_maintenance_records", raw.log_lab_maintenance_records),
            calibrations: decode_table("log_lab_calibration_logs", raw.log_lab_calibration_logs),
            activity: decode_table("log_lab_activity_logs", raw.log_lab_activity_logs),
            storage: decode_table("log_lab_storage", raw.log_lab_storage),
        }
    }
}

fn decode_table<T: DeserializeOwned>(name: &str, raw: Option<Value>) -> Option<Vec<T>> {
    match raw? {
        Value::Array(rows) => Some(
            rows.into_iter()
                .enumerate()
                .filter_map(|(position, row)| match serde_json::from_value(row) {
                    Ok(row) => Some(row),
                    Err(e) => {
                        tracing::warn!("Skipping row {} of {}: {}", position, name, e);
                        None
                    }
                })
                .collect(),
        ),
        other => {
            tracing::warn!("Table {} is not a list, showing it as empty: {}", name, other);
            None
        }
    }
}
