//! Maintenance, calibration, activity and storage records

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, PickFirst};

use super::non_blank;

/// Maintenance ticket (`log_lab_maintenance_records`)
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub id: i64,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub item_id: Option<i64>,
    #[serde(default)]
    pub reported_by: Option<String>,
    #[serde(default)]
    pub date_reported: Option<String>,
    /// Null while the ticket is open
    #[serde(default)]
    pub date_fixed: Option<String>,
    #[serde(default)]
    pub action_taken: Option<String>,
}

impl MaintenanceRecord {
    pub fn is_open(&self) -> bool {
        non_blank(self.date_fixed.as_deref()).is_none()
    }
}

/// Calibration entry (`log_lab_calibration_logs`)
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalibrationLog {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub id: i64,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub item_id: Option<i64>,
    #[serde(default)]
    pub calibrated_by: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub next_due_date: Option<String>,
    #[serde(default)]
    pub cert_file: Option<String>,
}

/// Audit trail entry (`log_lab_activity_logs`)
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityLog {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub id: i64,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Stock location entry (`log_lab_storage`)
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageRow {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub id: i64,
    #[serde(default)]
    pub code_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub info: Option<String>,
}
