//! Scalar KPIs shown at the top of the dashboard

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{BorrowRecord, EquipmentItem, MaintenanceRecord};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Kpis {
    /// Equipment rows
    pub total: usize,
    /// Equipment rows with at least one unit on the shelf
    pub available: usize,
    /// Outstanding borrow records not flagged as returned
    pub borrowed: usize,
    pub overdue: usize,
    pub maintenance_open: usize,
    /// `borrowed / total` as a rounded percentage, 0 without equipment
    pub utilization: u32,
}

pub fn compute(
    equipment: &[EquipmentItem],
    borrows: &[BorrowRecord],
    maintenance: &[MaintenanceRecord],
    now: DateTime<Utc>,
) -> Kpis {
    let total = equipment.len();
    let available = equipment.iter().filter(|e| e.available() > 0).count();
    let borrowed = borrows.iter().filter(|r| r.is_active()).count();
    let overdue = borrows.iter().filter(|r| r.is_overdue(now)).count();
    let maintenance_open = maintenance.iter().filter(|m| m.is_open()).count();

    let utilization = if total == 0 {
        0
    } else {
        (borrowed as f64 / total as f64 * 100.0).round() as u32
    };

    Kpis {
        total,
        available,
        borrowed,
        overdue,
        maintenance_open,
        utilization,
    }
}
