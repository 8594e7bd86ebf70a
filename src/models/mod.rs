//! Data models mirroring the lab management API

pub mod borrow;
pub mod equipment;
pub mod instruction;
pub mod maintenance;
pub mod session;
pub mod snapshot;

// Re-export commonly used types
pub use borrow::{BorrowReceipt, BorrowRecord, BorrowRequest, ReturnRequest};
pub use equipment::{EquipmentItem, EquipmentStatus, NewEquipment};
pub use instruction::{EquipmentNote, Instruction, InstructionSummary, NewNote};
pub use maintenance::{ActivityLog, CalibrationLog, MaintenanceRecord, StorageRow};
pub use session::{AuthResponse, LoginRequest, RegisterRequest, Session, SessionUser};
pub use snapshot::DashboardSnapshot;

/// `Some(s)` when `s` has non-whitespace content
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}
