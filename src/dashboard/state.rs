//! Dashboard lifecycle as a pure reducer

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::table::SortState;
use crate::models::DashboardSnapshot;

/// The six tables rendered below the charts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardTable {
    Equipment,
    Borrows,
    Calibrations,
    Maintenance,
    Activity,
    Storage,
}

impl DashboardTable {
    pub const ALL: [DashboardTable; 6] = [
        DashboardTable::Equipment,
        DashboardTable::Borrows,
        DashboardTable::Calibrations,
        DashboardTable::Maintenance,
        DashboardTable::Activity,
        DashboardTable::Storage,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            DashboardTable::Equipment => "Equipment",
            DashboardTable::Borrows => "Borrow records",
            DashboardTable::Calibrations => "Calibration logs",
            DashboardTable::Maintenance => "Maintenance",
            DashboardTable::Activity => "Activity",
            DashboardTable::Storage => "Storage",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadPhase {
    Loading,
    Failed(String),
    Ready(Arc<DashboardSnapshot>),
}

/// Load results carry the generation of the refresh that produced them so
/// a slow, older fetch never replaces a newer one.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardAction {
    Loaded {
        generation: u64,
        snapshot: Arc<DashboardSnapshot>,
    },
    LoadFailed {
        generation: u64,
        message: String,
    },
    SortBy { table: DashboardTable, key: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    pub phase: LoadPhase,
    generation: u64,
    sorts: HashMap<DashboardTable, SortState>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            phase: LoadPhase::Loading,
            generation: 0,
            sorts: HashMap::new(),
        }
    }
}

impl DashboardState {
    pub fn reduce(self, action: DashboardAction) -> Self {
        let DashboardState {
            phase,
            generation,
            mut sorts,
        } = self;
        let (phase, generation) = match action {
            DashboardAction::Loaded {
                generation: loaded,
                snapshot,
            } if loaded >= generation => (LoadPhase::Ready(snapshot), loaded),
            DashboardAction::LoadFailed {
                generation: failed,
                message,
            } if failed >= generation => (LoadPhase::Failed(message), failed),
            DashboardAction::Loaded { generation: stale, .. }
            | DashboardAction::LoadFailed { generation: stale, .. } => {
                tracing::debug!("Dropping dashboard load #{} (showing #{})", stale, generation);
                (phase, generation)
            }
            DashboardAction::SortBy { table, key } => {
                let next = sorts.get(&table).cloned().unwrap_or_default().toggle(&key);
                sorts.insert(table, next);
                (phase, generation)
            }
        };
        DashboardState {
            phase,
            generation,
            sorts,
        }
    }

    /// Same sort columns, different load outcome
    pub fn with_phase(&self, phase: LoadPhase) -> Self {
        Self {
            phase,
            generation: self.generation,
            sorts: self.sorts.clone(),
        }
    }

    pub fn sort_for(&self, table: DashboardTable) -> SortState {
        self.sorts.get(&table).cloned().unwrap_or_default()
    }
}
