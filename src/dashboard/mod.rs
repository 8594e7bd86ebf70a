//! Dashboard aggregation: KPIs, chart series and sortable tables derived
//! from one `/api/dashboard-stat` snapshot.

pub mod kpi;
pub mod rows;
pub mod series;
pub mod state;
pub mod table;

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::config::DashboardConfig;
use crate::models::DashboardSnapshot;

pub use kpi::Kpis;
pub use series::{ChartSeries, NamedSeries};
pub use state::{DashboardAction, DashboardState, DashboardTable, LoadPhase};
pub use table::{SortDirection, SortState};

use rows::ItemIndex;

pub const EMPTY_TABLE_MESSAGE: &str = "No data.";

#[derive(Debug, Clone, Copy)]
pub struct DashboardOptions {
    pub utilization_days: u32,
    pub low_stock_limit: usize,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            utilization_days: 30,
            low_stock_limit: 10,
        }
    }
}

impl From<&DashboardConfig> for DashboardOptions {
    fn from(config: &DashboardConfig) -> Self {
        Self {
            utilization_days: config.utilization_days,
            low_stock_limit: config.low_stock_limit,
        }
    }
}

/// What the dashboard page shows
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DashboardView {
    Loading,
    /// The load failed; nothing but the message is shown
    Error { message: String },
    Ready(Box<DashboardReport>),
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub kpis: Kpis,
    pub utilization: ChartSeries,
    pub categories: ChartSeries,
    pub low_stock: ChartSeries,
    pub tables: Vec<TableSection>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableSection {
    pub table: DashboardTable,
    pub title: &'static str,
    pub sort: SortState,
    /// `aria-sort` value for the active header
    pub aria_sort: &'static str,
    pub row_count: usize,
    pub rows: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<String>,
}

impl TableSection {
    fn build<T: Serialize>(table: DashboardTable, rows: Option<&[T]>, sort: SortState) -> Self {
        let rows = rows.map(|rows| table::sort_rows(rows, &sort)).unwrap_or_default();
        let empty_message = rows.is_empty().then(|| EMPTY_TABLE_MESSAGE.to_string());
        Self {
            table,
            title: table.title(),
            aria_sort: sort.direction.aria(),
            sort,
            row_count: rows.len(),
            rows,
            empty_message,
        }
    }
}

/// Derive the page view from the current state.
///
/// `now` fixes both the overdue cut-off and the calendar days of the
/// utilization chart; its zone decides where midnight falls.
pub fn render<Tz: TimeZone>(
    state: &DashboardState,
    now: &DateTime<Tz>,
    options: DashboardOptions,
) -> DashboardView {
    let snapshot = match &state.phase {
        LoadPhase::Loading => return DashboardView::Loading,
        LoadPhase::Failed(message) => {
            return DashboardView::Error {
                message: message.clone(),
            }
        }
        LoadPhase::Ready(snapshot) => snapshot,
    };

    let now_utc = now.with_timezone(&Utc);
    let equipment = snapshot.equipment();
    let borrows = snapshot.borrows();

    let kpis = kpi::compute(equipment, borrows, snapshot.maintenance(), now_utc);
    let utilization = series::utilization(equipment, borrows, options.utilization_days, now);
    let categories = series::category_rollup(equipment);
    let low_stock = series::low_stock(equipment, options.low_stock_limit);

    let tables = build_tables(state, snapshot, now_utc);

    DashboardView::Ready(Box::new(DashboardReport {
        kpis,
        utilization,
        categories,
        low_stock,
        tables,
    }))
}

fn build_tables(
    state: &DashboardState,
    snapshot: &DashboardSnapshot,
    now: DateTime<Utc>,
) -> Vec<TableSection> {
    let index = ItemIndex::new(snapshot.equipment());

    DashboardTable::ALL
        .iter()
        .map(|&table| {
            let sort = state.sort_for(table);
            match table {
                DashboardTable::Equipment => {
                    TableSection::build(table, snapshot.equipment.as_deref(), sort)
                }
                DashboardTable::Borrows => {
                    let rows = snapshot
                        .borrows
                        .as_deref()
                        .map(|records| rows::borrow_rows(records, &index, now));
                    TableSection::build(table, rows.as_deref(), sort)
                }
                DashboardTable::Calibrations => {
                    let rows = snapshot
                        .calibrations
                        .as_deref()
                        .map(|records| rows::calibration_rows(records, &index));
                    TableSection::build(table, rows.as_deref(), sort)
                }
                DashboardTable::Maintenance => {
                    let rows = snapshot
                        .maintenance
                        .as_deref()
                        .map(|records| rows::maintenance_rows(records, &index));
                    TableSection::build(table, rows.as_deref(), sort)
                }
                DashboardTable::Activity => {
                    TableSection::build(table, snapshot.activity.as_deref(), sort)
                }
                DashboardTable::Storage => {
                    TableSection::build(table, snapshot.storage.as_deref(), sort)
                }
            }
        })
        .collect()
}
