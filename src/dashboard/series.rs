//! Chart-ready series: utilization over time, category roll-up, low stock.

use chrono::{DateTime, Duration, TimeZone, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use crate::dates::{parse_field, start_of_day, ymd};
use crate::models::{BorrowRecord, EquipmentItem};

/// Label used for equipment without a category
pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedSeries {
    pub name: String,
    pub data: Vec<i64>,
}

/// X-axis categories and one or more series aligned with them by index
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSeries {
    pub categories: Vec<String>,
    pub series: Vec<NamedSeries>,
}

impl ChartSeries {
    fn named(categories: Vec<String>, series: Vec<(&str, Vec<i64>)>) -> Self {
        Self {
            categories,
            series: series
                .into_iter()
                .map(|(name, data)| NamedSeries {
                    name: name.to_string(),
                    data,
                })
                .collect(),
        }
    }
}

/// Closed-open borrow interval `[start, end)` carrying its unit count
struct Interval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    units: i64,
}

impl Interval {
    fn from_record(record: &BorrowRecord, now: DateTime<Utc>) -> Option<Self> {
        let start = parse_field(record.borrow_date.as_ref())?;
        let end = if record.is_outstanding() {
            now
        } else {
            // an unreadable return date never contains any instant
            parse_field(record.actual_return_date.as_ref())?
        };
        Some(Self {
            start,
            end,
            units: record.units(),
        })
    }

    fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// Percentage of equipment on loan, sampled at local midnight of each of
/// the last `days` calendar days (oldest first).
///
/// Each day is one point-in-time sample: a borrow that starts and ends
/// between two midnights is not counted on any day.
pub fn utilization<Tz: TimeZone>(
    equipment: &[EquipmentItem],
    borrows: &[BorrowRecord],
    days: u32,
    now: &DateTime<Tz>,
) -> ChartSeries {
    let now_utc = now.with_timezone(&Utc);
    let total = equipment.len().max(1) as f64;
    let intervals: Vec<Interval> = borrows
        .iter()
        .filter_map(|r| Interval::from_record(r, now_utc))
        .collect();

    let tz = now.timezone();
    let today = now.date_naive();
    let mut categories = Vec::with_capacity(days as usize);
    let mut values = Vec::with_capacity(days as usize);

    for offset in (0..days).rev() {
        let date = today - Duration::days(i64::from(offset));
        let Some(sample) = start_of_day(&tz, date) else {
            continue;
        };
        let sample = sample.with_timezone(&Utc);

        let on_loan: i64 = intervals
            .iter()
            .filter(|interval| interval.contains(sample))
            .map(|interval| interval.units)
            .sum();
        let percent = (on_loan as f64 / total * 100.0).round().clamp(0.0, 100.0) as i64;

        categories.push(ymd(date));
        values.push(percent);
    }

    ChartSeries::named(categories, vec![("Utilization", values)])
}

#[derive(Default)]
struct CategoryTotals {
    available: i64,
    in_use: i64,
    total: i64,
}

/// Available vs in-use units per category, largest categories first.
/// Categories with equal totals keep their first-seen order.
pub fn category_rollup(equipment: &[EquipmentItem]) -> ChartSeries {
    let mut by_category: IndexMap<String, CategoryTotals> = IndexMap::new();

    for item in equipment {
        let category = item
            .category
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(UNCATEGORIZED)
            .to_string();
        let totals = by_category.entry(category).or_default();
        totals.available += item.available();
        totals.in_use += item.in_use();
        totals.total += item.quantity();
    }

    by_category.sort_by(|_, a, _, b| b.total.cmp(&a.total));

    let categories = by_category.keys().cloned().collect();
    let available = by_category.values().map(|t| t.available).collect();
    let in_use = by_category.values().map(|t| t.in_use).collect();

    ChartSeries::named(categories, vec![("Available", available), ("In use", in_use)])
}

/// The `limit` items with the fewest available units, ascending.
/// Ties keep input order.
pub fn low_stock(equipment: &[EquipmentItem], limit: usize) -> ChartSeries {
    let mut ranked: Vec<&EquipmentItem> = equipment.iter().collect();
    ranked.sort_by_key(|item| item.available());
    ranked.truncate(limit);

    ChartSeries::named(
        ranked.iter().map(|item| item.label()).collect(),
        vec![
            ("Available", ranked.iter().map(|item| item.available()).collect()),
            ("Total", ranked.iter().map(|item| item.quantity()).collect()),
        ],
    )
}
