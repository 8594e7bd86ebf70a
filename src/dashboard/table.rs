//! Sortable dashboard tables

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dates::parse_timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }

    /// Value for the header's `aria-sort` attribute
    pub fn aria(self) -> &'static str {
        match self {
            SortDirection::Asc => "ascending",
            SortDirection::Desc => "descending",
        }
    }
}

/// Active sort column of one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub key: String,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            key: "id".to_string(),
            direction: SortDirection::Desc,
        }
    }
}

impl SortState {
    /// Header click: the active descending column flips to ascending,
    /// anything else sorts descending by `key`.
    pub fn toggle(&self, key: &str) -> SortState {
        let direction = if self.key == key && self.direction == SortDirection::Desc {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        };
        SortState {
            key: key.to_string(),
            direction,
        }
    }
}

/// One table cell as seen by the comparator
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Missing,
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn from_json(value: Option<&Value>) -> Cell {
        match value {
            None | Some(Value::Null) => Cell::Missing,
            Some(Value::Number(n)) => n.as_f64().map(Cell::Number).unwrap_or(Cell::Missing),
            Some(Value::String(s)) => Cell::Text(s.clone()),
            Some(Value::Bool(b)) => Cell::Text(b.to_string()),
            Some(other) => Cell::Text(other.to_string()),
        }
    }

    fn text(&self) -> String {
        match self {
            Cell::Missing => String::new(),
            Cell::Number(n) => n.to_string(),
            Cell::Text(s) => s.clone(),
        }
    }

    /// Numeric reading used when a number meets a string; blank reads as 0
    fn numeric(&self) -> Option<f64> {
        match self {
            Cell::Missing => Some(0.0),
            Cell::Number(n) => Some(*n),
            Cell::Text(s) if s.trim().is_empty() => Some(0.0),
            Cell::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Compare two cells in ascending order.
///
/// Two date-like strings compare as timestamps. Otherwise missing values
/// read as the empty string, numbers compare numerically and strings
/// lexicographically. This is not a strict total order when a column
/// mixes dates and free text.
pub fn compare_cells(a: &Cell, b: &Cell) -> Ordering {
    if let (Cell::Text(at), Cell::Text(bt)) = (a, b) {
        if let (Some(ad), Some(bd)) = (parse_timestamp(at), parse_timestamp(bt)) {
            return ad.cmp(&bd);
        }
    }

    match (a, b) {
        (Cell::Number(x), Cell::Number(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (Cell::Number(_), _) | (_, Cell::Number(_)) => match (a.numeric(), b.numeric()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => a.text().cmp(&b.text()),
        },
        _ => a.text().cmp(&b.text()),
    }
}

/// Sort serializable rows by `sort.key`, keeping input order for equal keys
pub fn sort_rows<T: Serialize>(rows: &[T], sort: &SortState) -> Vec<Value> {
    let mut keyed: Vec<(Cell, Value)> = rows
        .iter()
        .map(|row| {
            let value = serde_json::to_value(row).unwrap_or(Value::Null);
            (Cell::from_json(value.get(&sort.key)), value)
        })
        .collect();

    keyed.sort_by(|(a, _), (b, _)| sort.direction.apply(compare_cells(a, b)));
    keyed.into_iter().map(|(_, value)| value).collect()
}
