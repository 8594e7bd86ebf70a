//! Borrow (loan) model and related request types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, PickFirst};

use super::non_blank;
use crate::dates::parse_field;

/// Borrow record (`log_lab_borrow_records`)
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BorrowRecord {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub id: i64,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub item_id: Option<i64>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub user_id: Option<i64>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub borrow_date: Option<String>,
    /// Due date
    #[serde(default)]
    pub return_date: Option<String>,
    /// Null while the loan is outstanding
    #[serde(default)]
    pub actual_return_date: Option<String>,
    #[serde(default)]
    pub condition_on_return: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl BorrowRecord {
    /// No return has been recorded
    pub fn is_outstanding(&self) -> bool {
        non_blank(self.actual_return_date.as_deref()).is_none()
    }

    /// Outstanding and not flagged as returned
    pub fn is_active(&self) -> bool {
        self.is_outstanding()
            && !self
                .status
                .as_deref()
                .unwrap_or("")
                .eq_ignore_ascii_case("returned")
    }

    /// Outstanding with a due date strictly before `now`
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.is_outstanding()
            && parse_field(self.return_date.as_ref())
                .map(|due| due < now)
                .unwrap_or(false)
    }

    /// Units borrowed; a missing or zero quantity counts as one unit
    pub fn units(&self) -> i64 {
        match self.quantity {
            Some(q) if q != 0 => q,
            _ => 1,
        }
    }
}

/// Borrow request (`POST /api/items/borrow`)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BorrowRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_id: Option<i64>,
    pub quantity: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub borrower_name: Option<String>,
}

/// Return request (`POST /api/items/return`)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReturnRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub borrow_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_on_return: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returned_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

/// Backend acknowledgement of a borrow
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BorrowReceipt {
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub id: Option<i64>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub item_id: Option<i64>,
}
