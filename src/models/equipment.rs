//! Equipment model

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, PickFirst};

use super::non_blank;

/// Equipment master record (`log_lab_equipment_master`)
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EquipmentItem {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub id: i64,
    /// Human-facing identifier, also the payload of the item's QR code
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// Total units owned
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub quantity: Option<i64>,
    /// Units currently on the shelf
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub available_quantity: Option<i64>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub unit_cost: Option<f64>,
    #[serde(default)]
    pub supplier: Option<String>,
    /// YYYY-MM-DD
    #[serde(default)]
    pub date_purchased: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl EquipmentItem {
    pub fn quantity(&self) -> i64 {
        self.quantity.unwrap_or(0)
    }

    pub fn available(&self) -> i64 {
        self.available_quantity.unwrap_or(0)
    }

    /// Units out on loan or otherwise not on the shelf, never negative
    pub fn in_use(&self) -> i64 {
        (self.quantity() - self.available()).max(0)
    }

    /// Display label: name, then sku, then id
    pub fn label(&self) -> String {
        non_blank(self.name.as_deref())
            .or_else(|| non_blank(self.sku.as_deref()))
            .map(str::to_string)
            .unwrap_or_else(|| self.id.to_string())
    }

    pub fn sku_str(&self) -> &str {
        self.sku.as_deref().unwrap_or("")
    }

    pub fn name_str(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

/// Lifecycle status of an equipment record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquipmentStatus {
    #[default]
    Active,
    Retired,
    Maintenance,
}

impl EquipmentStatus {
    pub const ALL: [EquipmentStatus; 3] = [
        EquipmentStatus::Active,
        EquipmentStatus::Retired,
        EquipmentStatus::Maintenance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentStatus::Active => "active",
            EquipmentStatus::Retired => "retired",
            EquipmentStatus::Maintenance => "maintenance",
        }
    }
}

impl std::str::FromStr for EquipmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(EquipmentStatus::Active),
            "retired" => Ok(EquipmentStatus::Retired),
            "maintenance" => Ok(EquipmentStatus::Maintenance),
            other => Err(format!("unknown equipment status '{}'", other)),
        }
    }
}

impl std::fmt::Display for EquipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Create equipment request (`POST /api/items`)
#[derive(Debug, Clone, Serialize)]
pub struct NewEquipment {
    pub sku: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub quantity: i64,
    pub available_quantity: i64,
    pub unit_cost: f64,
    pub supplier: String,
    /// Empty when unknown
    pub date_purchased: String,
    pub status: EquipmentStatus,
}
