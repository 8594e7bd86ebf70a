//! Usage instructions and equipment notes

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, PickFirst};

/// Full instruction document (`GET /api/instructions/:id`)
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub id: i64,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub item_id: i64,
    #[serde(default)]
    pub title: String,
    /// Markdown source
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Instruction list entry (`GET /api/instructions?item_id=`), newest first
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstructionSummary {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub id: i64,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub item_id: Option<i64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EquipmentNote {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub id: i64,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub item_id: Option<i64>,
    #[serde(default)]
    pub note_text: String,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Create note request (`POST /api/equipment-notes`)
#[derive(Debug, Clone, Serialize)]
pub struct NewNote {
    pub item_id: i64,
    pub note_text: String,
}
