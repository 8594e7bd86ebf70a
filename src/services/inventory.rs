//! Equipment browsing, item creation, borrowing and returns

use chrono::Local;
use serde::Serialize;
use serde_json::Value;

use crate::{
    browser::{self, Suggestion},
    client::ApiClient,
    error::AppResult,
    forms::{AddItemForm, BorrowForm, NoteForm, ReturnForm},
    models::{
        BorrowReceipt, EquipmentItem, EquipmentNote, EquipmentStatus, InstructionSummary, Session,
    },
};

/// One equipment record with its notes and instructions
#[derive(Debug, Clone, Serialize)]
pub struct EquipmentDetail {
    pub item: EquipmentItem,
    pub notes: Vec<EquipmentNote>,
    pub instructions: Vec<InstructionSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EquipmentPage {
    pub query: String,
    /// Items known to the backend, before filtering
    pub total: usize,
    pub items: Vec<EquipmentItem>,
    pub selected: Option<EquipmentDetail>,
}

/// What the add-item page needs to render its form
#[derive(Debug, Clone, Serialize)]
pub struct AddItemPage {
    pub statuses: Vec<&'static str>,
    pub default_status: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct BorrowPage {
    pub user_id: Option<i64>,
    pub borrower_name: Option<String>,
    pub today: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionOutcome {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<Value>,
}

#[derive(Clone)]
pub struct InventoryService {
    client: ApiClient,
}

impl InventoryService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Equipment list filtered by `query`, with the selected item's detail.
    /// Notes and instructions that fail to load are shown as empty.
    pub async fn equipment_page(&self, query: &str, item_id: Option<i64>) -> AppResult<EquipmentPage> {
        let items = self.client.list_items(None).await?;
        let visible = browser::filter_items(&items, query);

        let selected = match browser::select_item(&visible, item_id) {
            Some(item) => Some(self.detail_for(item.clone()).await),
            None => None,
        };

        Ok(EquipmentPage {
            query: query.trim().to_string(),
            total: items.len(),
            items: visible.into_iter().cloned().collect(),
            selected,
        })
    }

    pub async fn item_detail(&self, id: i64) -> AppResult<EquipmentDetail> {
        let item = self.client.get_item(id).await?;
        Ok(self.detail_for(item).await)
    }

    async fn detail_for(&self, item: EquipmentItem) -> EquipmentDetail {
        let (notes, instructions) = tokio::join!(
            self.client.list_notes(item.id),
            self.client.list_instructions(item.id)
        );

        let notes = notes.unwrap_or_else(|e| {
            tracing::warn!("Notes for item {} unavailable: {}", item.id, e);
            Vec::new()
        });
        let instructions = instructions.unwrap_or_else(|e| {
            tracing::warn!("Instructions for item {} unavailable: {}", item.id, e);
            Vec::new()
        });

        EquipmentDetail {
            item,
            notes,
            instructions,
        }
    }

    pub fn add_item_page(&self) -> AddItemPage {
        AddItemPage {
            statuses: EquipmentStatus::ALL.iter().map(|s| s.as_str()).collect(),
            default_status: EquipmentStatus::default().as_str(),
        }
    }

    /// Validates locally before anything is sent
    pub async fn add_item(&self, form: AddItemForm) -> AppResult<ActionOutcome> {
        let payload = form.into_payload()?;
        let created = self.client.create_item(&payload).await?;
        tracing::info!("Created equipment {}", payload.sku);
        Ok(ActionOutcome {
            message: format!("Item {} created.", payload.sku),
            record: Some(created),
        })
    }

    pub fn borrow_page(&self, session: &Session) -> BorrowPage {
        BorrowPage {
            user_id: session.user_id(),
            borrower_name: session.borrower_name(),
            today: crate::dates::ymd(Local::now().date_naive()),
        }
    }

    pub async fn borrow(&self, form: BorrowForm, session: &Session) -> AppResult<ActionOutcome> {
        let request = form.into_request(session)?;
        let receipt: BorrowReceipt = self.client.borrow(&request).await?;

        let describe = |id: Option<i64>| id.map(|id| id.to_string()).unwrap_or_else(|| "?".to_string());
        Ok(ActionOutcome {
            message: format!(
                "Borrowed record #{} (item {})",
                describe(receipt.id),
                describe(receipt.item_id)
            ),
            record: serde_json::to_value(&receipt).ok(),
        })
    }

    pub async fn return_item(&self, form: ReturnForm, session: &Session) -> AppResult<ActionOutcome> {
        let request = form.into_request(session, Local::now().date_naive())?;
        let response = self.client.return_item(&request).await?;
        Ok(ActionOutcome {
            message: "Return completed.".to_string(),
            record: Some(response),
        })
    }

    /// Borrow-form autocomplete, drawn from the dashboard snapshot's
    /// equipment table. An unavailable snapshot yields no suggestions.
    pub async fn suggestions(&self, query: &str) -> Vec<Suggestion> {
        match self.client.dashboard_stat().await {
            Ok(snapshot) => browser::suggest(snapshot.equipment(), query),
            Err(e) => {
                tracing::warn!("Suggestions unavailable: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn add_note(&self, item_id: i64, form: NoteForm) -> AppResult<ActionOutcome> {
        let note = form.into_request(item_id)?;
        let response = self.client.add_note(&note).await?;
        Ok(ActionOutcome {
            message: "Note added.".to_string(),
            record: Some(response),
        })
    }
}
