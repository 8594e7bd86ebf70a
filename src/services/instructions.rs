//! Instruction viewer

use serde::Serialize;

use crate::{
    client::ApiClient,
    error::AppResult,
    markdown::{render_markdown, sibling_navigation, SiblingNav},
    models::{EquipmentItem, Instruction, InstructionSummary},
};

#[derive(Debug, Clone, Serialize)]
pub struct InstructionPage {
    pub instruction: Instruction,
    /// Sanitized HTML rendering of the markdown body
    pub html: String,
    pub item: EquipmentItem,
    pub siblings: Vec<InstructionSummary>,
    #[serde(flatten)]
    pub navigation: SiblingNav,
}

#[derive(Clone)]
pub struct InstructionService {
    client: ApiClient,
}

impl InstructionService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn page(&self, id: i64) -> AppResult<InstructionPage> {
        let instruction = self.client.get_instruction(id).await?;
        let item = self.client.get_item(instruction.item_id).await?;
        let siblings = self.client.list_instructions(instruction.item_id).await?;

        let navigation = sibling_navigation(&siblings, instruction.id);
        let html = render_markdown(&instruction.body);

        Ok(InstructionPage {
            instruction,
            html,
            item,
            siblings,
            navigation,
        })
    }
}
