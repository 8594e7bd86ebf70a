//! Instruction viewer

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{error::AppResult, services::instructions::InstructionPage, AppState};

pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<InstructionPage>> {
    let page = state.services.instructions.page(id).await?;
    Ok(Json(page))
}
