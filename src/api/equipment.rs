//! Equipment browser

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    forms::NoteForm,
    services::inventory::{ActionOutcome, EquipmentDetail, EquipmentPage},
    AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct BrowseQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub item_id: Option<String>,
}

impl BrowseQuery {
    fn item_id(&self) -> AppResult<Option<i64>> {
        match self.item_id.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| AppError::BadRequest(format!("invalid item_id '{}'", raw))),
            None => Ok(None),
        }
    }
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<BrowseQuery>,
) -> AppResult<Json<EquipmentPage>> {
    let item_id = query.item_id()?;
    let page = state.services.inventory.equipment_page(&query.q, item_id).await?;
    Ok(Json(page))
}

pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<EquipmentDetail>> {
    let detail = state.services.inventory.item_detail(id).await?;
    Ok(Json(detail))
}

pub async fn add_note(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(form): Json<NoteForm>,
) -> AppResult<(StatusCode, Json<ActionOutcome>)> {
    let outcome = state.services.inventory.add_note(id, form).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}
