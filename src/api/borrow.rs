//! Signed-in pages: add item, borrow, return and scanning

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::{
    browser::Suggestion,
    error::AppResult,
    forms::{AddItemForm, BorrowForm, ReturnForm},
    scanner::{ScanFill, ScanRegion, ScannerPhase},
    services::inventory::{ActionOutcome, AddItemPage, BorrowPage},
    AppState,
};

use super::CurrentSession;

pub async fn add_item_form(
    State(state): State<AppState>,
    CurrentSession(_session): CurrentSession,
) -> Json<AddItemPage> {
    Json(state.services.inventory.add_item_page())
}

pub async fn add_item(
    State(state): State<AppState>,
    CurrentSession(_session): CurrentSession,
    Json(form): Json<AddItemForm>,
) -> AppResult<(StatusCode, Json<ActionOutcome>)> {
    let outcome = state.services.inventory.add_item(form).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

pub async fn borrow_form(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Json<BorrowPage> {
    Json(state.services.inventory.borrow_page(&session))
}

#[derive(Debug, Default, Deserialize)]
pub struct SuggestionQuery {
    #[serde(default)]
    pub q: String,
}

pub async fn suggestions(
    State(state): State<AppState>,
    CurrentSession(_session): CurrentSession,
    Query(query): Query<SuggestionQuery>,
) -> Json<Vec<Suggestion>> {
    Json(state.services.inventory.suggestions(&query.q).await)
}

pub async fn borrow(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Json(form): Json<BorrowForm>,
) -> AppResult<(StatusCode, Json<ActionOutcome>)> {
    let outcome = state.services.inventory.borrow(form, &session).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

pub async fn return_item(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Json(form): Json<ReturnForm>,
) -> AppResult<Json<ActionOutcome>> {
    let outcome = state.services.inventory.return_item(form, &session).await?;
    Ok(Json(outcome))
}

/// Open the reader for the borrow or return tab and wait for one code
pub async fn scan(
    State(state): State<AppState>,
    CurrentSession(_session): CurrentSession,
    Path(region): Path<String>,
) -> AppResult<Json<ScanFill>> {
    let region: ScanRegion = region.parse()?;
    let fill = state.services.scanner.scan(region).await?;
    Ok(Json(fill))
}

pub async fn stop_scan(
    State(state): State<AppState>,
    CurrentSession(_session): CurrentSession,
) -> Json<ScannerPhase> {
    Json(state.services.scanner.stop().await)
}
