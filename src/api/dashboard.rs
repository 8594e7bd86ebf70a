//! Dashboard page

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::{
    dashboard::{DashboardTable, DashboardView},
    error::AppResult,
    AppState,
};

/// Reloads the snapshot on every visit
pub async fn show(State(state): State<AppState>) -> AppResult<Json<DashboardView>> {
    Ok(Json(state.services.dashboard.refresh().await?))
}

#[derive(Deserialize)]
pub struct SortRequest {
    pub table: DashboardTable,
    pub key: String,
}

/// Header click on one of the dashboard tables
pub async fn sort(
    State(state): State<AppState>,
    Json(request): Json<SortRequest>,
) -> Json<DashboardView> {
    Json(state.services.dashboard.sort(request.table, request.key).await)
}
