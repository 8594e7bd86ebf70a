//! Dashboard loading and sorting

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Local;
use tokio::sync::RwLock;

use crate::{
    client::ApiClient,
    dashboard::{self, DashboardAction, DashboardOptions, DashboardState, DashboardTable, DashboardView, LoadPhase},
    error::{AppError, AppResult},
};

#[derive(Clone)]
pub struct DashboardService {
    client: ApiClient,
    options: DashboardOptions,
    state: Arc<RwLock<DashboardState>>,
    generation: Arc<AtomicU64>,
}

impl DashboardService {
    pub fn new(client: ApiClient, options: DashboardOptions) -> Self {
        Self {
            client,
            options,
            state: Arc::new(RwLock::new(DashboardState::default())),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Fetch a fresh snapshot and render it. A failed fetch is shown as
    /// the page's error message; a rejected session is returned as
    /// `Unauthorized`.
    ///
    /// The response is always rendered from this request's own fetch. The
    /// shared state only keeps it if no later refresh has landed first.
    pub async fn refresh(&self) -> AppResult<DashboardView> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let (phase, action) = match self.client.dashboard_stat().await {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                (
                    LoadPhase::Ready(snapshot.clone()),
                    DashboardAction::Loaded { generation, snapshot },
                )
            }
            Err(AppError::Unauthorized) => return Err(AppError::Unauthorized),
            Err(e) => {
                tracing::warn!("Dashboard load failed: {}", e);
                let message = e.to_string();
                (
                    LoadPhase::Failed(message.clone()),
                    DashboardAction::LoadFailed { generation, message },
                )
            }
        };

        let mut state = self.state.write().await;
        let current = std::mem::take(&mut *state);
        *state = current.reduce(action);
        Ok(dashboard::render(&state.with_phase(phase), &Local::now(), self.options))
    }

    /// Toggle a table's sort column and re-render without refetching
    pub async fn sort(&self, table: DashboardTable, key: String) -> DashboardView {
        let mut state = self.state.write().await;
        let current = std::mem::take(&mut *state);
        *state = current.reduce(DashboardAction::SortBy { table, key });
        dashboard::render(&state, &Local::now(), self.options)
    }
}
