//! Lab Portal
//!
//! Kiosk-side web front of the laboratory equipment inventory. It signs
//! users in against the lab management REST API, aggregates the dashboard
//! snapshot into KPIs, charts and sortable tables, and drives the
//! borrow/return workflow including QR scanning.

use std::sync::Arc;

pub mod api;
pub mod browser;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod dates;
pub mod error;
pub mod forms;
pub mod markdown;
pub mod models;
pub mod scanner;
pub mod services;
pub mod session;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

use client::ApiClient;
use services::Services;
use session::AuthContext;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth: Arc<AuthContext>,
    pub services: Arc<Services>,
}

/// Restore the persisted session and wire the services to the backend
pub async fn build_state(config: AppConfig) -> AppResult<AppState> {
    let auth = Arc::new(AuthContext::initialize(&config.session.store_path).await?);
    let client = ApiClient::new(&config.backend, config.session.cookie_name.clone(), auth.clone())?;
    let services = Services::new(&config, client, auth.clone());

    Ok(AppState {
        config: Arc::new(config),
        auth,
        services: Arc::new(services),
    })
}
