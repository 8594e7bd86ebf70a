//! Page-level services on top of the backend client

pub mod auth;
pub mod dashboard;
pub mod instructions;
pub mod inventory;
pub mod scanner;

use std::sync::Arc;
use std::time::Duration;

use crate::{
    client::ApiClient,
    config::AppConfig,
    scanner::{LineDeviceBackend, ReaderBackend, Unconfigured},
    session::AuthContext,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub inventory: inventory::InventoryService,
    pub dashboard: dashboard::DashboardService,
    pub instructions: instructions::InstructionService,
    pub scanner: scanner::ScannerService,
}

impl Services {
    pub fn new(config: &AppConfig, client: ApiClient, auth: Arc<AuthContext>) -> Self {
        let backend: Arc<dyn ReaderBackend> = match &config.scanner.device {
            Some(device) => Arc::new(LineDeviceBackend::new(device.clone())),
            None => Arc::new(Unconfigured),
        };

        Self {
            auth: auth::AuthService::new(client.clone(), auth),
            inventory: inventory::InventoryService::new(client.clone()),
            dashboard: dashboard::DashboardService::new(client.clone(), (&config.dashboard).into()),
            instructions: instructions::InstructionService::new(client.clone()),
            scanner: scanner::ScannerService::new(
                client,
                backend,
                Duration::from_secs(config.scanner.timeout_secs),
            ),
        }
    }
}
