//! Scanner lifecycle behind the borrow page

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, Notify};

use crate::{
    client::ApiClient,
    error::AppResult,
    scanner::{ReaderBackend, ScanFill, ScanRegion, ScannerCoordinator, ScannerPhase},
};

#[derive(Clone)]
pub struct ScannerService {
    client: ApiClient,
    backend: Arc<dyn ReaderBackend>,
    coordinator: Arc<Mutex<ScannerCoordinator>>,
    cancel: Arc<Notify>,
    timeout: Duration,
}

impl ScannerService {
    pub fn new(client: ApiClient, backend: Arc<dyn ReaderBackend>, timeout: Duration) -> Self {
        Self {
            client,
            backend,
            coordinator: Arc::new(Mutex::new(ScannerCoordinator::default())),
            cancel: Arc::new(Notify::new()),
            timeout,
        }
    }

    /// Open the reader for `region` and wait for one code.
    ///
    /// Any scan already in progress is cancelled first.
    pub async fn scan(&self, region: ScanRegion) -> AppResult<ScanFill> {
        let equipment = match self.client.dashboard_stat().await {
            Ok(snapshot) => snapshot.equipment.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Scanned codes will not be resolved to items: {}", e);
                Vec::new()
            }
        };

        self.cancel.notify_waiters();
        let mut coordinator = self.coordinator.lock().await;

        coordinator.request_open(region).await;
        coordinator.acquire(self.backend.as_ref()).await?;

        coordinator.read_one(&equipment, self.timeout, &self.cancel).await
    }

    pub async fn stop(&self) -> ScannerPhase {
        self.cancel.notify_waiters();
        let mut coordinator = self.coordinator.lock().await;
        coordinator.stop().await;
        coordinator.phase().clone()
    }
}
