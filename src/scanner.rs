//! QR reader coordination.
//!
//! One physical reader is shared by the borrow and return tabs. Opening it
//! is two-phase: a tab first requests the reader, then acquires it from a
//! [`ReaderBackend`]. Whatever happens next (a decoded code, a stop, a tab
//! switch, a timeout or a failed acquisition) the reader is released.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio::sync::Notify;

use crate::{
    browser::resolve_sku,
    error::{AppError, AppResult},
    models::EquipmentItem,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanRegion {
    Borrow,
    Return,
}

impl std::str::FromStr for ScanRegion {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "borrow" => Ok(ScanRegion::Borrow),
            "return" => Ok(ScanRegion::Return),
            other => Err(AppError::BadRequest(format!("unknown scan region '{}'", other))),
        }
    }
}

/// A reader that is open and owned by one region
#[async_trait]
pub trait ActiveReader: Send {
    /// Next decoded code, `None` once the device is closed
    async fn next_code(&mut self) -> AppResult<Option<String>>;
    async fn release(&mut self);
}

/// Opens the physical reader
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReaderBackend: Send + Sync {
    async fn acquire(&self, region: ScanRegion) -> AppResult<Box<dyn ActiveReader>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ScannerPhase {
    Idle,
    Requested { region: ScanRegion },
    Active { region: ScanRegion },
    Failed { region: ScanRegion, message: String },
}

/// Form field values produced by one decoded code
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanFill {
    pub region: ScanRegion,
    pub sku: String,
    /// Internal id when the sku matches a known item
    pub item_id: Option<i64>,
}

pub struct ScannerCoordinator {
    phase: ScannerPhase,
    reader: Option<Box<dyn ActiveReader>>,
}

impl Default for ScannerCoordinator {
    fn default() -> Self {
        Self {
            phase: ScannerPhase::Idle,
            reader: None,
        }
    }
}

impl ScannerCoordinator {
    pub fn phase(&self) -> &ScannerPhase {
        &self.phase
    }

    /// Ask for the reader on behalf of `region`, closing any open one first
    pub async fn request_open(&mut self, region: ScanRegion) {
        self.release().await;
        self.phase = ScannerPhase::Requested { region };
    }

    /// Second phase: open the requested reader
    pub async fn acquire(&mut self, backend: &dyn ReaderBackend) -> AppResult<ScanRegion> {
        let region = match &self.phase {
            ScannerPhase::Requested { region } => *region,
            ScannerPhase::Active { region } => return Ok(*region),
            _ => return Err(AppError::Conflict("Scanner was not requested".to_string())),
        };

        match backend.acquire(region).await {
            Ok(reader) => {
                self.reader = Some(reader);
                self.phase = ScannerPhase::Active { region };
                tracing::debug!("Scanner active for {:?}", region);
                Ok(region)
            }
            Err(e) => {
                let message = match e {
                    AppError::ScannerUnavailable(message) => message,
                    other => other.to_string(),
                };
                tracing::warn!("Scanner acquisition failed: {}", message);
                self.phase = ScannerPhase::Failed {
                    region,
                    message: message.clone(),
                };
                Err(AppError::ScannerUnavailable(message))
            }
        }
    }

    /// Wait for one code, then release the reader.
    ///
    /// The wait ends early on `timeout` or when `cancel` is notified.
    pub async fn read_one(
        &mut self,
        equipment: &[EquipmentItem],
        timeout: Duration,
        cancel: &Notify,
    ) -> AppResult<ScanFill> {
        let region = match &self.phase {
            ScannerPhase::Active { region } => *region,
            _ => return Err(AppError::Conflict("Scanner is not active".to_string())),
        };
        let Some(reader) = self.reader.as_mut() else {
            return Err(AppError::Conflict("Scanner is not active".to_string()));
        };

        let outcome = tokio::select! {
            read = tokio::time::timeout(timeout, reader.next_code()) => match read {
                Ok(result) => result,
                Err(_) => Err(AppError::ScannerUnavailable(format!(
                    "No code scanned within {}s",
                    timeout.as_secs()
                ))),
            },
            _ = cancel.notified() => Err(AppError::Conflict("Scan cancelled".to_string())),
        };

        self.release().await;

        let code = outcome?
            .map(|code| code.trim().to_string())
            .filter(|code| !code.is_empty())
            .ok_or_else(|| AppError::ScannerUnavailable("Scanner closed".to_string()))?;

        Ok(ScanFill {
            region,
            item_id: resolve_sku(equipment, &code),
            sku: code,
        })
    }

    pub async fn stop(&mut self) {
        self.release().await;
    }

    /// Leaving a tab always closes the reader
    pub async fn switch_tab(&mut self) {
        self.stop().await;
    }

    async fn release(&mut self) {
        if let Some(mut reader) = self.reader.take() {
            reader.release().await;
            tracing::debug!("Scanner released");
        }
        self.phase = ScannerPhase::Idle;
    }
}

/// Reader backend for HID/serial QR readers that decode in hardware and
/// emit one code per line on a character device.
pub struct LineDeviceBackend {
    device: PathBuf,
}

impl LineDeviceBackend {
    pub fn new(device: impl Into<PathBuf>) -> Self {
        Self {
            device: device.into(),
        }
    }
}

#[async_trait]
impl ReaderBackend for LineDeviceBackend {
    async fn acquire(&self, _region: ScanRegion) -> AppResult<Box<dyn ActiveReader>> {
        let file = tokio::fs::File::open(&self.device).await.map_err(|e| {
            AppError::ScannerUnavailable(format!("{}: {}", self.device.display(), e))
        })?;
        Ok(Box::new(LineReader {
            lines: Some(BufReader::new(file).lines()),
        }))
    }
}

struct LineReader {
    lines: Option<Lines<BufReader<tokio::fs::File>>>,
}

#[async_trait]
impl ActiveReader for LineReader {
    async fn next_code(&mut self) -> AppResult<Option<String>> {
        let Some(lines) = self.lines.as_mut() else {
            return Ok(None);
        };
        while let Some(line) = lines.next_line().await? {
            if !line.trim().is_empty() {
                return Ok(Some(line));
            }
        }
        Ok(None)
    }

    async fn release(&mut self) {
        self.lines = None;
    }
}

/// Backend used when no reader device is configured
pub struct Unconfigured;

#[async_trait]
impl ReaderBackend for Unconfigured {
    async fn acquire(&self, _region: ScanRegion) -> AppResult<Box<dyn ActiveReader>> {
        Err(AppError::ScannerUnavailable(
            "No scanner device configured".to_string(),
        ))
    }
}
