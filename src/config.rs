//! Configuration management for Lab Portal

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Where the lab management REST API lives
#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    /// File holding the persisted session object (`{token, exp, user}`)
    pub store_path: PathBuf,
    /// Name of the cookie mirroring the session token
    pub cookie_name: String,
    pub max_age_secs: u64,
}

/// Longest utilization window the dashboard will chart
pub const MAX_UTILIZATION_DAYS: u32 = 366;

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    /// Number of calendar days covered by the utilization chart
    pub utilization_days: u32,
    /// Number of rows in the low-stock ranking
    pub low_stock_limit: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScannerConfig {
    /// Character device of a line-oriented QR reader. Scanning is
    /// unavailable when unset.
    pub device: Option<PathBuf>,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub session: SessionConfig,
    pub dashboard: DashboardConfig,
    pub scanner: ScannerConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default"))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (with prefix LAB_PORTAL_, e.g. LAB_PORTAL_SERVER__PORT)
            .add_source(
                Environment::with_prefix("LAB_PORTAL")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            // Override backend URL from BACKEND_URL env var if present
            .set_override_option("backend.base_url", env::var("BACKEND_URL").ok())?
            .build()?;

        let config: AppConfig = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let days = self.dashboard.utilization_days;
        if !(1..=MAX_UTILIZATION_DAYS).contains(&days) {
            return Err(ConfigError::Message(format!(
                "dashboard.utilization_days must be between 1 and {}, got {}",
                MAX_UTILIZATION_DAYS, days
            )));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8090,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            timeout_secs: 15,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("data/session.json"),
            cookie_name: "imx_token".to_string(),
            max_age_secs: 7 * 24 * 3600,
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            utilization_days: 30,
            low_stock_limit: 10,
        }
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            device: None,
            timeout_secs: 60,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
