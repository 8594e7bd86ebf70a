//! Process-wide authentication context and the session cookie bridge

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{client::TokenSource, error::AppResult, models::Session};

/// The one signed-in session of this portal.
///
/// The session lives in memory and in a JSON file at `store_path`, so
/// that a restart keeps the user signed in until the token expires.
pub struct AuthContext {
    store_path: PathBuf,
    current: RwLock<Option<Session>>,
}

impl AuthContext {
    /// Load the persisted session, if any. A malformed or expired file is
    /// discarded rather than failing startup.
    pub async fn initialize(store_path: impl Into<PathBuf>) -> AppResult<Self> {
        let store_path = store_path.into();
        let session = match tokio::fs::read_to_string(&store_path).await {
            Ok(raw) => match serde_json::from_str::<Session>(&raw) {
                Ok(session) if session.is_expired(Utc::now()) => {
                    tracing::info!("Stored session expired, removing {}", store_path.display());
                    remove_file(&store_path).await?;
                    None
                }
                Ok(session) => Some(session),
                Err(e) => {
                    tracing::warn!("Ignoring malformed session file {}: {}", store_path.display(), e);
                    None
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        if let Some(user) = session.as_ref().and_then(|s| s.borrower_name()) {
            tracing::info!("Restored session for {}", user);
        }

        Ok(Self {
            store_path,
            current: RwLock::new(session),
        })
    }

    /// Store a fresh session after login or registration
    pub async fn establish(&self, session: Session) -> AppResult<()> {
        if let Some(parent) = self.store_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let raw = serde_json::to_vec_pretty(&session)
            .map_err(|e| crate::error::AppError::Internal(e.to_string()))?;
        tokio::fs::write(&self.store_path, raw).await?;

        *self.current.write().await = Some(session);
        Ok(())
    }

    pub async fn clear(&self) -> AppResult<()> {
        self.current.write().await.take();
        remove_file(&self.store_path).await
    }

    /// The live session; an expired one reads as signed out
    pub async fn current(&self) -> Option<Session> {
        self.current
            .read()
            .await
            .as_ref()
            .filter(|s| !s.is_expired(Utc::now()))
            .cloned()
    }

    pub async fn token(&self) -> Option<String> {
        self.current().await.map(|s| s.token)
    }
}

#[async_trait]
impl TokenSource for AuthContext {
    async fn token(&self) -> Option<String> {
        AuthContext::token(self).await
    }
}

async fn remove_file(path: &Path) -> AppResult<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

fn is_local_host(hostname: &str) -> bool {
    hostname == "localhost" || hostname == "127.0.0.1" || !hostname.contains('.')
}

/// `Domain=` value shared by the portal and the API: the last two labels
fn cookie_domain(hostname: &str) -> String {
    let labels: Vec<&str> = hostname.split('.').collect();
    let start = labels.len().saturating_sub(2);
    format!(".{}", labels[start..].join("."))
}

/// `Set-Cookie` value mirroring the session token for cookie-authenticated
/// backend calls. Local hosts get a host-only lax cookie, anything else a
/// secure cross-site cookie scoped to the parent domain.
pub fn auth_cookie(hostname: &str, name: &str, token: &str, max_age_secs: u64) -> String {
    cookie(hostname, name, token, max_age_secs)
}

/// `Set-Cookie` value that deletes the mirrored token
pub fn removal_cookie(hostname: &str, name: &str) -> String {
    cookie(hostname, name, "", 0)
}

fn cookie(hostname: &str, name: &str, value: &str, max_age_secs: u64) -> String {
    let hostname = hostname.split(':').next().unwrap_or(hostname);
    if is_local_host(hostname) {
        format!("{}={}; Path=/; Max-Age={}; SameSite=Lax", name, value, max_age_secs)
    } else {
        format!(
            "{}={}; Domain={}; Path=/; Max-Age={}; Secure; SameSite=None",
            name,
            value,
            cookie_domain(hostname),
            max_age_secs
        )
    }
}
