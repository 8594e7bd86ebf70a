//! Sign-in, registration and sign-out

use std::sync::Arc;

use crate::{
    client::ApiClient,
    error::{AppError, AppResult},
    forms::{LoginForm, RegisterForm},
    models::Session,
    session::AuthContext,
};

#[derive(Clone)]
pub struct AuthService {
    client: ApiClient,
    auth: Arc<AuthContext>,
}

impl AuthService {
    pub fn new(client: ApiClient, auth: Arc<AuthContext>) -> Self {
        Self { client, auth }
    }

    pub async fn login(&self, form: LoginForm) -> AppResult<Session> {
        let request = form.into_request()?;
        let response = self.client.login(&request).await?;
        let session = response
            .into_session()
            .ok_or_else(|| AppError::InvalidResponse("login response carries no token".to_string()))?;

        self.auth.establish(session.clone()).await?;
        tracing::info!("Signed in as {}", request.identifier);
        Ok(session)
    }

    /// Register an account. The backend may sign the user in right away,
    /// in which case the returned session is established.
    pub async fn register(&self, form: RegisterForm) -> AppResult<Option<Session>> {
        let request = form.into_request()?;
        let response = self.client.register(&request).await?;

        let session = response.into_session();
        match &session {
            Some(session) => {
                self.auth.establish(session.clone()).await?;
                tracing::info!("Registered and signed in as {}", request.username);
            }
            None => tracing::info!("Registered {}", request.username),
        }
        Ok(session)
    }

    /// Sign out locally; the backend is told on a best-effort basis
    pub async fn logout(&self) -> AppResult<()> {
        if self.auth.current().await.is_some() {
            if let Err(e) = self.client.logout().await {
                tracing::warn!("Backend logout failed: {}", e);
            }
        }
        self.auth.clear().await
    }

    pub async fn current(&self) -> Option<Session> {
        self.auth.current().await
    }
}
