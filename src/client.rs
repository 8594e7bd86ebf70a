//! Authenticated client for the lab management REST API

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::COOKIE, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::{
    config::BackendConfig,
    error::{AppError, AppResult},
    models::{
        AuthResponse, BorrowReceipt, BorrowRequest, DashboardSnapshot, EquipmentItem,
        EquipmentNote, Instruction, InstructionSummary, LoginRequest, NewEquipment, NewNote,
        RegisterRequest, ReturnRequest,
    },
};

/// Supplies the bearer token attached to outgoing requests
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn token(&self) -> Option<String>;
}

/// List endpoints answer with a bare array or an object wrapping it
#[derive(Deserialize)]
#[serde(untagged)]
enum Listing<T> {
    Bare(Vec<T>),
    Wrapped {
        #[serde(alias = "instructions", alias = "notes", alias = "rows")]
        items: Vec<T>,
    },
}

impl<T> Listing<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Bare(items) | Listing::Wrapped { items } => items,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    cookie_name: String,
    tokens: Arc<dyn TokenSource>,
}

impl ApiClient {
    pub fn new(
        config: &BackendConfig,
        cookie_name: impl Into<String>,
        tokens: Arc<dyn TokenSource>,
    ) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cookie_name: cookie_name.into(),
            tokens,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the bearer token and its cookie mirror when signed in
    async fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.tokens.token().await {
            Some(token) => builder
                .bearer_auth(&token)
                .header(COOKIE, format!("{}={}", self.cookie_name, token)),
            None => builder,
        }
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> AppResult<Response> {
        let mut builder = self.http.request(method.clone(), self.url(path));
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = self.authed(builder).await.send().await.map_err(|e| {
            tracing::warn!("{} {} failed: {}", method, path, e);
            AppError::Transport(e)
        })?;

        tracing::debug!(method = %method, path, status = response.status().as_u16(), "backend call");
        Ok(response)
    }

    /// Map the status line to an error, then decode the JSON body
    async fn parse<R: DeserializeOwned>(path: &str, response: Response) -> AppResult<R> {
        let status = response.status();
        let text = response.text().await?;

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("{} answered 401", path);
            return Err(AppError::Unauthorized);
        }
        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|body| body.error)
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            tracing::warn!("{} answered {}: {}", path, status.as_u16(), message);
            return Err(AppError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let text = if text.trim().is_empty() { "null" } else { text.as_str() };
        serde_json::from_str(text)
            .map_err(|e| AppError::InvalidResponse(format!("{}: {}", path, e)))
    }

    async fn get<R: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> AppResult<R> {
        let response = self.send::<()>(Method::GET, path, query, None).await?;
        Self::parse(path, response).await
    }

    async fn post<B: Serialize + ?Sized, R: DeserializeOwned>(&self, path: &str, body: &B) -> AppResult<R> {
        let response = self.send(Method::POST, path, &[], Some(body)).await?;
        Self::parse(path, response).await
    }

    pub async fn login(&self, request: &LoginRequest) -> AppResult<AuthResponse> {
        self.post("/api/auth/login", request).await
    }

    pub async fn register(&self, request: &RegisterRequest) -> AppResult<AuthResponse> {
        self.post("/api/auth/register", request).await
    }

    pub async fn logout(&self) -> AppResult<()> {
        let _: Value = self.post("/api/auth/logout", &serde_json::json!({})).await?;
        Ok(())
    }

    pub async fn dashboard_stat(&self) -> AppResult<DashboardSnapshot> {
        self.get("/api/dashboard-stat", &[]).await
    }

    pub async fn list_items(&self, query: Option<&str>) -> AppResult<Vec<EquipmentItem>> {
        let params: Vec<(&str, String)> = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(|q| vec![("q", q.to_string())])
            .unwrap_or_default();
        let listing: Listing<EquipmentItem> = self.get("/api/items", &params).await?;
        Ok(listing.into_vec())
    }

    pub async fn get_item(&self, id: i64) -> AppResult<EquipmentItem> {
        self.get(&format!("/api/items/{}", id), &[]).await
    }

    pub async fn create_item(&self, item: &NewEquipment) -> AppResult<Value> {
        self.post("/api/items", item).await
    }

    pub async fn borrow(&self, request: &BorrowRequest) -> AppResult<BorrowReceipt> {
        self.post("/api/items/borrow", request).await
    }

    pub async fn return_item(&self, request: &ReturnRequest) -> AppResult<Value> {
        self.post("/api/items/return", request).await
    }

    pub async fn list_instructions(&self, item_id: i64) -> AppResult<Vec<InstructionSummary>> {
        let listing: Listing<InstructionSummary> = self
            .get("/api/instructions", &[("item_id", item_id.to_string())])
            .await?;
        Ok(listing.into_vec())
    }

    pub async fn get_instruction(&self, id: i64) -> AppResult<Instruction> {
        self.get(&format!("/api/instructions/{}", id), &[]).await
    }

    pub async fn list_notes(&self, item_id: i64) -> AppResult<Vec<EquipmentNote>> {
        let listing: Listing<EquipmentNote> = self
            .get("/api/equipment-notes", &[("item_id", item_id.to_string())])
            .await?;
        Ok(listing.into_vec())
    }

    pub async fn add_note(&self, note: &NewNote) -> AppResult<Value> {
        self.post("/api/equipment-notes", note).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn listing_accepts_bare_and_wrapped_arrays() {
        let bare: Listing<EquipmentNote> =
            serde_json::from_value(json!([{"id": 1, "note_text": "loose knob"}])).unwrap();
        assert_eq!(bare.into_vec().len(), 1);

        let wrapped: Listing<InstructionSummary> =
            serde_json::from_value(json!({"instructions": [{"id": 2, "title": "Setup"}]})).unwrap();
        assert_eq!(wrapped.into_vec()[0].title, "Setup");

        let items: Listing<EquipmentItem> =
            serde_json::from_value(json!({"items": [{"id": "3"}]})).unwrap();
        assert_eq!(items.into_vec()[0].id, 3);
    }

    #[test]
    fn trailing_slash_is_dropped_from_base_url() {
        struct NoToken;
        #[async_trait]
        impl TokenSource for NoToken {
            async fn token(&self) -> Option<String> {
                None
            }
        }

        let config = BackendConfig {
            base_url: "http://lab.local/".into(),
            timeout_secs: 5,
        };
        let client = ApiClient::new(&config, "imx_token", Arc::new(NoToken)).unwrap();
        assert_eq!(client.url("/api/items"), "http://lab.local/api/items");
    }
}
