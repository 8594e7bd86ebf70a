//! Error types for Lab Portal

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

/// Stable error codes carried in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    NotAuthorized = 2,
    Transport = 3,
    Backend = 4,
    BadValue = 5,
    NoSuchData = 6,
    ScannerUnavailable = 7,
    Conflict = 8,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// The backend answered 401, or a gated page was opened without a session
    #[error("Unauthorized (HTTP 401)")]
    Unauthorized,

    /// Non-2xx backend response; `message` is the body's `error` field or `HTTP <status>`
    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected backend response: {0}")]
    InvalidResponse(String),

    /// Client-side validation failure, raised before any request is sent
    #[error("{0}")]
    Validation(String),

    #[error("Scanner unavailable: {0}")]
    ScannerUnavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(validation_message(&errors))
    }
}

/// Flatten validator output into one inline alert message, ordered by field
/// name so the same input always yields the same text.
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let mut messages: Vec<String> = Vec::new();
    for (_, field_errors) in fields {
        for error in field_errors.iter() {
            let message = error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| error.code.to_string());
            if !messages.contains(&message) {
                messages.push(message);
            }
        }
    }
    messages.join("; ")
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Unauthorized => {
                tracing::debug!("Unauthorized, redirecting to /login");
                return Redirect::to("/login").into_response();
            }
            AppError::Http { status, message } => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                ErrorCode::Backend,
                message.clone(),
            ),
            AppError::Transport(e) => {
                tracing::warn!("Backend unreachable: {}", e);
                (StatusCode::BAD_GATEWAY, ErrorCode::Transport, self.to_string())
            }
            AppError::InvalidResponse(msg) => {
                tracing::warn!("Invalid backend response: {}", msg);
                (StatusCode::BAD_GATEWAY, ErrorCode::Backend, self.to_string())
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::ScannerUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, ErrorCode::ScannerUnavailable, self.to_string())
            }
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, ErrorCode::NoSuchData, msg.clone())
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::Conflict(msg) => {
                (StatusCode::CONFLICT, ErrorCode::Conflict, msg.clone())
            }
            AppError::Io(e) => {
                tracing::error!("I/O error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::LOCATION;
    use validator::ValidationError;

    #[test]
    fn unauthorized_redirects_to_login() {
        let response = AppError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/login");
    }

    #[test]
    fn backend_status_is_passed_through() {
        let response = AppError::Http { status: 409, message: "sku exists".into() }.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn validation_messages_are_sorted_and_deduplicated() {
        let mut errors = ValidationErrors::new();
        let mut name = ValidationError::new("length");
        name.message = Some("Name is required".into());
        let mut sku = ValidationError::new("length");
        sku.message = Some("SKU is required".into());
        errors.add("sku", sku);
        errors.add("name", name.clone());
        errors.add("name", name);

        assert_eq!(validation_message(&errors), "Name is required; SKU is required");
    }
}
