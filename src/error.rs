//! Error handling module
//!
//! Centralized error types and HTTP response conversion. Every error leaves
//! the service as `{"status": <code>, "error": <message>}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::auth::{TokenError, INVALID_TOKEN};
use crate::domain::DomainError;
use crate::store::StoreError;

/// Message for a debit larger than the balance
pub const INSUFFICIENT_FUNDS: &str = "Insufficients Funds";

/// Message for unknown or deleted accounts
pub const ACCOUNT_NOT_FOUND: &str = "Account not found";

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Server errors (5xx)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn invalid_token() -> Self {
        Self::Unauthorized(INVALID_TOKEN.to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Domain(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Internal(_) | AppError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message shown to the client
    pub fn public_message(&self) -> String {
        match self {
            AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => msg.clone(),
            AppError::Domain(DomainError::InsufficientFunds { .. }) => INSUFFICIENT_FUNDS.to_string(),
            AppError::Domain(DomainError::AccountNotActive(_)) => {
                "Account is not active".to_string()
            }
            AppError::Domain(DomainError::InvalidAmount(e)) => e.to_string(),
            AppError::Database(_) | AppError::Internal(_) | AppError::Config(_) => {
                "Internal server error".to_string()
            }
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid => AppError::invalid_token(),
            TokenError::Signing(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity: "Account", .. } => {
                AppError::NotFound(ACCOUNT_NOT_FOUND.to_string())
            }
            StoreError::NotFound { entity, .. } => AppError::NotFound(format!("{} not found", entity)),
            StoreError::Duplicate { entity, .. } => {
                AppError::Conflict(format!("{} already exists", entity))
            }
            StoreError::Domain(e) => AppError::Domain(e),
            StoreError::Database(e) => AppError::Database(e),
            StoreError::Corrupt(msg) => AppError::Internal(msg),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            AppError::Database(e) => tracing::error!("Database error: {:?}", e),
            AppError::Internal(msg) => tracing::error!("Internal error: {}", msg),
            AppError::Config(e) => tracing::error!("Config error: {:?}", e),
            other => tracing::debug!(status = %status, error = %other, "Request rejected"),
        }

        let body = ErrorResponse {
            status: status.as_u16(),
            error: self.public_message(),
        };

        (status, Json(body)).into_response()
    }
}
