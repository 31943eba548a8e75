//! Gateway error types and their HTTP mapping.
//!
//! Every failure is converted to a response at the handler boundary as
//! `{ "error": message }` with the status from [`ApiError::status`].

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ng_01_supervisor::{RestartError, SupervisorError};
use std::fmt;

/// Bearer-token retrieval failures.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Secret file missing or unreadable.
    #[error("key manager token unavailable at {path}: {reason}")]
    Unavailable { path: String, reason: String },

    /// Secret file exists but holds nothing.
    #[error("key manager token file {path} is empty")]
    Empty { path: String },

    /// Token contains bytes not allowed in an HTTP header.
    #[error("key manager token is not a valid header value")]
    InvalidHeader,
}

/// Reverse-proxy failures.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// Caller's body is not valid JSON.
    #[error("invalid JSON request body: {0}")]
    RequestBody(String),

    /// Bearer token could not be obtained.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// DNS, connection, or timeout failure reaching the upstream.
    #[error("{0}")]
    Transport(String),

    /// Upstream body is not valid JSON.
    #[error("invalid JSON response from upstream: {0}")]
    ResponseBody(String),
}

/// Settings store failures.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("settings file {0} not found")]
    NotFound(String),

    #[error("settings file is not valid JSON: {0}")]
    Parse(String),

    #[error("settings I/O error: {0}")]
    Io(String),
}

/// HTTP-facing error: a status code and a message for `{ "error": ... }`.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(path: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("no route for {}", path))
    }

    pub fn method_not_allowed(method: &str, path: &str) -> Self {
        Self::new(
            StatusCode::METHOD_NOT_ALLOWED,
            format!("{} not allowed on {}", method, path),
        )
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.status.as_u16(), self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

impl From<ProxyError> for ApiError {
    fn from(e: ProxyError) -> Self {
        match e {
            ProxyError::RequestBody(_) => ApiError::bad_request(e.to_string()),
            ProxyError::Token(_) | ProxyError::Transport(_) | ProxyError::ResponseBody(_) => {
                ApiError::internal(e.to_string())
            }
        }
    }
}

impl From<SupervisorError> for ApiError {
    fn from(e: SupervisorError) -> Self {
        match e {
            SupervisorError::Fault(fault) => ApiError::internal(fault.message),
            other => ApiError::internal(other.to_string()),
        }
    }
}

impl From<RestartError> for ApiError {
    fn from(e: RestartError) -> Self {
        ApiError::internal(e.to_string())
    }
}

/// Result type for HTTP handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Gateway-level errors (startup and serving, not per-request)
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] crate::domain::config::ConfigError),

    /// Outbound client construction failed
    #[error("client setup failed: {0}")]
    Client(String),

    /// Server socket bind error
    #[error("server bind error: {0}")]
    Bind(String),

    /// Server terminated abnormally
    #[error("server error: {0}")]
    Serve(String),
}
