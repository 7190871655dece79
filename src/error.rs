//! Error types for the x-radar CLI

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// Result type alias for x-radar operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Stable error classification reported in the JSON error payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidArgument,
    AuthMissing,
    NetworkError,
    ApiError,
    MalformedResponse,
    CacheUnavailable,
    InternalError,
}

impl Error {
    /// Classify the error for the structured error payload.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Error::Config(_) => ErrorKind::AuthMissing,
            Error::Api(ApiError::Network(_)) => ErrorKind::NetworkError,
            Error::Api(ApiError::MalformedResponse(_)) => ErrorKind::MalformedResponse,
            Error::Api(_) => ErrorKind::ApiError,
            Error::Cache(_) => ErrorKind::CacheUnavailable,
            Error::Io(_) | Error::Json(_) => ErrorKind::InternalError,
        }
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::InvalidArgument => 2,
            _ => 1,
        }
    }
}

/// API-related errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("X API rejected the bearer token (401 Unauthorized): {0}")]
    Unauthorized(String),

    #[error("Access denied by X API (403 Forbidden): {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded. Retry after {0:?}")]
    RateLimit(Duration),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("X API server error: {0}")]
    ServerError(String),

    #[error("X API request failed ({status}): {detail}")]
    Status { status: u16, detail: String },

    #[error("Network error while calling X API: {0}")]
    Network(String),

    #[error("Malformed X API response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("Request to X API timed out".to_string())
        } else if err.is_connect() {
            ApiError::Network("Failed to connect to X API".to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing X_BEARER_TOKEN env var (required when the response is not cached)")]
    MissingBearerToken,

    #[error("Bearer token is malformed: {0}")]
    MalformedBearerToken(String),
}

/// Cache storage errors. Never fatal to a request; the orchestrator degrades instead.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Could not determine a cache directory")]
    NoCacheDir,

    #[error("Cache I/O error: {0}")]
    Io(String),

    #[error("Cache serialization error: {0}")]
    Serialize(String),
}
