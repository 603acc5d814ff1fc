//! Error types for motoroute
//!
//! `AppError` is the single failure type returned by route generation. Only
//! [`TransportError`] takes part in the completion retry loop; every other
//! variant is terminal on first occurrence.
//!
//! All errors implement `IntoResponse` for Axum handlers.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Generic message shown to end users when generation fails
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to generate route. Please try again.";

/// Main error type for the application
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read config file {path}: {source}")]
    ConfigFileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration in {path}: {reason}")]
    ConfigValidationFailed { path: String, reason: String },

    #[error("Invalid route parameters: {0}")]
    InvalidParams(String),

    /// Upstream API problem, surfaced only after retries are exhausted
    #[error("Failed to generate route: {0}")]
    Transport(#[from] TransportError),

    #[error("Route generation timed out after {timeout_seconds} seconds ({stage})")]
    Timeout {
        stage: &'static str,
        timeout_seconds: u64,
    },

    #[error("Route generation was cancelled")]
    Cancelled,

    #[error("No content received from completion API: {0}")]
    NoContent(String),

    #[error("Completion content is not valid JSON: {reason} (content: {preview:?})")]
    JsonParse { reason: String, preview: String },

    #[error("Invalid route format: {0}")]
    RouteFormat(String),

    #[error(
        "Generated coordinates are outside {region}: point {index} ({name}) at lat={lat}, lng={lng}"
    )]
    OutOfBounds {
        index: usize,
        name: String,
        lat: f64,
        lng: f64,
        region: String,
    },
}

/// Stable, low-cardinality tag for each failure category
///
/// Used for logs, metrics labels and API error bodies so callers can tell an
/// upstream API problem apart from malformed model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    InvalidParams,
    Transport,
    Timeout,
    Cancelled,
    NoContent,
    JsonParse,
    RouteFormat,
    OutOfBounds,
}

impl ErrorKind {
    /// Convert to string representation for logging and serialization
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::InvalidParams => "invalid_params",
            Self::Transport => "transport",
            Self::Timeout => "timeout",
            Self::Cancelled => "cancelled",
            Self::NoContent => "no_content",
            Self::JsonParse => "json_parse",
            Self::RouteFormat => "route_format",
            Self::OutOfBounds => "out_of_bounds",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AppError {
    /// Categorize this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_)
            | Self::ConfigFileRead { .. }
            | Self::ConfigParseFailed { .. }
            | Self::ConfigValidationFailed { .. } => ErrorKind::Config,
            Self::InvalidParams(_) => ErrorKind::InvalidParams,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::NoContent(_) => ErrorKind::NoContent,
            Self::JsonParse { .. } => ErrorKind::JsonParse,
            Self::RouteFormat(_) => ErrorKind::RouteFormat,
            Self::OutOfBounds { .. } => ErrorKind::OutOfBounds,
        }
    }
}

/// Failure of a single completion attempt
///
/// Status and network failures are transient and retried with backoff.
/// An attempt timeout is terminal: the attempt was bounded on purpose and
/// retrying would only extend the wait.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("completion API returned HTTP {status}: {message}")]
    Status {
        status: u16,
        message: String,
        code: Option<String>,
    },

    #[error("request to completion API failed: {reason}")]
    Network { reason: String },

    #[error("completion API attempt timed out after {timeout_seconds} seconds")]
    Timeout { timeout_seconds: u64 },
}

impl TransportError {
    /// Returns true if this error is retryable (transient network/endpoint issue)
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Status { .. } | Self::Network { .. })
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let kind = self.kind();

        if kind == ErrorKind::InvalidParams {
            let body = Json(serde_json::json!({
                "error": "Invalid request data",
                "details": self.to_string(),
            }));
            return (StatusCode::BAD_REQUEST, body).into_response();
        }

        let status = match kind {
            ErrorKind::Config => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ErrorKind::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::BAD_GATEWAY,
        };

        tracing::error!(kind = %kind, error = %self, "Route generation request failed");

        let body = Json(serde_json::json!({
            "error": "Failed to generate route",
            "kind": kind.as_str(),
            "message": GENERIC_FAILURE_MESSAGE,
        }));

        (status, body).into_response()
    }
}

/// Convenience type alias for Results
pub type AppResult<T> = Result<T, AppError>;
