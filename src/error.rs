//! Unified client error handling for Findora.
//!
//! Every failure surfaced by the SDK is an [`ApiError`] carrying an
//! [`ErrorKind`]. Callers branch on the kind (for example
//! [`ApiError::is_auth`]) instead of inspecting message text.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Classification of a client error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transport failure: connection refused, DNS, timeout
    Network,
    /// 401 from the backend
    Unauthorized,
    /// 403 from the backend, or an admin-only action attempted locally
    Forbidden,
    /// 404 from the backend
    NotFound,
    /// Any other non-2xx status
    Status(u16),
    /// Response body could not be decoded
    Decode,
    /// Client-side validation failed before a request was sent
    Validation,
    /// Message-send quota is used up
    QuotaExhausted,
    /// No valid local session
    NotAuthenticated,
    /// Local session storage failed
    Storage,
}

impl ErrorKind {
    /// Map an HTTP status to its error kind
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => ErrorKind::Unauthorized,
            StatusCode::FORBIDDEN => ErrorKind::Forbidden,
            StatusCode::NOT_FOUND => ErrorKind::NotFound,
            other => ErrorKind::Status(other.as_u16()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Network => "network",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Status(_) => "http_status",
            ErrorKind::Decode => "decode",
            ErrorKind::Validation => "validation",
            ErrorKind::QuotaExhausted => "quota_exhausted",
            ErrorKind::NotAuthenticated => "not_authenticated",
            ErrorKind::Storage => "storage",
        }
    }
}

/// Errors returned by the Findora client
#[derive(Error, Debug, Clone)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("{message}")]
    Http { kind: ErrorKind, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    #[error("No message sends remaining")]
    QuotaExhausted,

    #[error("Login required")]
    NotAuthenticated,

    #[error("Session storage error: {0}")]
    Storage(String),
}

/// Error body shapes the backend is known to send
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

impl ApiError {
    /// Build an error for a non-2xx response.
    ///
    /// The message is taken from the JSON body's `message` or `error` field
    /// when present, falling back to the status text.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message.or(b.error))
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
            });

        ApiError::Http {
            kind: ErrorKind::from_status(status),
            message,
        }
    }

    /// Single field validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Forbidden error raised locally, without a round-trip
    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Http {
            kind: ErrorKind::Forbidden,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Network(_) => ErrorKind::Network,
            ApiError::Http { kind, .. } => *kind,
            ApiError::Decode(_) => ErrorKind::Decode,
            ApiError::Validation { .. } => ErrorKind::Validation,
            ApiError::QuotaExhausted => ErrorKind::QuotaExhausted,
            ApiError::NotAuthenticated => ErrorKind::NotAuthenticated,
            ApiError::Storage(_) => ErrorKind::Storage,
        }
    }

    /// True for 401/403 responses and for a missing local session
    pub fn is_auth(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Unauthorized | ErrorKind::Forbidden | ErrorKind::NotAuthenticated
        )
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::Http {
                kind: ErrorKind::from_status(status),
                message: err.to_string(),
            }
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Storage(err.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
