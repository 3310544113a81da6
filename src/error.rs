//! Error types for wishflick-client.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for wishflick-client.
#[derive(Debug, Error)]
pub enum Error {
    // ── API ──────────────────────────────────────────────────────────────────
    /// Any non-401 failure reported by the backend, or a transport failure.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The backend answered 401 and the session could not be renewed.
    #[error("Not authorized: {}", .detail.as_deref().unwrap_or("no valid credentials"))]
    Auth {
        /// `detail` field of the final 401 body, if any.
        detail: Option<String>,
    },

    /// Token renewal failed; stored credentials have been cleared.
    #[error(transparent)]
    Refresh(#[from] RefreshError),

    // ── Storage ──────────────────────────────────────────────────────────────
    /// Storage I/O error.
    #[error("Storage I/O error at {path}: {message}")]
    StorageIo {
        /// Path that caused the error.
        path: PathBuf,
        /// Error description.
        message: String,
    },

    /// Generic storage error.
    #[error("Storage error: {0}")]
    Storage(String),

    // ── Infrastructure ───────────────────────────────────────────────────────
    /// JSON encoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Failures that are handed to the caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Backend returned a non-success status.
    #[error("API error {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Status {
        /// HTTP status code.
        status: u16,
        /// `detail` field of the error body, decoded once at the boundary.
        detail: Option<String>,
    },

    /// Connection-level failure.
    #[error("Network error: {0}")]
    Network(String),

    /// Request timeout.
    #[error("Request timed out")]
    Timeout,

    /// Success body could not be decoded into the expected type.
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

/// Failure of the refresh-token exchange.
///
/// `Clone` because one outcome is delivered to every request queued behind
/// the refresh.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    /// Refresh endpoint rejected the token (expired, revoked, malformed).
    #[error("Refresh token rejected ({status}): {}", .detail.as_deref().unwrap_or("no detail"))]
    Rejected {
        /// HTTP status code from the refresh endpoint.
        status: u16,
        /// `detail` field of the error body.
        detail: Option<String>,
    },

    /// Refresh request never got a response.
    #[error("Refresh request failed: {0}")]
    Transport(String),

    /// Refresh endpoint answered 2xx without a usable token pair.
    #[error("Invalid refresh response: {0}")]
    InvalidResponse(String),

    /// The task driving the refresh was dropped before it settled.
    #[error("Token refresh abandoned before completion")]
    Abandoned,
}

impl RefreshError {
    /// Backend-provided detail, when the endpoint supplied one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Rejected { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

impl Error {
    /// Returns true if this error means the user has to log in again.
    #[must_use]
    pub fn requires_reauth(&self) -> bool {
        matches!(self, Error::Auth { .. } | Error::Refresh(_))
    }

    /// HTTP status associated with the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api(ApiError::Status { status, .. }) => Some(*status),
            Error::Auth { .. } => Some(401),
            Error::Refresh(RefreshError::Rejected { status, .. }) => Some(*status),
            _ => None,
        }
    }

    /// Backend-provided detail, for mapping to user-visible messages.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Error::Api(ApiError::Status { detail, .. }) | Error::Auth { detail } => {
                detail.as_deref()
            }
            Error::Refresh(e) => e.detail(),
            _ => None,
        }
    }

    /// Creates a storage I/O error.
    #[must_use]
    pub fn storage_io(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::StorageIo {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Convenience type alias.
pub type Result<T> = std::result::Result<T, Error>;
