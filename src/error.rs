//! Error types for oaigate
//!
//! Provides a unified error type for infrastructure failures. Protocol-level
//! errors reported to harvesters live in [`crate::protocol::ProtocolError`];
//! every variant here maps onto exactly one of those kinds.

use thiserror::Error;

/// Result type alias using GateError
pub type Result<T> = std::result::Result<T, GateError>;

/// Unified error type for oaigate operations
#[derive(Debug, Error)]
pub enum GateError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Backend Errors
    // -------------------------------------------------------------------------
    /// Network failure, timeout, throttling or 5xx from the notification API
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The notification API refused the request (4xx other than not-found)
    #[error("Backend rejected request with status {status}: {message}")]
    BackendRejected { status: u16, message: String },

    /// The account behind a repository scope is not known to the backend
    #[error("Unknown scope: {0}")]
    UnknownScope(String),

    // -------------------------------------------------------------------------
    // Cursor Errors
    // -------------------------------------------------------------------------
    #[error("Bad resumption token: {0}")]
    BadCursor(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl GateError {
    /// Whether retrying the same backend call may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, GateError::BackendUnavailable(_))
    }
}

impl From<reqwest::Error> for GateError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return GateError::Serialization(err.to_string());
        }
        GateError::BackendUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for GateError {
    fn from(err: serde_json::Error) -> Self {
        GateError::Serialization(err.to_string())
    }
}
