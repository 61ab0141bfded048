//! Error types and error handling for the dashboard client
//!
//! Every failure the client can hit is represented by [`DashboardError`].
//! The UI maps each variant onto one of four outcomes: an inline login
//! message, a forced logout, a transient notification, or (for the
//! dashboard sync only) a fallback to zeroed stats.

use thiserror::Error;

/// Session storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// File I/O error
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON serialization/deserialization error
    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Application-level error types
#[derive(Error, Debug)]
pub enum DashboardError {
    /// The request never produced a usable HTTP response
    #[error("Connection error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success HTTP status
    #[error("HTTP {status}: {message}")]
    HttpStatus {
        /// Numeric HTTP status code
        status: u16,
        /// Response body or reason phrase
        message: String,
    },

    /// The response body was not the JSON we expected
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// The backend reported `success: false`
    #[error("{0}")]
    Rejected(String),

    /// No valid local session, or the backend answered `requiresLogin`
    #[error("Session expired. Please login again.")]
    SessionExpired,

    /// Wrong password; the backend may report how many attempts remain
    #[error("{message}")]
    LoginRejected {
        /// Message from the backend
        message: String,
        /// Remaining attempts before lockout, when reported
        attempts_left: Option<u32>,
    },

    /// Too many failed logins
    #[error("{0}")]
    AccountLocked(String),

    /// User input failed a local check
    #[error("{0}")]
    Validation(String),

    /// Reading or writing the cached session failed
    #[error("Session storage error: {0}")]
    Storage(#[from] StorageError),

    /// An import file could not be turned into subscribers
    #[error("{0}")]
    Import(String),

    /// Writing an export file failed
    #[error("Export failed: {0}")]
    Export(#[from] std::io::Error),
}

impl DashboardError {
    /// True when the error must force a logout and show the login screen
    pub fn is_session_expired(&self) -> bool {
        matches!(self, DashboardError::SessionExpired)
    }
}

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, DashboardError>;
