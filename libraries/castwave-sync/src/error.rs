//! Error types for the sync client.

use thiserror::Error;

/// Errors that can occur when talking to the sync server.
///
/// HTTP failures are typed so callers can branch on them: the token refresh
/// fallback fires on `Unauthorized` specifically, never on a generic
/// transport error.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Transport failed before an HTTP status came back
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The server rejected the credentials or token
    #[error("Unauthorized: {}", message.as_deref().unwrap_or("authentication rejected"))]
    Unauthorized {
        message: Option<String>,
        /// Server-supplied message identifier for localization
        message_id: Option<String>,
    },

    /// Any other non-success HTTP status
    #[error("Server error ({status}): {}", message.as_deref().unwrap_or("no message"))]
    Http {
        status: u16,
        message: Option<String>,
        message_id: Option<String>,
    },

    /// Failed to parse a server response
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Invalid sync server URL
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    /// No refresh token stored for the account
    #[error("No stored credentials for {0}")]
    MissingCredentials(String),
}

/// Result type for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
