/// Core error types for Castwave
use thiserror::Error;

use crate::types::EpisodeId;

/// Result type alias using `CastError`
pub type Result<T> = std::result::Result<T, CastError>;

/// Core error type for Castwave
#[derive(Error, Debug)]
pub enum CastError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Playback-related errors
    #[error("Playback error: {0}")]
    Playback(String),

    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Episode not found in either episode table
    #[error("Episode not found: {0}")]
    EpisodeNotFound(EpisodeId),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Network error
    #[error("Network error: {0}")]
    Network(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl CastError {
    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a playback error
    pub fn playback(msg: impl Into<String>) -> Self {
        Self::Playback(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

#[cfg(feature = "sqlx-support")]
impl From<sqlx::Error> for CastError {
    fn from(err: sqlx::Error) -> Self {
        Self::Storage(err.to_string())
    }
}
