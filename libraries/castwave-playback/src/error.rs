//! Error types for playback

use thiserror::Error;

/// Playback errors
///
/// Engine faults are reported through `PlayerEvent::PlayerError`, not here;
/// these variants cover caller contract violations.
#[derive(Debug, Error)]
pub enum PlayerError {
    /// No episode has been set on the player
    #[error("No episode set")]
    NoEpisode,

    /// Invalid operation for the current player state
    #[error("Invalid player state: {0}")]
    InvalidState(String),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlayerError>;

impl From<PlayerError> for castwave_core::CastError {
    fn from(err: PlayerError) -> Self {
        castwave_core::CastError::playback(err.to_string())
    }
}
