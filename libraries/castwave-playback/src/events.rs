//! Player events
//!
//! Domain events emitted by `LocalPlayer`, one ordered stream per player
//! instance. Consumers pattern-match on the variants; the raw engine
//! callback surface never leaks past the player.

use castwave_core::types::EpisodeId;
use serde::{Deserialize, Serialize};

/// Metadata read from the loaded media's own tags/tracks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeFileMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub chapter_count: usize,
}

/// Events emitted by the local player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlayerEvent {
    /// Playback has started or resumed
    PlayerPlaying,

    /// Playback is paused.
    ///
    /// Emitted on every `pause()` call regardless of prior state, so
    /// consumers can treat it as an idempotent signal.
    PlayerPaused,

    /// A seek finished and the position it landed on was accepted
    SeekComplete { position_ms: u64 },

    /// The engine knows the media duration
    DurationAvailable,

    /// The episode played to its end
    Completion { episode_id: Option<EpisodeId> },

    /// The engine started or stopped buffering.
    ///
    /// Only emitted while the active source is a network stream; local
    /// files never report buffering.
    BufferingStateChanged,

    /// Metadata became available for the loaded media
    MetadataAvailable { metadata: EpisodeFileMetadata },

    /// The engine reported a failure; playback did not survive it
    PlayerError { message: String },
}
