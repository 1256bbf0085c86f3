//! Castwave Playback
//!
//! Local player state machine and playback orchestration for Castwave.
//!
//! This crate provides:
//! - A black-box `PlaybackEngine` trait over the platform decoder/renderer
//! - `LocalPlayer`: position tracking across pause/seek/resume, translation
//!   of raw engine callbacks into ordered domain events, and a workaround
//!   for engines whose seeks land at a stale position
//! - `PlaybackOrchestrator`: advances the Up Next queue as episodes complete
//!
//! # Architecture
//!
//! `castwave-playback` never touches the database directly; the orchestrator
//! is generic over the `UpNextQueue` trait from `castwave-core`, and the
//! platform engine is injected through `EngineFactory`. Engine callbacks
//! arrive on a channel from whatever thread the engine uses internally and
//! are applied by the task that owns the player, so engine commands are
//! naturally serialized.
//!
//! # Example
//!
//! ```rust,ignore
//! use castwave_playback::{LocalPlayer, PlayerEvent};
//!
//! let (mut player, mut events) = LocalPlayer::new(engine_factory);
//! player.set_episode(&episode);
//! player.load(episode.played_up_to_ms as i64).await?;
//! player.play(episode.played_up_to_ms as i64).await?;
//!
//! while let Some(event) = events.recv().await {
//!     match event {
//!         PlayerEvent::PlayerPlaying => { /* update the UI */ }
//!         _ => {}
//!     }
//! }
//! ```

#![forbid(unsafe_code)]

mod engine;
mod error;
mod events;
mod local_player;
mod orchestrator;

pub use engine::{EngineCallback, EngineFactory, EngineState, PlaybackEngine};
pub use error::{PlayerError, Result};
pub use events::{EpisodeFileMetadata, PlayerEvent};
pub use local_player::{LocalPlayer, PlayerState};
pub use orchestrator::PlaybackOrchestrator;
