//! Playback engine abstraction
//!
//! The platform decoder/renderer is a black box behind `PlaybackEngine`.
//! Engines are single-use: `EngineFactory::create` builds a fresh one for
//! every prepare, and after `stop()` the instance is discarded.

use async_trait::async_trait;
use castwave_core::types::SourceLocation;
use tokio::sync::mpsc;

use crate::events::EpisodeFileMetadata;

/// Coarse engine state reported through callbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Waiting on data before playback can continue
    Buffering,
    /// Media loaded, ready to render
    Ready,
    /// Playback reached the end of the media
    Ended,
}

/// Raw callbacks from the engine's worker context.
///
/// Delivery order within one engine instance is preserved by the channel;
/// `LocalPlayer::handle_callback` translates these into `PlayerEvent`s.
#[derive(Debug, Clone)]
pub enum EngineCallback {
    /// Track/tag information became available
    TracksChanged(EpisodeFileMetadata),
    /// The engine started or stopped loading data
    LoadingChanged(bool),
    /// Playback state moved to `state`
    StateChanged(EngineState),
    /// A previously issued seek finished at `position_ms`
    SeekCompleted { position_ms: u64 },
    /// The engine failed; it will not recover on its own
    Error { message: String },
}

/// Black-box playback engine surface
///
/// All commands are serialized by the owner holding `&mut` access; engines
/// never see concurrent commands.
#[async_trait]
pub trait PlaybackEngine: Send {
    /// Load the source and get ready to render.
    ///
    /// Returns an error when the source cannot even be handed to the
    /// engine; asynchronous failures arrive as `EngineCallback::Error`.
    async fn prepare(&mut self, source: &SourceLocation, hls: bool) -> std::io::Result<()>;

    /// Start or stop rendering once ready
    async fn set_play_when_ready(&mut self, play_when_ready: bool);

    /// Whether the engine is set to render
    async fn play_when_ready(&self) -> bool;

    /// Jump to a position; completion is reported via `SeekCompleted`
    async fn seek_to(&mut self, position_ms: u64);

    /// Release all engine resources; the instance is dead afterwards
    async fn stop(&mut self);

    /// Live playback position, `None` before the engine has one
    async fn position_ms(&self) -> Option<u64>;

    /// Media duration, `None` until known
    async fn duration_ms(&self) -> Option<u64>;

    /// How far ahead of the playback position data is buffered
    async fn buffered_up_to_ms(&self) -> u64;

    /// Buffered share of the media, 0-100
    async fn buffered_percentage(&self) -> u8;

    /// Whether the engine is currently stalled on data
    async fn is_buffering(&self) -> bool;

    /// Output volume, 0.0-1.0
    async fn set_volume(&mut self, volume: f32);
}

/// Builds a fresh engine for each prepare.
///
/// The callback sender is wired into the new engine so its worker context
/// can report back to the owning player.
pub trait EngineFactory: Send + Sync {
    fn create(&self, callbacks: mpsc::UnboundedSender<EngineCallback>) -> Box<dyn PlaybackEngine>;
}
