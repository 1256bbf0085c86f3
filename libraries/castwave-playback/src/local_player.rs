//! Local player state machine
//!
//! Wraps a single-use `PlaybackEngine` and keeps the authoritative playback
//! position across pause, seek, and engine restarts. Raw engine callbacks
//! are translated into `PlayerEvent`s here; consumers never talk to the
//! engine directly.

use std::sync::Arc;
use std::time::Duration;

use castwave_core::types::{EpisodeId, PlayableEpisode, SourceLocation};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::engine::{EngineCallback, EngineFactory, EngineState, PlaybackEngine};
use crate::error::{PlayerError, Result};
use crate::events::PlayerEvent;

/// Volume applied when playback starts
const VOLUME_NORMAL: f32 = 1.0;

/// Engine drift tolerated on `play` before issuing a corrective seek.
///
/// Engines may silently reset their position on re-prepare; the tolerance
/// avoids spurious seeks from ordinary rounding.
const SEEK_DRIFT_TOLERANCE_MS: i64 = 2000;

/// A completed seek landing more than this far short of its target is
/// treated as the engine landing on a stale time and retried once.
const SEEK_SHORTFALL_MS: i64 = 5000;

/// Pause before the single seek retry
const SEEK_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Player lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    /// No engine, nothing loaded
    Idle,
    /// Engine is loading the source
    Preparing,
    /// Source loaded, not rendering
    Ready,
    /// Rendering
    Playing,
    /// Rendering suspended, position snapshotted
    Paused,
    /// Engine released; a new one is required to play again
    Stopped,
}

/// In-flight seek bookkeeping; exists only between the seek command and its
/// accepted completion
#[derive(Debug, Clone, Copy)]
struct SeekTarget {
    target_ms: u64,
    retry_allowed: bool,
}

/// Local media player over a black-box engine
pub struct LocalPlayer {
    factory: Arc<dyn EngineFactory>,
    engine: Option<Box<dyn PlaybackEngine>>,
    state: PlayerState,

    episode_id: Option<EpisodeId>,
    source_location: Option<SourceLocation>,
    is_hls: bool,

    /// Authoritative playback position for starting or resuming
    position_ms: u64,
    seek_target: Option<SeekTarget>,

    callback_tx: mpsc::UnboundedSender<EngineCallback>,
    callback_rx: Option<mpsc::UnboundedReceiver<EngineCallback>>,
    events: mpsc::UnboundedSender<PlayerEvent>,
}

impl LocalPlayer {
    /// Create a player and the receiving end of its event stream
    pub fn new(factory: Arc<dyn EngineFactory>) -> (Self, mpsc::UnboundedReceiver<PlayerEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (callback_tx, callback_rx) = mpsc::unbounded_channel();

        let player = Self {
            factory,
            engine: None,
            state: PlayerState::Idle,
            episode_id: None,
            source_location: None,
            is_hls: false,
            position_ms: 0,
            seek_target: None,
            callback_tx,
            callback_rx: Some(callback_rx),
            events: events_tx,
        };

        (player, events_rx)
    }

    /// Take the engine callback receiver.
    ///
    /// The owning task feeds everything it receives into
    /// [`handle_callback`](Self::handle_callback). Can only be taken once.
    pub fn take_callback_receiver(&mut self) -> Option<mpsc::UnboundedReceiver<EngineCallback>> {
        self.callback_rx.take()
    }

    /// Current lifecycle state
    pub fn state(&self) -> PlayerState {
        self.state
    }

    /// Identity of the episode set on the player
    pub fn episode_id(&self) -> Option<&EpisodeId> {
        self.episode_id.as_ref()
    }

    /// Whether the active source is a network stream
    pub fn is_streaming(&self) -> bool {
        matches!(self.source_location, Some(SourceLocation::Stream(_)))
    }

    /// Point the player at an episode. Does not start loading.
    ///
    /// Resets the session: identity, HLS hint, source location, and the
    /// stored position. The current engine, if any, is untouched; callers
    /// switching episodes stop the player first.
    pub fn set_episode(&mut self, episode: &PlayableEpisode) {
        self.episode_id = Some(episode.id.clone());
        self.is_hls = episode.is_hls;
        self.source_location = episode.source_location();
        self.position_ms = 0;
        self.seek_target = None;
    }

    /// Prepare the engine and seek to the resume position.
    ///
    /// Negative positions are accepted and ignored rather than rejected.
    pub async fn load(&mut self, start_position_ms: i64) -> Result<()> {
        if start_position_ms >= 0 {
            self.position_ms = start_position_ms as u64;
        }
        self.prepare().await?;
        self.seek_to_time_ms(start_position_ms).await;
        Ok(())
    }

    /// Start playback from the given position.
    ///
    /// Prepares if necessary. If the engine's reported position drifts more
    /// than [`SEEK_DRIFT_TOLERANCE_MS`] from the target, one corrective seek
    /// is issued before rendering starts.
    pub async fn play(&mut self, start_position_ms: i64) -> Result<()> {
        if start_position_ms >= 0 {
            self.position_ms = start_position_ms as u64;
        }
        self.prepare().await?;

        if self.engine.is_none() {
            // prepare failed and already reported a PlayerError event
            return Ok(());
        }

        if let Some(engine) = self.engine.as_mut() {
            engine.set_volume(VOLUME_NORMAL).await;
        }

        if self.is_playing().await {
            self.emit(PlayerEvent::PlayerPlaying);
            return Ok(());
        }

        // check the engine is where it's meant to be before resuming
        let engine_position = match self.engine.as_ref() {
            Some(engine) => engine.position_ms().await.unwrap_or(0),
            None => 0,
        };
        let target_ms = self.position_ms;
        if (target_ms as i64 - engine_position as i64).abs() > SEEK_DRIFT_TOLERANCE_MS {
            debug!(target_ms, engine_position, "Correcting engine position before play");
            self.seek_target = Some(SeekTarget {
                target_ms,
                retry_allowed: true,
            });
            if let Some(engine) = self.engine.as_mut() {
                engine.seek_to(target_ms).await;
            }
        }

        if let Some(engine) = self.engine.as_mut() {
            engine.set_play_when_ready(true).await;
        }
        self.state = PlayerState::Playing;
        self.emit(PlayerEvent::PlayerPlaying);
        Ok(())
    }

    /// Pause playback, snapshotting the engine position.
    ///
    /// `PlayerPaused` is emitted regardless of prior state.
    pub async fn pause(&mut self) {
        if self.is_playing().await {
            if let Some(engine) = self.engine.as_mut() {
                engine.set_play_when_ready(false).await;
                if let Some(position) = engine.position_ms().await {
                    self.position_ms = position;
                }
            }
            self.state = PlayerState::Paused;
        }
        self.emit(PlayerEvent::PlayerPaused);
    }

    /// Stop playback and release the engine.
    ///
    /// Engines are not reusable after stop; the next prepare builds a fresh
    /// one from the factory.
    pub async fn stop(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            if let Some(position) = engine.position_ms().await {
                self.position_ms = position;
            }
            engine.stop().await;
        }
        self.seek_target = None;
        self.state = PlayerState::Stopped;
    }

    /// Seek to a position.
    ///
    /// Negative positions are silently ignored. Before the engine is
    /// prepared the target is only stored; prepare-then-seek applies it.
    pub async fn seek_to_time_ms(&mut self, position_ms: i64) {
        if position_ms < 0 {
            return;
        }
        let position_ms = position_ms as u64;

        debug!(position_ms, "Seek requested");
        self.position_ms = position_ms;

        if self.is_prepared() {
            self.seek_target = Some(SeekTarget {
                target_ms: position_ms,
                retry_allowed: true,
            });
            if let Some(engine) = self.engine.as_mut() {
                engine.seek_to(position_ms).await;
            }
        }
    }

    /// Live engine position, falling back to the stored position
    pub async fn current_position_ms(&self) -> u64 {
        match self.engine.as_ref() {
            Some(engine) => engine.position_ms().await.unwrap_or(self.position_ms),
            None => self.position_ms,
        }
    }

    /// Media duration once the engine knows it
    pub async fn duration_ms(&self) -> Option<u64> {
        match self.engine.as_ref() {
            Some(engine) => engine.duration_ms().await,
            None => None,
        }
    }

    /// How far ahead of the playback position data is buffered
    pub async fn buffered_up_to_ms(&self) -> u64 {
        match self.engine.as_ref() {
            Some(engine) => engine.buffered_up_to_ms().await,
            None => 0,
        }
    }

    /// Buffered share of the media, 0-100
    pub async fn buffered_percentage(&self) -> u8 {
        match self.engine.as_ref() {
            Some(engine) => engine.buffered_percentage().await,
            None => 0,
        }
    }

    /// Whether the engine is stalled on data; downloaded files never buffer
    pub async fn is_buffering(&self) -> bool {
        if !self.is_streaming() {
            return false;
        }
        match self.engine.as_ref() {
            Some(engine) => engine.is_buffering().await,
            None => false,
        }
    }

    /// Whether the engine is set to render
    pub async fn is_playing(&self) -> bool {
        match self.engine.as_ref() {
            Some(engine) => engine.play_when_ready().await,
            None => false,
        }
    }

    /// Output volume, 0.0-1.0
    pub async fn set_volume(&mut self, volume: f32) {
        if let Some(engine) = self.engine.as_mut() {
            engine.set_volume(volume).await;
        }
    }

    /// Apply one raw engine callback, emitting domain events as needed.
    ///
    /// Must be called from the task that owns the player so commands issued
    /// in response (like the seek retry) stay serialized with everything
    /// else.
    pub async fn handle_callback(&mut self, callback: EngineCallback) {
        match callback {
            EngineCallback::TracksChanged(metadata) => {
                self.emit(PlayerEvent::MetadataAvailable { metadata });
            }
            EngineCallback::LoadingChanged(_) => {
                self.on_buffering_state_changed();
            }
            EngineCallback::StateChanged(EngineState::Buffering) => {
                self.on_buffering_state_changed();
            }
            EngineCallback::StateChanged(EngineState::Ready) => {
                self.on_buffering_state_changed();
                self.emit(PlayerEvent::DurationAvailable);
            }
            EngineCallback::StateChanged(EngineState::Ended) => {
                self.emit(PlayerEvent::Completion {
                    episode_id: self.episode_id.clone(),
                });
            }
            EngineCallback::SeekCompleted { position_ms } => {
                self.on_seek_complete(position_ms).await;
            }
            EngineCallback::Error { message } => {
                warn!(message = %message, "Engine reported a failure");
                self.emit(PlayerEvent::PlayerError { message });
            }
        }
    }

    fn is_prepared(&self) -> bool {
        self.engine.is_some()
            && matches!(
                self.state,
                PlayerState::Ready | PlayerState::Playing | PlayerState::Paused
            )
    }

    /// Build a fresh engine and load the source. Idempotent: preparing an
    /// already prepared player is a no-op, not an error.
    async fn prepare(&mut self) -> Result<()> {
        if self.is_prepared() {
            return Ok(());
        }
        if self.episode_id.is_none() {
            return Err(PlayerError::NoEpisode);
        }

        let Some(source) = self.source_location.clone() else {
            self.emit(PlayerEvent::PlayerError {
                message: "Episode has no source".to_string(),
            });
            return Ok(());
        };

        self.state = PlayerState::Preparing;
        let mut engine = self.factory.create(self.callback_tx.clone());
        match engine.prepare(&source, self.is_hls).await {
            Ok(()) => {
                self.engine = Some(engine);
                self.state = PlayerState::Ready;
                Ok(())
            }
            Err(e) => {
                self.state = PlayerState::Idle;
                self.emit(PlayerEvent::PlayerError {
                    message: e.to_string(),
                });
                Ok(())
            }
        }
    }

    /// Accept or retry a completed seek.
    ///
    /// Some engines land on a stale time after a restart; a completion more
    /// than [`SEEK_SHORTFALL_MS`] before the target is reissued once, after
    /// a short pause. The second answer is final either way.
    async fn on_seek_complete(&mut self, landed_ms: u64) {
        let retry_target = match self.seek_target {
            Some(SeekTarget {
                target_ms,
                retry_allowed: true,
            }) if (landed_ms as i64) < target_ms as i64 - SEEK_SHORTFALL_MS => Some(target_ms),
            _ => None,
        };

        if let Some(target_ms) = retry_target {
            warn!(
                target_ms,
                landed_ms, "Seek landed short of its target, retrying once"
            );
            tokio::time::sleep(SEEK_RETRY_DELAY).await;
            self.seek_target = Some(SeekTarget {
                target_ms,
                retry_allowed: false,
            });
            if let Some(engine) = self.engine.as_mut() {
                engine.seek_to(target_ms).await;
            }
            return;
        }

        self.position_ms = landed_ms;
        self.seek_target = None;
        self.emit(PlayerEvent::SeekComplete {
            position_ms: landed_ms,
        });
        debug!(position_ms = landed_ms, "Seek complete");
    }

    fn on_buffering_state_changed(&mut self) {
        if self.is_streaming() {
            self.emit(PlayerEvent::BufferingStateChanged);
        }
    }

    fn emit(&self, event: PlayerEvent) {
        // a dropped receiver just means nobody is listening anymore
        let _ = self.events.send(event);
    }
}
