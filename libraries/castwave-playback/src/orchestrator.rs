//! Playback orchestration
//!
//! Consumes the player's event stream and the Up Next queue: when an episode
//! completes, the finished head is removed and the next resolvable episode
//! is loaded and played. Every player event is forwarded to the
//! orchestrator's own outbound stream, so embedders subscribe in one place.
//!
//! Retry, backoff, and user-facing messaging for `PlayerError`s stay with
//! the embedder; the orchestrator only advances past a finished episode.

use std::sync::Arc;

use castwave_core::types::{EpisodeId, InsertPosition, PlayableEpisode, UpNextEntry};
use castwave_core::{CastError, UpNextQueue};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::engine::{EngineCallback, EngineFactory};
use crate::events::PlayerEvent;
use crate::local_player::LocalPlayer;

/// Drives a `LocalPlayer` through the Up Next queue
pub struct PlaybackOrchestrator<Q> {
    queue: Q,
    player: LocalPlayer,
    callbacks: mpsc::UnboundedReceiver<EngineCallback>,
    player_events: mpsc::UnboundedReceiver<PlayerEvent>,
    events_tx: mpsc::UnboundedSender<PlayerEvent>,
}

impl<Q: UpNextQueue> PlaybackOrchestrator<Q> {
    /// Create an orchestrator and the receiving end of its event stream
    pub fn new(
        queue: Q,
        factory: Arc<dyn EngineFactory>,
    ) -> (Self, mpsc::UnboundedReceiver<PlayerEvent>) {
        let (mut player, player_events) = LocalPlayer::new(factory);
        let callbacks = player
            .take_callback_receiver()
            .expect("callback receiver already taken from a fresh player");
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let orchestrator = Self {
            queue,
            player,
            callbacks,
            player_events,
            events_tx,
        };

        (orchestrator, events_rx)
    }

    /// The queue this orchestrator mutates
    pub fn queue(&self) -> &Q {
        &self.queue
    }

    /// Direct access to the player for position queries
    pub fn player(&self) -> &LocalPlayer {
        &self.player
    }

    /// Live playback position of the current episode
    pub async fn current_position_ms(&self) -> u64 {
        self.player.current_position_ms().await
    }

    /// Play an episode immediately.
    ///
    /// The episode goes to the top of the queue; a queue holding exactly one
    /// other entry is replaced rather than pushed down.
    pub async fn play_now(&mut self, episode: &PlayableEpisode) -> Result<(), CastError> {
        self.queue
            .insert_at(UpNextEntry::from(episode), InsertPosition::Top, true)
            .await?;
        self.start(episode).await
    }

    /// Queue an episode directly after the current one
    pub async fn play_next(&mut self, episode: &PlayableEpisode) -> Result<(), CastError> {
        self.queue
            .insert_at(UpNextEntry::from(episode), InsertPosition::Next, false)
            .await?;
        Ok(())
    }

    /// Queue an episode after everything else
    pub async fn play_last(&mut self, episode: &PlayableEpisode) -> Result<(), CastError> {
        self.queue
            .insert_at(UpNextEntry::from(episode), InsertPosition::Last, false)
            .await?;
        Ok(())
    }

    /// Pause the current episode
    pub async fn pause(&mut self) {
        self.player.pause().await;
    }

    /// Resume the current episode from its stored position
    pub async fn resume(&mut self) -> Result<(), CastError> {
        let position = self.player.current_position_ms().await;
        self.player.play(position as i64).await?;
        Ok(())
    }

    /// Drop the finished head and start the next resolvable episode.
    ///
    /// Returns the identity now playing, or `None` when the queue ran dry.
    pub async fn advance(&mut self) -> Result<Option<EpisodeId>, CastError> {
        if let Some(head) = self.queue.find_head().await? {
            self.queue.delete_by_episode(&head.episode_id).await?;
        }

        match self.queue.resolved_episodes(1).await?.into_iter().next() {
            Some(episode) => {
                info!(episode_id = %episode.id, "Advancing to next episode");
                self.start(&episode).await?;
                Ok(Some(episode.id))
            }
            None => {
                info!("Up Next queue is empty, stopping playback");
                self.player.stop().await;
                Ok(None)
            }
        }
    }

    /// Apply every pending engine callback and player event without blocking
    pub async fn pump(&mut self) -> Result<(), CastError> {
        // callbacks first so their translated events land in this pass
        while let Ok(callback) = self.callbacks.try_recv() {
            self.player.handle_callback(callback).await;
        }
        while let Ok(event) = self.player_events.try_recv() {
            self.on_player_event(event).await?;
        }
        Ok(())
    }

    /// Process engine callbacks and player events as they arrive.
    ///
    /// Runs until the owning task is dropped or aborted. Queue errors while
    /// advancing are logged and do not kill the loop.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                callback = self.callbacks.recv() => match callback {
                    Some(callback) => self.player.handle_callback(callback).await,
                    None => break,
                },
                event = self.player_events.recv() => match event {
                    Some(event) => {
                        if let Err(e) = self.on_player_event(event).await {
                            warn!(error = %e, "Failed to advance the queue");
                        }
                    }
                    None => break,
                },
            }
        }
    }

    async fn start(&mut self, episode: &PlayableEpisode) -> Result<(), CastError> {
        self.player.stop().await;
        self.player.set_episode(episode);
        self.player.load(episode.played_up_to_ms as i64).await?;
        self.player.play(episode.played_up_to_ms as i64).await?;
        Ok(())
    }

    async fn on_player_event(&mut self, event: PlayerEvent) -> Result<(), CastError> {
        if matches!(event, PlayerEvent::Completion { .. }) {
            self.advance().await?;
        }
        // forward after reacting so Completion precedes the next PlayerPlaying
        let _ = self.events_tx.send(event);
        Ok(())
    }
}
