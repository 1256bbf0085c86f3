//! LocalPlayer state machine tests
//!
//! Exercised against the scripted `FakeEngine`: position correction on play,
//! the single seek retry, buffering suppression for local files, and engine
//! lifecycle across stop/restart.


use castwave_core::types::{EpisodeId, PlayableEpisode};
use castwave_playback::{
    EngineCallback, EngineState, EpisodeFileMetadata, LocalPlayer, PlayerEvent, PlayerState,
};
use test_helpers::*;
use tokio::sync::mpsc;

fn stream_episode() -> PlayableEpisode {
    PlayableEpisode::podcast(
        EpisodeId::new("ep-1"),
        "Episode One",
        "https://cdn.example.com/ep1.mp3",
    )
}

fn downloaded_episode() -> PlayableEpisode {
    let mut episode = stream_episode();
    episode.downloaded_file_path = Some("/podcasts/ep1.mp3".to_string());
    episode
}

/// Player plus its channels, pointed at an episode
struct Harness {
    player: LocalPlayer,
    callbacks: mpsc::UnboundedReceiver<EngineCallback>,
    events: mpsc::UnboundedReceiver<PlayerEvent>,
    factory: std::sync::Arc<FakeEngineFactory>,
}

impl Harness {
    fn new(script: EngineScript, episode: &PlayableEpisode) -> Self {
        let factory = FakeEngineFactory::new(script);
        let (mut player, events) = LocalPlayer::new(factory.clone());
        let callbacks = player.take_callback_receiver().unwrap();
        player.set_episode(episode);
        Self {
            player,
            callbacks,
            events,
            factory,
        }
    }

    /// Apply every callback the engine has produced so far
    async fn pump(&mut self) {
        while let Ok(callback) = self.callbacks.try_recv() {
            self.player.handle_callback(callback).await;
        }
    }

    fn drain_events(&mut self) -> Vec<PlayerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}

#[tokio::test]
async fn load_prepares_then_seeks_to_resume_position() {
    let mut h = Harness::new(EngineScript::default(), &stream_episode());

    h.player.load(5000).await.unwrap();

    let commands = h.factory.commands();
    assert!(matches!(commands[0], EngineCommand::Prepare { .. }));
    assert!(commands.contains(&EngineCommand::SeekTo(5000)));
    assert_eq!(h.player.state(), PlayerState::Ready);
}

#[tokio::test]
async fn load_with_negative_position_skips_the_seek() {
    let mut h = Harness::new(EngineScript::default(), &stream_episode());

    h.player.load(-5).await.unwrap();

    let commands = h.factory.commands();
    assert_eq!(commands.len(), 1);
    assert!(matches!(commands[0], EngineCommand::Prepare { .. }));
}

#[tokio::test]
async fn play_corrects_position_when_engine_drifted() {
    // a fresh engine reports 0; asking to play at 10s is a 10s drift
    let mut h = Harness::new(EngineScript::default(), &stream_episode());

    h.player.play(10_000).await.unwrap();

    let commands = h.factory.commands();
    let seeks: Vec<_> = commands
        .iter()
        .filter(|c| matches!(c, EngineCommand::SeekTo(_)))
        .collect();
    assert_eq!(seeks, vec![&EngineCommand::SeekTo(10_000)]);
    assert_eq!(commands.last(), Some(&EngineCommand::PlayWhenReady(true)));
    assert_eq!(h.drain_events(), vec![PlayerEvent::PlayerPlaying]);
}

#[tokio::test]
async fn play_within_tolerance_does_not_seek() {
    let script = EngineScript {
        initial_position_ms: 9000,
        ..EngineScript::default()
    };
    let mut h = Harness::new(script, &stream_episode());

    // 1s of drift is within the 2s tolerance
    h.player.play(10_000).await.unwrap();

    assert!(!h
        .factory
        .commands()
        .iter()
        .any(|c| matches!(c, EngineCommand::SeekTo(_))));
}

#[tokio::test]
async fn seek_landing_short_is_retried_exactly_once() {
    let script = EngineScript::default();
    script.seek_landings.lock().unwrap().extend([3000, 3000]);
    let mut h = Harness::new(script, &stream_episode());

    h.player.play(0).await.unwrap();
    h.drain_events();

    h.player.seek_to_time_ms(10_000).await;
    // first completion lands at 3s, more than 5s short of the target
    h.pump().await;
    // the retry's completion is also short; it must be accepted as final
    h.pump().await;

    let seeks: Vec<_> = h
        .factory
        .commands()
        .into_iter()
        .filter(|c| matches!(c, EngineCommand::SeekTo(_)))
        .collect();
    assert_eq!(
        seeks,
        vec![EngineCommand::SeekTo(10_000), EngineCommand::SeekTo(10_000)]
    );
    assert_eq!(
        h.drain_events(),
        vec![PlayerEvent::SeekComplete { position_ms: 3000 }]
    );
    assert_eq!(h.player.current_position_ms().await, 3000);
}

#[tokio::test]
async fn seek_landing_exactly_at_threshold_is_accepted() {
    let script = EngineScript::default();
    script.seek_landings.lock().unwrap().push_back(5000);
    let mut h = Harness::new(script, &stream_episode());

    h.player.play(0).await.unwrap();
    h.drain_events();

    // 5000ms short of 10_000 is not "more than 5000ms short"
    h.player.seek_to_time_ms(10_000).await;
    h.pump().await;

    let seeks = h
        .factory
        .commands()
        .into_iter()
        .filter(|c| matches!(c, EngineCommand::SeekTo(_)))
        .count();
    assert_eq!(seeks, 1);
    assert_eq!(
        h.drain_events(),
        vec![PlayerEvent::SeekComplete { position_ms: 5000 }]
    );
}

#[tokio::test]
async fn negative_seek_is_ignored() {
    let mut h = Harness::new(EngineScript::default(), &stream_episode());

    h.player.play(0).await.unwrap();
    h.drain_events();

    h.player.seek_to_time_ms(-100).await;

    assert!(!h
        .factory
        .commands()
        .iter()
        .any(|c| matches!(c, EngineCommand::SeekTo(_))));
    assert!(h.drain_events().is_empty());
}

#[tokio::test]
async fn seek_before_prepare_is_stored_and_applied_on_play() {
    let mut h = Harness::new(EngineScript::default(), &stream_episode());

    h.player.seek_to_time_ms(7000).await;
    assert!(h.factory.commands().is_empty());

    // playing without a fresh position picks up the stored target
    h.player.play(-1).await.unwrap();

    assert!(h.factory.commands().contains(&EngineCommand::SeekTo(7000)));
}

#[tokio::test]
async fn pause_snapshots_position_and_always_signals() {
    let script = EngineScript {
        initial_position_ms: 9000,
        ..EngineScript::default()
    };
    let mut h = Harness::new(script, &stream_episode());

    h.player.play(9000).await.unwrap();
    h.player.pause().await;
    // pausing an already paused player still signals
    h.player.pause().await;

    let events = h.drain_events();
    assert_eq!(
        events,
        vec![
            PlayerEvent::PlayerPlaying,
            PlayerEvent::PlayerPaused,
            PlayerEvent::PlayerPaused,
        ]
    );

    let pauses = h
        .factory
        .commands()
        .into_iter()
        .filter(|c| *c == EngineCommand::PlayWhenReady(false))
        .count();
    assert_eq!(pauses, 1);
    assert_eq!(h.player.current_position_ms().await, 9000);
    assert_eq!(h.player.state(), PlayerState::Paused);
}

#[tokio::test]
async fn stop_discards_the_engine() {
    let mut h = Harness::new(EngineScript::default(), &stream_episode());

    h.player.play(0).await.unwrap();
    h.player.stop().await;

    assert_eq!(h.player.state(), PlayerState::Stopped);
    assert!(h.factory.commands().contains(&EngineCommand::Stop));

    // playing again needs a brand new engine
    h.player.play(0).await.unwrap();
    assert_eq!(h.factory.engines_created(), 2);
}

#[tokio::test]
async fn prepare_is_idempotent_while_prepared() {
    let mut h = Harness::new(EngineScript::default(), &stream_episode());

    h.player.play(0).await.unwrap();
    h.player.play(0).await.unwrap();

    assert_eq!(h.factory.engines_created(), 1);
    let prepares = h
        .factory
        .commands()
        .into_iter()
        .filter(|c| matches!(c, EngineCommand::Prepare { .. }))
        .count();
    assert_eq!(prepares, 1);
}

#[tokio::test]
async fn buffering_events_only_for_streams() {
    let mut h = Harness::new(EngineScript::default(), &stream_episode());
    h.player.play(0).await.unwrap();
    h.drain_events();

    h.player
        .handle_callback(EngineCallback::LoadingChanged(true))
        .await;
    h.player
        .handle_callback(EngineCallback::StateChanged(EngineState::Buffering))
        .await;
    assert_eq!(
        h.drain_events(),
        vec![
            PlayerEvent::BufferingStateChanged,
            PlayerEvent::BufferingStateChanged,
        ]
    );

    // downloaded files never report buffering
    let mut h = Harness::new(EngineScript::default(), &downloaded_episode());
    h.player.play(0).await.unwrap();
    h.drain_events();

    h.player
        .handle_callback(EngineCallback::LoadingChanged(true))
        .await;
    assert!(h.drain_events().is_empty());
    assert!(!h.player.is_buffering().await);
}

#[tokio::test]
async fn ready_state_reports_duration() {
    let mut h = Harness::new(EngineScript::default(), &stream_episode());
    h.player.play(0).await.unwrap();
    h.drain_events();

    h.player
        .handle_callback(EngineCallback::StateChanged(EngineState::Ready))
        .await;

    assert_eq!(
        h.drain_events(),
        vec![
            PlayerEvent::BufferingStateChanged,
            PlayerEvent::DurationAvailable,
        ]
    );
}

#[tokio::test]
async fn ended_state_reports_completion_with_identity() {
    let mut h = Harness::new(EngineScript::default(), &stream_episode());
    h.player.play(0).await.unwrap();
    h.drain_events();

    h.player
        .handle_callback(EngineCallback::StateChanged(EngineState::Ended))
        .await;

    assert_eq!(
        h.drain_events(),
        vec![PlayerEvent::Completion {
            episode_id: Some(EpisodeId::new("ep-1")),
        }]
    );
}

#[tokio::test]
async fn metadata_callback_is_forwarded() {
    let mut h = Harness::new(EngineScript::default(), &stream_episode());
    h.player.play(0).await.unwrap();
    h.drain_events();

    let metadata = EpisodeFileMetadata {
        title: Some("Chaptered Episode".to_string()),
        artist: None,
        chapter_count: 4,
    };
    h.player
        .handle_callback(EngineCallback::TracksChanged(metadata.clone()))
        .await;

    assert_eq!(
        h.drain_events(),
        vec![PlayerEvent::MetadataAvailable { metadata }]
    );
}

#[tokio::test]
async fn engine_error_becomes_player_error_event() {
    let mut h = Harness::new(EngineScript::default(), &stream_episode());
    h.player.play(0).await.unwrap();
    h.drain_events();

    h.player
        .handle_callback(EngineCallback::Error {
            message: "decoder died".to_string(),
        })
        .await;

    assert_eq!(
        h.drain_events(),
        vec![PlayerEvent::PlayerError {
            message: "decoder died".to_string(),
        }]
    );
}

#[tokio::test]
async fn failed_prepare_reports_instead_of_throwing() {
    let script = EngineScript {
        fail_prepare: Some("unsupported container".to_string()),
        ..EngineScript::default()
    };
    let mut h = Harness::new(script, &stream_episode());

    h.player.play(0).await.unwrap();

    assert_eq!(
        h.drain_events(),
        vec![PlayerEvent::PlayerError {
            message: "unsupported container".to_string(),
        }]
    );
    assert_eq!(h.player.state(), PlayerState::Idle);
}

#[tokio::test]
async fn episode_without_source_reports_player_error() {
    let mut episode = stream_episode();
    episode.download_url = None;
    let mut h = Harness::new(EngineScript::default(), &episode);

    h.player.play(0).await.unwrap();

    assert_eq!(
        h.drain_events(),
        vec![PlayerEvent::PlayerError {
            message: "Episode has no source".to_string(),
        }]
    );
}
