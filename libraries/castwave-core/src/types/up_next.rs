/// Up Next queue entry types
use serde::{Deserialize, Serialize};

use super::episode::{EpisodeKind, PlayableEpisode};
use super::ids::EpisodeId;

/// Where a new entry lands in the Up Next queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    /// Position 0, displacing the current head
    Top,
    /// Position 1, keeping the current head in place
    Next,
    /// After every existing entry
    Last,
}

/// One row of the Up Next queue
///
/// `id` is the database row id; `None` until the entry has been persisted.
/// Row ids are stable across reorders so attached metadata survives a
/// `save_all` reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpNextEntry {
    pub id: Option<i64>,
    pub episode_id: EpisodeId,
    pub kind: EpisodeKind,
    /// Zero-based play order; 0 is the currently playing episode
    pub position: i64,
}

impl UpNextEntry {
    /// Create an unpersisted entry at position 0
    pub fn new(episode_id: EpisodeId, kind: EpisodeKind) -> Self {
        Self {
            id: None,
            episode_id,
            kind,
            position: 0,
        }
    }
}

impl From<&PlayableEpisode> for UpNextEntry {
    fn from(episode: &PlayableEpisode) -> Self {
        Self::new(episode.id.clone(), episode.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_from_playable_episode_keeps_identity() {
        let episode = PlayableEpisode::podcast(
            EpisodeId::new("ep-1"),
            "Episode One",
            "https://cdn.example.com/ep1.mp3",
        );
        let entry = UpNextEntry::from(&episode);

        assert_eq!(entry.episode_id, episode.id);
        assert_eq!(entry.kind, EpisodeKind::Podcast);
        assert!(entry.id.is_none());
    }
}
