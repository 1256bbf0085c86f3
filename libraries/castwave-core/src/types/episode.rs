/// Playable episode types
use serde::{Deserialize, Serialize};

use super::ids::EpisodeId;

/// Which backing table an episode identity belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EpisodeKind {
    /// Episode of a subscribed podcast
    Podcast,
    /// Episode uploaded by the user (files)
    User,
}

impl EpisodeKind {
    /// Stable string form used for persistence
    pub fn as_str(&self) -> &'static str {
        match self {
            EpisodeKind::Podcast => "podcast",
            EpisodeKind::User => "user",
        }
    }

    /// Parse the persisted string form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "podcast" => Some(EpisodeKind::Podcast),
            "user" => Some(EpisodeKind::User),
            _ => None,
        }
    }
}

/// Where the audio for an episode comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceLocation {
    /// Remote stream URL
    Stream(String),
    /// Fully downloaded local file
    Downloaded(String),
}

impl SourceLocation {
    /// True when the source is a network stream
    pub fn is_streaming(&self) -> bool {
        matches!(self, SourceLocation::Stream(_))
    }
}

/// An episode resolved to something the player can load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayableEpisode {
    pub id: EpisodeId,
    pub kind: EpisodeKind,
    pub title: String,
    /// Remote audio URL, when the episode can be streamed
    pub download_url: Option<String>,
    /// Local file path, set once the episode has been downloaded
    pub downloaded_file_path: Option<String>,
    /// HLS streams need a different media source than progressive files
    pub is_hls: bool,
    pub duration_ms: Option<u64>,
    /// Saved resume position
    pub played_up_to_ms: u64,
}

impl PlayableEpisode {
    /// Create a streamable podcast episode
    pub fn podcast(id: EpisodeId, title: impl Into<String>, download_url: impl Into<String>) -> Self {
        Self {
            id,
            kind: EpisodeKind::Podcast,
            title: title.into(),
            download_url: Some(download_url.into()),
            downloaded_file_path: None,
            is_hls: false,
            duration_ms: None,
            played_up_to_ms: 0,
        }
    }

    /// Create a user episode backed by a local file
    pub fn user_file(id: EpisodeId, title: impl Into<String>, file_path: impl Into<String>) -> Self {
        Self {
            id,
            kind: EpisodeKind::User,
            title: title.into(),
            download_url: None,
            downloaded_file_path: Some(file_path.into()),
            is_hls: false,
            duration_ms: None,
            played_up_to_ms: 0,
        }
    }

    /// Derive the playback source for this episode.
    ///
    /// A downloaded file always wins over the stream URL; `None` means the
    /// episode has no playable source at all.
    pub fn source_location(&self) -> Option<SourceLocation> {
        if let Some(path) = &self.downloaded_file_path {
            Some(SourceLocation::Downloaded(path.clone()))
        } else {
            self.download_url.clone().map(SourceLocation::Stream)
        }
    }

    /// True when the episode has a local copy of its audio
    pub fn is_downloaded(&self) -> bool {
        self.downloaded_file_path.is_some()
    }
}
