//! Domain types shared across the Castwave crates

mod episode;
mod ids;
mod up_next;

pub use episode::{EpisodeKind, PlayableEpisode, SourceLocation};
pub use ids::EpisodeId;
pub use up_next::{InsertPosition, UpNextEntry};
