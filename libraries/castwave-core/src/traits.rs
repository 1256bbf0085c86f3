/// Core traits for Castwave
use crate::error::Result;
use crate::types::{EpisodeId, InsertPosition, PlayableEpisode, UpNextEntry};

/// Up Next queue trait
///
/// Implementers provide the durable, ordered play queue. Positions are dense
/// zero-based integers: after any mutating operation returns, the set of
/// positions is exactly `0..count`.
#[allow(async_fn_in_trait)]
pub trait UpNextQueue: Send + Sync {
    /// Add an episode to the queue, deduplicating by identity.
    ///
    /// With `replace_singleton` set, inserting into a queue that holds exactly
    /// one entry clears it first (play now, replacing the single queued item).
    async fn insert_at(
        &self,
        entry: UpNextEntry,
        position: InsertPosition,
        replace_singleton: bool,
    ) -> Result<()>;

    /// Insert a batch of entries, preserving the given order
    async fn insert_all(&self, entries: Vec<UpNextEntry>) -> Result<()>;

    /// Reconcile the queue against a full replacement ordering.
    ///
    /// Difference-based: surviving rows keep their row identity and only have
    /// their position updated, new identities are inserted at their index,
    /// and rows absent from the new list are deleted.
    async fn save_all(&self, episodes: &[PlayableEpisode]) -> Result<()>;

    /// Remove the entry for an episode, if present
    async fn delete_by_episode(&self, id: &EpisodeId) -> Result<()>;

    /// Clear the queue
    async fn delete_all(&self) -> Result<()>;

    /// Remove everything except the position-0 entry; no-op on an empty queue
    async fn delete_all_except_head(&self) -> Result<()>;

    /// All entries ordered ascending by position
    async fn all(&self) -> Result<Vec<UpNextEntry>>;

    /// The position-0 entry, or `None` when the queue is empty
    async fn find_head(&self) -> Result<Option<UpNextEntry>>;

    /// Whether an episode is queued
    async fn contains(&self, id: &EpisodeId) -> Result<bool>;

    /// Number of queued entries
    async fn count(&self) -> Result<i64>;

    /// Queue identities resolved against both episode tables, in play order.
    ///
    /// Identities that resolve to neither table are silently dropped.
    async fn resolved_episodes(&self, limit: i64) -> Result<Vec<PlayableEpisode>>;
}
