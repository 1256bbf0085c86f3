/// Database implementation of the core queue trait
use castwave_core::types::{EpisodeId, InsertPosition, PlayableEpisode, UpNextEntry};
use castwave_core::UpNextQueue;
use sqlx::SqlitePool;

use crate::{episodes, up_next};

/// `SQLite`-backed Up Next queue
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Wrap an existing pool; run `crate::run_migrations` on it first
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[allow(async_fn_in_trait)]
impl UpNextQueue for Database {
    async fn insert_at(
        &self,
        entry: UpNextEntry,
        position: InsertPosition,
        replace_singleton: bool,
    ) -> castwave_core::Result<()> {
        up_next::insert_at(&self.pool, entry, position, replace_singleton).await?;
        Ok(())
    }

    async fn insert_all(&self, entries: Vec<UpNextEntry>) -> castwave_core::Result<()> {
        up_next::insert_all(&self.pool, entries).await?;
        Ok(())
    }

    async fn save_all(&self, episodes: &[PlayableEpisode]) -> castwave_core::Result<()> {
        up_next::save_all(&self.pool, episodes).await?;
        Ok(())
    }

    async fn delete_by_episode(&self, id: &EpisodeId) -> castwave_core::Result<()> {
        up_next::delete_by_episode(&self.pool, id).await?;
        Ok(())
    }

    async fn delete_all(&self) -> castwave_core::Result<()> {
        up_next::delete_all(&self.pool).await?;
        Ok(())
    }

    async fn delete_all_except_head(&self) -> castwave_core::Result<()> {
        up_next::delete_all_except_head(&self.pool).await?;
        Ok(())
    }

    async fn all(&self) -> castwave_core::Result<Vec<UpNextEntry>> {
        Ok(up_next::all(&self.pool).await?)
    }

    async fn find_head(&self) -> castwave_core::Result<Option<UpNextEntry>> {
        Ok(up_next::find_head(&self.pool).await?)
    }

    async fn contains(&self, id: &EpisodeId) -> castwave_core::Result<bool> {
        Ok(up_next::contains(&self.pool, id).await?)
    }

    async fn count(&self) -> castwave_core::Result<i64> {
        Ok(up_next::count(&self.pool).await?)
    }

    async fn resolved_episodes(&self, limit: i64) -> castwave_core::Result<Vec<PlayableEpisode>> {
        Ok(episodes::resolved_episodes(&self.pool, limit).await?)
    }
}
