//! Up Next queue vertical slice
//!
//! The queue is a single table of `(episode_uuid, kind, position)` rows.
//! Positions are dense zero-based integers and strictly define play order;
//! every mutation here renumbers inside one transaction so readers never see
//! a gap or a duplicate.

pub mod position;

use std::collections::{HashMap, HashSet};

use castwave_core::types::{EpisodeId, EpisodeKind, InsertPosition, PlayableEpisode, UpNextEntry};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::warn;

use crate::error::Result;

fn entry_from_row(row: &SqliteRow) -> UpNextEntry {
    let kind_str: String = row.get("kind");
    let kind = EpisodeKind::parse(&kind_str).unwrap_or_else(|| {
        warn!(kind = %kind_str, "Unknown queue entry kind, treating as podcast");
        EpisodeKind::Podcast
    });

    UpNextEntry {
        id: Some(row.get("id")),
        episode_id: EpisodeId::new(row.get::<String, _>("episode_uuid")),
        kind,
        position: row.get("position"),
    }
}

async fn fetch_all(conn: &mut SqliteConnection) -> Result<Vec<UpNextEntry>> {
    let rows = sqlx::query(
        "SELECT id, episode_uuid, kind, position FROM up_next_episodes ORDER BY position ASC",
    )
    .fetch_all(conn)
    .await?;

    Ok(rows.iter().map(entry_from_row).collect())
}

async fn insert_entry(conn: &mut SqliteConnection, entry: &UpNextEntry) -> Result<()> {
    sqlx::query("INSERT INTO up_next_episodes (episode_uuid, kind, position) VALUES (?, ?, ?)")
        .bind(entry.episode_id.as_str())
        .bind(entry.kind.as_str())
        .bind(entry.position)
        .execute(conn)
        .await?;

    Ok(())
}

/// Move an existing row to a new position.
///
/// A missing row is not fatal: the queue may have been mutated by a
/// concurrent writer, so the stale update is logged and dropped.
async fn update_position(conn: &mut SqliteConnection, id: i64, new_position: i64) -> Result<()> {
    let result = sqlx::query("UPDATE up_next_episodes SET position = ? WHERE id = ?")
        .bind(new_position)
        .bind(id)
        .execute(conn)
        .await?;

    if result.rows_affected() == 0 {
        warn!(id, new_position, "Position update for missing queue row");
    }

    Ok(())
}

async fn delete_by_episode_tx(conn: &mut SqliteConnection, id: &EpisodeId) -> Result<()> {
    sqlx::query("DELETE FROM up_next_episodes WHERE episode_uuid = ?")
        .bind(id.as_str())
        .execute(conn)
        .await?;

    Ok(())
}

/// All queue entries ordered ascending by position
pub async fn all(pool: &SqlitePool) -> Result<Vec<UpNextEntry>> {
    let mut conn = pool.acquire().await?;
    fetch_all(&mut conn).await
}

/// The first `limit` queue entries in play order
pub async fn limited(pool: &SqlitePool, limit: i64) -> Result<Vec<UpNextEntry>> {
    let rows = sqlx::query(
        "SELECT id, episode_uuid, kind, position FROM up_next_episodes
         ORDER BY position ASC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(entry_from_row).collect())
}

/// Add an episode to the Up Next queue.
///
/// Any existing entry with the same identity is removed first, then the
/// surviving entries are renumbered around the insertion point:
/// - `Top` displaces everything, including the current head
/// - `Next` keeps the head at position 0 and shifts the rest
/// - `Last` appends after the existing entries
///
/// With `replace_singleton` set and exactly one entry remaining, the queue is
/// cleared and the new entry becomes the head (play now, replacing the single
/// queued item).
pub async fn insert_at(
    pool: &SqlitePool,
    mut entry: UpNextEntry,
    insert_position: InsertPosition,
    replace_singleton: bool,
) -> Result<()> {
    let mut tx = pool.begin().await?;

    // remove the episode before re-adding it, the queue holds no duplicates
    delete_by_episode_tx(&mut tx, &entry.episode_id).await?;

    let existing = fetch_all(&mut tx).await?;

    if existing.is_empty() {
        entry.position = 0;
    } else if replace_singleton && existing.len() == 1 {
        sqlx::query("DELETE FROM up_next_episodes")
            .execute(&mut *tx)
            .await?;
        entry.position = 0;
    } else {
        for (id, new_position) in position::shifted_positions(&existing, insert_position) {
            update_position(&mut tx, id, new_position).await?;
        }
        entry.position = position::insertion_index(existing.len(), insert_position);
    }

    insert_entry(&mut tx, &entry).await?;

    tx.commit().await?;

    Ok(())
}

/// Insert a batch of entries, preserving the given order.
///
/// Each insert is transactional on its own; the batch as a whole is not.
pub async fn insert_all(pool: &SqlitePool, entries: Vec<UpNextEntry>) -> Result<()> {
    for entry in entries {
        insert_at(pool, entry, InsertPosition::Last, false).await?;
    }

    Ok(())
}

/// Reconcile the queue against a full replacement ordering.
///
/// Difference-based: rows that survive keep their row id and only have their
/// position updated when it changed, new identities are inserted at their
/// index, and rows absent from the new list are deleted.
pub async fn save_all(pool: &SqlitePool, episodes: &[PlayableEpisode]) -> Result<()> {
    let mut tx = pool.begin().await?;

    let existing = fetch_all(&mut tx).await?;
    let uuid_to_row: HashMap<&str, &UpNextEntry> = existing
        .iter()
        .map(|e| (e.episode_id.as_str(), e))
        .collect();

    for (index, episode) in episodes.iter().enumerate() {
        let new_position = index as i64;
        match uuid_to_row.get(episode.id.as_str()) {
            Some(row) => {
                if row.position != new_position {
                    if let Some(id) = row.id {
                        update_position(&mut tx, id, new_position).await?;
                    }
                }
            }
            None => {
                let mut entry = UpNextEntry::from(episode);
                entry.position = new_position;
                insert_entry(&mut tx, &entry).await?;
            }
        }
    }

    // delete old entries that no longer exist in the new ordering
    let new_uuids: HashSet<&str> = episodes.iter().map(|e| e.id.as_str()).collect();
    for entry in &existing {
        if !new_uuids.contains(entry.episode_id.as_str()) {
            delete_by_episode_tx(&mut tx, &entry.episode_id).await?;
        }
    }

    tx.commit().await?;

    Ok(())
}

/// Remove the entry for an episode, closing the position gap it leaves
pub async fn delete_by_episode(pool: &SqlitePool, id: &EpisodeId) -> Result<()> {
    let mut tx = pool.begin().await?;

    delete_by_episode_tx(&mut tx, id).await?;

    // renumber the survivors so positions stay dense
    let remaining = fetch_all(&mut tx).await?;
    for (index, entry) in remaining.iter().enumerate() {
        let new_position = index as i64;
        if entry.position != new_position {
            if let Some(row_id) = entry.id {
                update_position(&mut tx, row_id, new_position).await?;
            }
        }
    }

    tx.commit().await?;

    Ok(())
}

/// Clear the queue
pub async fn delete_all(pool: &SqlitePool) -> Result<()> {
    sqlx::query("DELETE FROM up_next_episodes")
        .execute(pool)
        .await?;

    Ok(())
}

/// Remove everything except the position-0 entry; no-op on an empty queue
pub async fn delete_all_except_head(pool: &SqlitePool) -> Result<()> {
    let mut tx = pool.begin().await?;

    let Some(head) = fetch_all(&mut tx).await?.into_iter().next() else {
        return Ok(());
    };

    sqlx::query("DELETE FROM up_next_episodes WHERE episode_uuid != ?")
        .bind(head.episode_id.as_str())
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(())
}

/// The position-0 entry, or `None` when the queue is empty
pub async fn find_head(pool: &SqlitePool) -> Result<Option<UpNextEntry>> {
    let row = sqlx::query(
        "SELECT id, episode_uuid, kind, position FROM up_next_episodes
         ORDER BY position ASC LIMIT 1",
    )
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(entry_from_row))
}

/// Whether an episode is queued
pub async fn contains(pool: &SqlitePool, id: &EpisodeId) -> Result<bool> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM up_next_episodes WHERE episode_uuid = ?")
            .bind(id.as_str())
            .fetch_one(pool)
            .await?;

    Ok(count > 0)
}

/// Number of queued entries
pub async fn count(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM up_next_episodes")
        .fetch_one(pool)
        .await?;

    Ok(count)
}
