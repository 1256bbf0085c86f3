//! Episode resolution vertical slice
//!
//! Queue rows only store identities. This slice resolves those identities
//! against the podcast-episode and user-episode tables and keeps the two
//! tables writable for the import/sync paths.

use std::collections::HashMap;

use castwave_core::types::{EpisodeId, EpisodeKind, PlayableEpisode};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::error::Result;
use crate::up_next;

fn episode_from_row(row: &SqliteRow, kind: EpisodeKind) -> PlayableEpisode {
    PlayableEpisode {
        id: EpisodeId::new(row.get::<String, _>("uuid")),
        kind,
        title: row.get("title"),
        download_url: row.get("download_url"),
        downloaded_file_path: row.get("downloaded_file_path"),
        is_hls: row.get::<i64, _>("is_hls") != 0,
        duration_ms: row.get::<Option<i64>, _>("duration_ms").map(|d| d as u64),
        played_up_to_ms: row.get::<i64, _>("played_up_to_ms") as u64,
    }
}

fn table_for(kind: EpisodeKind) -> &'static str {
    match kind {
        EpisodeKind::Podcast => "podcast_episodes",
        EpisodeKind::User => "user_episodes",
    }
}

/// Insert or update an episode row in the table matching its kind
pub async fn upsert(pool: &SqlitePool, episode: &PlayableEpisode) -> Result<()> {
    let sql = format!(
        "INSERT INTO {} (uuid, title, download_url, downloaded_file_path, is_hls, duration_ms, played_up_to_ms)
         VALUES (?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT(uuid) DO UPDATE SET
             title = excluded.title,
             download_url = excluded.download_url,
             downloaded_file_path = excluded.downloaded_file_path,
             is_hls = excluded.is_hls,
             duration_ms = excluded.duration_ms,
             played_up_to_ms = excluded.played_up_to_ms",
        table_for(episode.kind)
    );

    sqlx::query(&sql)
        .bind(episode.id.as_str())
        .bind(&episode.title)
        .bind(&episode.download_url)
        .bind(&episode.downloaded_file_path)
        .bind(i64::from(episode.is_hls))
        .bind(episode.duration_ms.map(|d| d as i64))
        .bind(episode.played_up_to_ms as i64)
        .execute(pool)
        .await?;

    Ok(())
}

async fn find_in_table(
    pool: &SqlitePool,
    kind: EpisodeKind,
    ids: &[&str],
) -> Result<Vec<PlayableEpisode>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql = format!(
        "SELECT uuid, title, download_url, downloaded_file_path, is_hls, duration_ms, played_up_to_ms
         FROM {} WHERE uuid IN ({placeholders})",
        table_for(kind)
    );

    let mut query = sqlx::query(&sql);
    for id in ids {
        query = query.bind(*id);
    }

    let rows = query.fetch_all(pool).await?;

    Ok(rows.iter().map(|row| episode_from_row(row, kind)).collect())
}

/// Find a single episode by identity, checking both episode tables
pub async fn find_by_id(pool: &SqlitePool, id: &EpisodeId) -> Result<Option<PlayableEpisode>> {
    let ids = [id.as_str()];

    let mut found = find_in_table(pool, EpisodeKind::Podcast, &ids).await?;
    if found.is_empty() {
        found = find_in_table(pool, EpisodeKind::User, &ids).await?;
    }

    Ok(found.into_iter().next())
}

/// Resolve the first `limit` queue identities to playable episodes, in play
/// order.
///
/// The user-episode table is only consulted when the podcast join comes up
/// short. Identities that resolve to neither table are silently dropped:
/// the episode was deleted underneath the queue, which is tolerated rather
/// than treated as an error.
pub async fn resolved_episodes(pool: &SqlitePool, limit: i64) -> Result<Vec<PlayableEpisode>> {
    let entries = up_next::limited(pool, limit).await?;
    if entries.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<&str> = entries.iter().map(|e| e.episode_id.as_str()).collect();
    let id_to_position: HashMap<&str, i64> = entries
        .iter()
        .map(|e| (e.episode_id.as_str(), e.position))
        .collect();

    let mut resolved = find_in_table(pool, EpisodeKind::Podcast, &ids).await?;
    if resolved.len() != entries.len() {
        resolved.extend(find_in_table(pool, EpisodeKind::User, &ids).await?);
    }

    resolved.sort_by_key(|episode| {
        id_to_position
            .get(episode.id.as_str())
            .copied()
            .unwrap_or(i64::MAX)
    });

    Ok(resolved)
}
