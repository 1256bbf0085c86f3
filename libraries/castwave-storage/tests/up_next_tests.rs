//! Integration tests for the Up Next queue vertical slice
//!
//! Covers insert-at-position semantics, deduplication, reconciliation
//! against a replacement ordering, and the dense-positions invariant.


use castwave_core::types::{EpisodeId, InsertPosition};
use castwave_storage::up_next;
use sqlx::Row;
use test_helpers::*;

#[tokio::test]
async fn test_insert_into_empty_queue_takes_position_zero() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    up_next::insert_at(pool, podcast_entry("a"), InsertPosition::Last, false)
        .await
        .unwrap();

    assert_eq!(queue_snapshot(pool).await, vec![("a".to_string(), 0)]);
}

#[tokio::test]
async fn test_play_next_keeps_current_head() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    seed_queue(pool, &["a", "b", "c"]).await;

    up_next::insert_at(pool, podcast_entry("d"), InsertPosition::Next, false)
        .await
        .unwrap();

    assert_eq!(
        queue_snapshot(pool).await,
        vec![
            ("a".to_string(), 0),
            ("d".to_string(), 1),
            ("b".to_string(), 2),
            ("c".to_string(), 3),
        ]
    );
}

#[tokio::test]
async fn test_play_top_displaces_current_head() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    seed_queue(pool, &["a", "b", "c"]).await;

    up_next::insert_at(pool, podcast_entry("d"), InsertPosition::Top, false)
        .await
        .unwrap();

    assert_eq!(
        queue_snapshot(pool).await,
        vec![
            ("d".to_string(), 0),
            ("a".to_string(), 1),
            ("b".to_string(), 2),
            ("c".to_string(), 3),
        ]
    );
}

#[tokio::test]
async fn test_play_last_appends() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    seed_queue(pool, &["a", "b"]).await;

    up_next::insert_at(pool, podcast_entry("c"), InsertPosition::Last, false)
        .await
        .unwrap();

    assert_eq!(
        queue_snapshot(pool).await,
        vec![
            ("a".to_string(), 0),
            ("b".to_string(), 1),
            ("c".to_string(), 2),
        ]
    );
}

#[tokio::test]
async fn test_replace_singleton_clears_the_single_entry() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    seed_queue(pool, &["a"]).await;

    up_next::insert_at(pool, podcast_entry("e"), InsertPosition::Top, true)
        .await
        .unwrap();

    assert_eq!(queue_snapshot(pool).await, vec![("e".to_string(), 0)]);
}

#[tokio::test]
async fn test_replace_singleton_ignored_with_multiple_entries() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    seed_queue(pool, &["a", "b"]).await;

    up_next::insert_at(pool, podcast_entry("e"), InsertPosition::Top, true)
        .await
        .unwrap();

    assert_eq!(
        queue_snapshot(pool).await,
        vec![
            ("e".to_string(), 0),
            ("a".to_string(), 1),
            ("b".to_string(), 2),
        ]
    );
}

#[tokio::test]
async fn test_inserting_queued_episode_moves_it_instead_of_duplicating() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    seed_queue(pool, &["a", "b", "c"]).await;

    // c is already queued at the tail; play-next must move it, not copy it
    up_next::insert_at(pool, podcast_entry("c"), InsertPosition::Next, false)
        .await
        .unwrap();

    assert_eq!(
        queue_snapshot(pool).await,
        vec![
            ("a".to_string(), 0),
            ("c".to_string(), 1),
            ("b".to_string(), 2),
        ]
    );
}

#[tokio::test]
async fn test_positions_stay_dense_across_mixed_inserts() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let inserts = [
        ("a", InsertPosition::Last),
        ("b", InsertPosition::Top),
        ("c", InsertPosition::Next),
        ("d", InsertPosition::Last),
        ("b", InsertPosition::Last), // re-insert moves the entry
        ("e", InsertPosition::Next),
        ("a", InsertPosition::Top),
    ];

    for (uuid, position) in inserts {
        up_next::insert_at(pool, podcast_entry(uuid), position, false)
            .await
            .unwrap();
        assert_positions_dense(pool).await;
    }

    assert_eq!(up_next::count(pool).await.unwrap(), 5);
}

#[tokio::test]
async fn test_insert_all_preserves_given_order() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    up_next::insert_all(
        pool,
        vec![podcast_entry("a"), podcast_entry("b"), podcast_entry("c")],
    )
    .await
    .unwrap();

    assert_eq!(
        queue_snapshot(pool).await,
        vec![
            ("a".to_string(), 0),
            ("b".to_string(), 1),
            ("c".to_string(), 2),
        ]
    );
}

#[tokio::test]
async fn test_save_all_reorders_inserts_and_deletes() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    seed_queue(pool, &["a", "b", "c"]).await;

    let b = create_podcast_episode(pool, "b", "Episode B").await;
    let d = create_podcast_episode(pool, "d", "Episode D").await;
    let a = create_podcast_episode(pool, "a", "Episode A").await;

    up_next::save_all(pool, &[b, d, a]).await.unwrap();

    assert_eq!(
        queue_snapshot(pool).await,
        vec![
            ("b".to_string(), 0),
            ("d".to_string(), 1),
            ("a".to_string(), 2),
        ]
    );
}

#[tokio::test]
async fn test_save_all_keeps_row_identity_of_survivors() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    seed_queue(pool, &["a", "b", "c"]).await;

    let row_ids_before: Vec<(String, i64)> =
        sqlx::query("SELECT episode_uuid, id FROM up_next_episodes")
            .fetch_all(pool)
            .await
            .unwrap()
            .iter()
            .map(|row| (row.get("episode_uuid"), row.get("id")))
            .collect();

    let b = create_podcast_episode(pool, "b", "Episode B").await;
    let d = create_podcast_episode(pool, "d", "Episode D").await;
    let a = create_podcast_episode(pool, "a", "Episode A").await;

    up_next::save_all(pool, &[b, d, a]).await.unwrap();

    let row_ids_after: Vec<(String, i64)> =
        sqlx::query("SELECT episode_uuid, id FROM up_next_episodes")
            .fetch_all(pool)
            .await
            .unwrap()
            .iter()
            .map(|row| (row.get("episode_uuid"), row.get("id")))
            .collect();

    // a and b were reordered in place, not deleted and reinserted
    for uuid in ["a", "b"] {
        let before = row_ids_before.iter().find(|(u, _)| u == uuid).unwrap().1;
        let after = row_ids_after.iter().find(|(u, _)| u == uuid).unwrap().1;
        assert_eq!(before, after, "row identity of {uuid} changed");
    }
    assert!(!row_ids_after.iter().any(|(u, _)| u == "c"));
}

#[tokio::test]
async fn test_delete_by_episode_closes_the_gap() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    seed_queue(pool, &["a", "b", "c"]).await;

    up_next::delete_by_episode(pool, &EpisodeId::new("b"))
        .await
        .unwrap();

    assert_eq!(
        queue_snapshot(pool).await,
        vec![("a".to_string(), 0), ("c".to_string(), 1)]
    );
}

#[tokio::test]
async fn test_delete_all_except_head() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    seed_queue(pool, &["a", "b", "c"]).await;

    up_next::delete_all_except_head(pool).await.unwrap();

    assert_eq!(queue_snapshot(pool).await, vec![("a".to_string(), 0)]);
}

#[tokio::test]
async fn test_delete_all_except_head_on_empty_queue_is_noop() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    up_next::delete_all_except_head(pool).await.unwrap();

    assert_eq!(up_next::count(pool).await.unwrap(), 0);
}

#[tokio::test]
async fn test_queries() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    assert!(up_next::find_head(pool).await.unwrap().is_none());

    seed_queue(pool, &["a", "b"]).await;

    let head = up_next::find_head(pool).await.unwrap().unwrap();
    assert_eq!(head.episode_id.as_str(), "a");
    assert_eq!(head.position, 0);

    assert!(up_next::contains(pool, &EpisodeId::new("b")).await.unwrap());
    assert!(!up_next::contains(pool, &EpisodeId::new("z")).await.unwrap());
    assert_eq!(up_next::count(pool).await.unwrap(), 2);

    up_next::delete_all(pool).await.unwrap();
    assert_eq!(up_next::count(pool).await.unwrap(), 0);
}
