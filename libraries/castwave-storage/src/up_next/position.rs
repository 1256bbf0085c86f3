//! Position renumbering for queue inserts
//!
//! Pure functions so the renumbering rules are testable without a database.
//! The queue invariant they uphold: after applying the shifts and inserting
//! the new entry at `insertion_index`, positions are exactly `0..n`.

use castwave_core::types::{InsertPosition, UpNextEntry};

/// The position the new entry takes, given the queue size after deduplication
pub fn insertion_index(existing_len: usize, insert_position: InsertPosition) -> i64 {
    match insert_position {
        InsertPosition::Top => 0,
        InsertPosition::Next => 1,
        InsertPosition::Last => existing_len as i64,
    }
}

/// New `(row id, position)` pairs for existing rows that have to move.
///
/// - `Top` shifts every entry down one slot
/// - `Next` keeps the head at position 0; everything from position 1 onward
///   shifts down one slot instead
/// - `Last` moves nothing, the new entry takes the next free slot
///
/// Rows whose position is unchanged are omitted.
pub fn shifted_positions(
    existing: &[UpNextEntry],
    insert_position: InsertPosition,
) -> Vec<(i64, i64)> {
    if insert_position == InsertPosition::Last {
        return Vec::new();
    }

    existing
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let new_position = if insert_position == InsertPosition::Next && index == 0 {
                // play next keeps the currently playing episode at position 0
                0
            } else {
                index as i64 + 1
            };
            let id = entry.id?;
            (new_position != entry.position).then_some((id, new_position))
        })
        .collect()
}
