//! Castwave Storage
//!
//! `SQLite` database layer for the Castwave Up Next queue.
//!
//! This crate persists the ordered play queue and resolves queue identities
//! against the podcast-episode and user-episode tables.
//!
//! # Architecture
//!
//! - **Vertical Slicing**: Each feature owns its own queries and logic
//!   (`up_next` for the queue, `episodes` for identity resolution)
//! - **Transactional**: Every queue mutation commits atomically; readers
//!   never observe a partially renumbered queue
//!
//! # Example
//!
//! ```rust,no_run
//! use castwave_core::UpNextQueue;
//! use castwave_storage::{create_pool, run_migrations, Database};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("sqlite://castwave.db").await?;
//! run_migrations(&pool).await?;
//!
//! let db = Database::new(pool);
//! let queue = db.all().await?;
//! # Ok(())
//! # }
//! ```

mod database;
mod error;

// Vertical slices
pub mod episodes;
pub mod up_next;

pub use database::Database;
pub use error::StorageError;

use sqlx::sqlite::SqlitePool;

/// Run database migrations
///
/// Migrations are embedded so they run reliably across execution contexts.
/// Each statement is idempotent; call once at application start.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), StorageError> {
    const MIGRATIONS: &[&str] = &[
        include_str!("../migrations/20250601000001_create_up_next_episodes.sql"),
        include_str!("../migrations/20250601000002_create_podcast_episodes.sql"),
        include_str!("../migrations/20250601000003_create_user_episodes.sql"),
    ];

    for migration in MIGRATIONS {
        sqlx::query(migration)
            .execute(pool)
            .await
            .map_err(|e| StorageError::Migration(e.to_string()))?;
    }

    Ok(())
}

/// Create a new `SQLite` pool
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `sqlite://castwave.db`)
///
/// # Errors
///
/// Returns an error if the connection fails
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}
