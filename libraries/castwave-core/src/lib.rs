//! Castwave Core
//!
//! Platform-agnostic core types, traits, and error handling for Castwave.
//!
//! This crate provides the foundational building blocks shared by the
//! storage, playback, and sync crates.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `PlayableEpisode`, `UpNextEntry`, `SourceLocation`, etc.
//! - **Core Traits**: `UpNextQueue`
//! - **Error Handling**: Unified `CastError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use castwave_core::types::{EpisodeId, EpisodeKind, UpNextEntry};
//!
//! let entry = UpNextEntry::new(EpisodeId::generate(), EpisodeKind::Podcast);
//! assert_eq!(entry.position, 0);
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{CastError, Result};
pub use traits::UpNextQueue;

pub use types::{
    EpisodeId, EpisodeKind, InsertPosition, PlayableEpisode, SourceLocation, UpNextEntry,
};
