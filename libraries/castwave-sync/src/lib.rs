//! Castwave Sync
//!
//! Sync-server HTTP client and account authentication for Castwave.
//!
//! This crate provides:
//! - `SyncClient`: login, registration, token exchange/refresh, and the
//!   legacy authorize endpoint, with typed HTTP failures
//! - `AccountAuth`: sign-in flows plus the post-sign-in side-effect sequence
//! - `AccountAuthenticator`: silent refresh with a one-shot legacy fallback
//! - `CredentialStore`: the platform account-manager seam, with an in-memory
//!   implementation for tests
//!
//! # Example
//!
//! ```rust,ignore
//! use castwave_sync::{AccountAuth, SyncClient, SyncServerConfig};
//!
//! let client = SyncClient::new(SyncServerConfig::new("https://api.castwave.example"))?;
//! let auth = AccountAuth::new(client, credentials, settings, podcasts);
//! let tokens = auth.sign_in("user@example.com", "hunter2").await?;
//! ```

#![forbid(unsafe_code)]

mod auth;
mod authenticator;
mod client;
mod credentials;
mod error;
mod types;

pub use auth::{
    login_failure_message, AccountAuth, PodcastManager, SyncSettings, CLIENT_ID_CASTWAVE,
};
pub use authenticator::AccountAuthenticator;
pub use client::SyncClient;
pub use credentials::{CredentialStore, MemoryCredentialStore, CLIENT_ID_KEY, USER_UUID_KEY};
pub use error::{Result, SyncError};
pub use types::{
    AuthorizeRequest, AuthorizeResponse, ErrorBody, LoginRequest, LoginResponse, RegisterResponse,
    SyncServerConfig, TokenPair, TokenRequest, TokenResponse, UserIdResponse,
};
