//! Credential storage for signed-in accounts.
//!
//! The platform account manager is abstracted behind `CredentialStore`:
//! a durable key-value association of account email to refresh token,
//! cached access token, and arbitrary string metadata. Only per-key
//! atomicity is assumed.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::Result;

/// User-data key holding the account's user uuid
pub const USER_UUID_KEY: &str = "user_uuid";

/// User-data key holding the client id the tokens were issued for
pub const CLIENT_ID_KEY: &str = "client_id";

/// Durable credential storage, one record per account email.
///
/// The refresh token lives in the password slot, matching how platform
/// account managers store long-lived secrets.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Create the account record with its refresh token
    async fn add_account(&self, email: &str, refresh_token: &str) -> Result<()>;

    /// The stored refresh token, if the account exists
    async fn password(&self, email: &str) -> Result<Option<String>>;

    /// Overwrite the stored refresh token
    async fn set_password(&self, email: &str, refresh_token: &str) -> Result<()>;

    /// The cached access token, if one is set
    async fn peek_token(&self, email: &str) -> Result<Option<String>>;

    /// Cache a new access token
    async fn set_token(&self, email: &str, access_token: &str) -> Result<()>;

    /// Drop the cached access token, forcing a refresh on next use
    async fn invalidate_token(&self, email: &str) -> Result<()>;

    /// Read a string metadata value
    async fn user_data(&self, email: &str, key: &str) -> Result<Option<String>>;

    /// Write a string metadata value
    async fn set_user_data(&self, email: &str, key: &str, value: &str) -> Result<()>;
}

#[derive(Default)]
struct AccountRecord {
    refresh_token: String,
    access_token: Option<String>,
    user_data: HashMap<String, String>,
}

/// In-memory credential store for tests and embedders without a platform
/// account manager.
#[derive(Default)]
pub struct MemoryCredentialStore {
    accounts: Mutex<HashMap<String, AccountRecord>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn add_account(&self, email: &str, refresh_token: &str) -> Result<()> {
        let mut accounts = self.accounts.lock().unwrap();
        let record = accounts.entry(email.to_string()).or_default();
        record.refresh_token = refresh_token.to_string();
        Ok(())
    }

    async fn password(&self, email: &str) -> Result<Option<String>> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts.get(email).map(|r| r.refresh_token.clone()))
    }

    async fn set_password(&self, email: &str, refresh_token: &str) -> Result<()> {
        let mut accounts = self.accounts.lock().unwrap();
        let record = accounts.entry(email.to_string()).or_default();
        record.refresh_token = refresh_token.to_string();
        Ok(())
    }

    async fn peek_token(&self, email: &str) -> Result<Option<String>> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts.get(email).and_then(|r| r.access_token.clone()))
    }

    async fn set_token(&self, email: &str, access_token: &str) -> Result<()> {
        let mut accounts = self.accounts.lock().unwrap();
        let record = accounts.entry(email.to_string()).or_default();
        record.access_token = Some(access_token.to_string());
        Ok(())
    }

    async fn invalidate_token(&self, email: &str) -> Result<()> {
        let mut accounts = self.accounts.lock().unwrap();
        if let Some(record) = accounts.get_mut(email) {
            record.access_token = None;
        }
        Ok(())
    }

    async fn user_data(&self, email: &str, key: &str) -> Result<Option<String>> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts
            .get(email)
            .and_then(|r| r.user_data.get(key).cloned()))
    }

    async fn set_user_data(&self, email: &str, key: &str, value: &str) -> Result<()> {
        let mut accounts = self.accounts.lock().unwrap();
        let record = accounts.entry(email.to_string()).or_default();
        record.user_data.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
