//! Silent token refresh with legacy fallback.
//!
//! `AccountAuthenticator` answers "give me a valid access token for this
//! account". The cached token wins; otherwise the refresh token is traded
//! in, and when the primary refresh path rejects Castwave's own client id,
//! the legacy authorize-then-exchange protocol is tried exactly once.

use std::sync::Arc;

use tracing::{debug, error};

use crate::auth::{AccountAuth, CLIENT_ID_CASTWAVE};
use crate::credentials::{CredentialStore, CLIENT_ID_KEY};
use crate::error::{Result, SyncError};
use crate::types::TokenResponse;

/// Silent authenticator over the credential store.
pub struct AccountAuthenticator {
    auth: Arc<AccountAuth>,
    credentials: Arc<dyn CredentialStore>,
}

impl AccountAuthenticator {
    pub fn new(auth: Arc<AccountAuth>, credentials: Arc<dyn CredentialStore>) -> Self {
        Self { auth, credentials }
    }

    /// A valid access token for the account, refreshing if necessary.
    pub async fn access_token(&self, email: &str) -> Result<String> {
        if let Some(token) = self.credentials.peek_token(email).await? {
            if !token.is_empty() {
                return Ok(token);
            }
        }

        let refresh_token = self
            .credentials
            .password(email)
            .await?
            .ok_or_else(|| SyncError::MissingCredentials(email.to_string()))?;
        let client_id = self
            .credentials
            .user_data(email, CLIENT_ID_KEY)
            .await?
            .unwrap_or_else(|| CLIENT_ID_CASTWAVE.to_string());

        let response = match self
            .auth
            .token_using_refresh_token(&refresh_token, &client_id)
            .await
        {
            Ok(response) => response,
            // only our own identity provider has the legacy protocol; a
            // third-party rejection propagates untouched
            Err(SyncError::Unauthorized { .. }) if client_id == CLIENT_ID_CASTWAVE => {
                error!("Failed to refresh token, trying legacy method");
                self.legacy_token(email, &refresh_token).await?
            }
            Err(e) => return Err(e),
        };

        debug!("Successfully refreshed access token");
        self.credentials
            .set_token(email, &response.access_token)
            .await?;
        if let Some(new_refresh_token) = &response.refresh_token {
            self.credentials
                .set_password(email, new_refresh_token)
                .await?;
        }

        Ok(response.access_token)
    }

    /// Legacy authorize-then-exchange, reusing the stored secret.
    async fn legacy_token(&self, email: &str, secret: &str) -> Result<TokenResponse> {
        let authorize = self
            .auth
            .authorize_with_email_and_password(email, secret)
            .await?;
        self.auth
            .token_using_authorization_code(&authorize.code, CLIENT_ID_CASTWAVE)
            .await
    }
}
