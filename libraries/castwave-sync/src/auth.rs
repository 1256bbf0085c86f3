//! Account authentication flows.
//!
//! `AccountAuth` owns sign-in, registration, and the token passthroughs.
//! A successful sign-in runs a fixed side-effect sequence; the sign-in is
//! not finished until every step has completed.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::client::SyncClient;
use crate::credentials::{CredentialStore, CLIENT_ID_KEY, USER_UUID_KEY};
use crate::error::{Result, SyncError};
use crate::types::{AuthorizeResponse, TokenPair, TokenRequest, TokenResponse};

/// Client id of Castwave's own identity provider
pub const CLIENT_ID_CASTWAVE: &str = "castwave";

/// Refresh reason recorded when a sign-in triggers it
const REFRESH_REASON_LOGIN: &str = "login";

/// Sync-related settings mutated after a successful sign-in.
#[async_trait]
pub trait SyncSettings: Send + Sync {
    /// Record that account credentials now live in the credential store
    async fn set_used_credential_store(&self, used: bool);

    /// Reset the incremental-sync watermark
    async fn clear_last_modified(&self);

    /// Forget when the last full refresh ran
    async fn clear_last_refresh_time(&self);
}

/// Podcast subscriptions collaborator.
#[async_trait]
pub trait PodcastManager: Send + Sync {
    /// Flag every known podcast as needing re-sync
    async fn mark_all_podcasts_unsynced(&self);

    /// Fire-and-forget refresh trigger; `reason` tags the run
    async fn refresh_podcasts(&self, reason: &str);
}

/// Account authentication against the sync server.
pub struct AccountAuth {
    client: SyncClient,
    credentials: Arc<dyn CredentialStore>,
    settings: Arc<dyn SyncSettings>,
    podcasts: Arc<dyn PodcastManager>,
}

impl AccountAuth {
    pub fn new(
        client: SyncClient,
        credentials: Arc<dyn CredentialStore>,
        settings: Arc<dyn SyncSettings>,
        podcasts: Arc<dyn PodcastManager>,
    ) -> Self {
        Self {
            client,
            credentials,
            settings,
            podcasts,
        }
    }

    /// Sign in with email and password.
    ///
    /// Failures are never retried here; the caller decides what to surface.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<TokenPair> {
        let response = match self.client.login(email, password).await {
            Ok(response) => response,
            Err(e) => {
                warn!(email = %email, error = %e, "Sign in failed");
                return Err(e);
            }
        };

        let pair = TokenPair {
            access_token: response.access_token.clone(),
            refresh_token: Some(response.refresh_token.clone()),
            client_id: CLIENT_ID_CASTWAVE.to_string(),
            expiry: chrono::Utc::now() + chrono::Duration::seconds(response.expires_in),
        };

        self.sign_in_successful(
            &response.uuid,
            email,
            Some(&response.refresh_token),
            &response.access_token,
            CLIENT_ID_CASTWAVE,
        )
        .await?;

        Ok(pair)
    }

    /// Sign in via a third-party identity token.
    ///
    /// The token is exchanged as an authorization code under that provider's
    /// client id, then the same post-sign-in sequence runs.
    pub async fn sign_in_with_id_token(
        &self,
        email: &str,
        id_token: &str,
        client_id: &str,
    ) -> Result<TokenPair> {
        let response = self.token_using_authorization_code(id_token, client_id).await?;
        let user = self.client.user_uuid(&response.access_token).await?;

        self.sign_in_successful(
            &user.id,
            email,
            response.refresh_token.as_deref(),
            &response.access_token,
            client_id,
        )
        .await?;

        Ok(TokenPair::from_response(&response, client_id))
    }

    /// Register a new account.
    ///
    /// Failures are a typed error the caller must handle; nothing is
    /// swallowed.
    pub async fn register(&self, email: &str, password: &str) -> Result<String> {
        let response = self.client.register(email, password).await?;
        info!(email = %email, "Account registered");
        Ok(response.uuid)
    }

    /// Exchange an authorization code for tokens.
    pub async fn token_using_authorization_code(
        &self,
        code: &str,
        client_id: &str,
    ) -> Result<TokenResponse> {
        self.client
            .token(&TokenRequest::authorization_code(code, client_id))
            .await
    }

    /// Refresh an access token.
    pub async fn token_using_refresh_token(
        &self,
        refresh_token: &str,
        client_id: &str,
    ) -> Result<TokenResponse> {
        self.client
            .token(&TokenRequest::refresh(refresh_token, client_id))
            .await
    }

    /// Legacy authorize: trade credentials for a one-shot code.
    pub async fn authorize_with_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthorizeResponse> {
        self.client
            .authorize(email, password, CLIENT_ID_CASTWAVE)
            .await
    }

    /// Post-sign-in side effects, in order. All steps must complete before
    /// the sign-in counts as finished.
    async fn sign_in_successful(
        &self,
        user_uuid: &str,
        email: &str,
        refresh_token: Option<&str>,
        access_token: &str,
        client_id: &str,
    ) -> Result<()> {
        info!(client_id = %client_id, "Signed in successfully");

        if let Some(refresh_token) = refresh_token {
            info!(email = %email, "Saving account to the credential store");
            self.credentials.add_account(email, refresh_token).await?;
            self.credentials.set_token(email, access_token).await?;
            self.credentials
                .set_user_data(email, USER_UUID_KEY, user_uuid)
                .await?;
            self.credentials
                .set_user_data(email, CLIENT_ID_KEY, client_id)
                .await?;
            self.settings.set_used_credential_store(true).await;
        } else {
            error!("Sign in marked as successful but no refresh token came back");
        }

        self.settings.clear_last_modified().await;
        self.settings.clear_last_refresh_time().await;
        self.podcasts.mark_all_podcasts_unsynced().await;
        self.podcasts.refresh_podcasts(REFRESH_REASON_LOGIN).await;

        Ok(())
    }
}

/// Resolve a sign-in failure to something the user can read.
///
/// Server message ids win, then the raw server message, then a local
/// fallback.
pub fn login_failure_message(error: &SyncError) -> String {
    let (message, message_id) = match error {
        SyncError::Unauthorized {
            message,
            message_id,
        }
        | SyncError::Http {
            message,
            message_id,
            ..
        } => (message.as_deref(), message_id.as_deref()),
        _ => (None, None),
    };

    message_id
        .and_then(localized_message)
        .or(message)
        .unwrap_or("Login failed")
        .to_string()
}

/// Local messages for the server's known message ids
fn localized_message(message_id: &str) -> Option<&'static str> {
    match message_id {
        "login_password_incorrect" => Some("Incorrect email or password"),
        "login_email_not_found" => Some("No account found for that email address"),
        "login_account_locked" => Some("Account locked, try again later"),
        "login_throttled" => Some("Too many attempts, try again later"),
        _ => None,
    }
}
