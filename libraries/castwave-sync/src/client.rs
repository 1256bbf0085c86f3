//! HTTP client for the sync server.

use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Result, SyncError};
use crate::types::{
    AuthorizeRequest, AuthorizeResponse, ErrorBody, LoginRequest, LoginResponse, RegisterResponse,
    SyncServerConfig, TokenRequest, TokenResponse, UserIdResponse,
};

/// Scope requested on login
const LOGIN_SCOPE: &str = "mobile";

/// Client for the sync server's account and token endpoints.
pub struct SyncClient {
    http: Client,
    base_url: String,
}

impl SyncClient {
    /// Create a new client with the given configuration.
    pub fn new(config: SyncServerConfig) -> Result<Self> {
        if config.url.is_empty() {
            return Err(SyncError::InvalidUrl("URL cannot be empty".into()));
        }

        let base_url = config.url.trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(SyncError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("Castwave/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, base_url })
    }

    /// Login with email and password.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let url = format!("{}/user/login", self.base_url);
        debug!(url = %url, email = %email, "Attempting login");

        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
            scope: LOGIN_SCOPE.to_string(),
        };

        let response = self.http.post(&url).json(&request).send().await?;
        let response: LoginResponse = Self::parse(response).await?;

        info!(email = %response.email, uuid = %response.uuid, "Login successful");
        Ok(response)
    }

    /// Exchange an authorization code or refresh token for new tokens.
    pub async fn token(&self, request: &TokenRequest) -> Result<TokenResponse> {
        let url = format!("{}/user/token", self.base_url);
        debug!(url = %url, grant_type = %request.grant_type, "Requesting tokens");

        let response = self.http.post(&url).json(request).send().await?;
        Self::parse(response).await
    }

    /// Legacy authorize: trade email and password for a one-shot code.
    pub async fn authorize(
        &self,
        email: &str,
        password: &str,
        client_id: &str,
    ) -> Result<AuthorizeResponse> {
        let url = format!("{}/user/authorize", self.base_url);
        debug!(url = %url, "Requesting authorization code");

        let state = Uuid::new_v4().to_string();
        let request = AuthorizeRequest {
            response_type: "code".to_string(),
            client_id: client_id.to_string(),
            state: state.clone(),
            email: email.to_string(),
            password: password.to_string(),
        };

        let response = self.http.post(&url).json(&request).send().await?;
        let response: AuthorizeResponse = Self::parse(response).await?;

        if response.state != state {
            return Err(SyncError::Parse(
                "Authorize response state does not match the request".to_string(),
            ));
        }

        Ok(response)
    }

    /// Register a new account.
    pub async fn register(&self, email: &str, password: &str) -> Result<RegisterResponse> {
        let url = format!("{}/user/register", self.base_url);
        debug!(url = %url, email = %email, "Registering account");

        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
            scope: LOGIN_SCOPE.to_string(),
        };

        let response = self.http.post(&url).json(&request).send().await?;
        Self::parse(response).await
    }

    /// Fetch the signed-in user's identity.
    pub async fn user_uuid(&self, access_token: &str) -> Result<UserIdResponse> {
        let url = format!("{}/user", self.base_url);
        debug!(url = %url, "Fetching user identity");

        let response = self.http.get(&url).bearer_auth(access_token).send().await?;
        Self::parse(response).await
    }

    /// Decode a success body or turn the failure status into a typed error.
    async fn parse<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| SyncError::Parse(e.to_string()));
        }

        // the server attaches {errorMessage, errorMessageId} when it can
        let body = response.text().await.unwrap_or_default();
        let error_body: Option<ErrorBody> = serde_json::from_str(&body).ok();
        let (message, message_id) = match error_body {
            Some(body) => (body.message, body.message_id),
            None => ((!body.is_empty()).then_some(body), None),
        };

        warn!(status = %status, message = ?message, "Sync server request failed");

        if status == StatusCode::UNAUTHORIZED {
            Err(SyncError::Unauthorized {
                message,
                message_id,
            })
        } else {
            Err(SyncError::Http {
                status: status.as_u16(),
                message,
                message_id,
            })
        }
    }
}
