//! Types for sync server API requests and responses.
//!
//! The token endpoint field names (`grant_type`, `code`, `refresh_token`,
//! `client_id`, `access_token`, `expires_in`) are a fixed contract with the
//! backend and must not change.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Configuration for connecting to the sync server.
#[derive(Debug, Clone)]
pub struct SyncServerConfig {
    /// Base URL of the server (e.g., "https://api.castwave.example")
    pub url: String,
}

impl SyncServerConfig {
    /// Create a new server config with just the URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

// =============================================================================
// Authentication Types
// =============================================================================

/// Request body for the login endpoint.
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub scope: String,
}

/// Response from a successful login.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub email: String,
    pub uuid: String,
    pub is_new: bool,
    /// Token validity in seconds
    pub expires_in: i64,
}

/// Request body for the token endpoint, covering both grant types.
#[derive(Debug, Serialize)]
pub struct TokenRequest {
    /// Either "refresh_token" or "authorization_code"
    pub grant_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

impl TokenRequest {
    /// Exchange an authorization code for tokens.
    pub fn authorization_code(code: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            grant_type: "authorization_code".to_string(),
            code: Some(code.into()),
            refresh_token: None,
            client_id: Some(client_id.into()),
        }
    }

    /// Refresh an access token.
    pub fn refresh(refresh_token: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            grant_type: "refresh_token".to_string(),
            code: None,
            refresh_token: Some(refresh_token.into()),
            client_id: Some(client_id.into()),
        }
    }
}

/// Response from the token endpoint.
///
/// `refresh_token` is legitimately absent in some refresh responses; the
/// caller keeps its stored token in that case.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: i64,
}

/// Request body for the legacy authorize endpoint.
#[derive(Debug, Serialize)]
pub struct AuthorizeRequest {
    pub response_type: String,
    pub client_id: String,
    pub state: String,
    pub email: String,
    pub password: String,
}

/// Response from the legacy authorize endpoint.
#[derive(Debug, Deserialize)]
pub struct AuthorizeResponse {
    pub code: String,
    pub state: String,
}

/// Response from account registration.
#[derive(Debug, Deserialize)]
pub struct RegisterResponse {
    pub uuid: String,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

/// Response carrying the signed-in user's identity.
#[derive(Debug, Deserialize)]
pub struct UserIdResponse {
    pub id: String,
}

/// Error body the server attaches to failed requests.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(rename = "errorMessage")]
    pub message: Option<String>,
    #[serde(rename = "errorMessageId")]
    pub message_id: Option<String>,
}

// =============================================================================
// Token Pair
// =============================================================================

/// Access/refresh token pair produced by the auth flows.
///
/// Held transiently; durable storage belongs to the credential store.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Which identity provider issued the tokens
    pub client_id: String,
    pub expiry: DateTime<Utc>,
}

impl TokenPair {
    /// Build a pair from a token response, stamping the expiry.
    pub fn from_response(response: &TokenResponse, client_id: impl Into<String>) -> Self {
        Self {
            access_token: response.access_token.clone(),
            refresh_token: response.refresh_token.clone(),
            client_id: client_id.into(),
            expiry: Utc::now() + Duration::seconds(response.expires_in),
        }
    }
}
