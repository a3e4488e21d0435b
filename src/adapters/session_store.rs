//! In-memory session store refreshing against the conversation backend.
//!
//! Credentials live only in memory; the host hands in the initial session and
//! may persist whatever it observes through [`CredentialStore::subscribe`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

use crate::auth::Credentials;
use crate::traits::{CredentialStore, CredentialsError, NetworkTransport, Request};

/// Response from `POST /auth/refresh`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Lifetime in seconds; decoded from the JWT when absent.
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub user_id: Option<String>,
}

pub struct SessionCredentialStore {
    transport: Arc<dyn NetworkTransport>,
    refresh_url: String,
    credentials: watch::Sender<Option<Credentials>>,
}

impl SessionCredentialStore {
    /// Store refreshing via `{api_base_url}/auth/refresh`.
    pub fn new(transport: Arc<dyn NetworkTransport>, api_base_url: &str) -> Self {
        let (credentials, _) = watch::channel(None);
        Self {
            transport,
            refresh_url: format!("{}/auth/refresh", api_base_url.trim_end_matches('/')),
            credentials,
        }
    }

    /// Start from an existing session.
    pub fn with_credentials(self, credentials: Credentials) -> Self {
        self.credentials.send_replace(Some(credentials));
        self
    }

    pub fn refresh_url(&self) -> &str {
        &self.refresh_url
    }

    /// Merge a token response into the previous session.
    fn credentials_from(token: TokenResponse, previous: Option<Credentials>) -> Credentials {
        let previous = previous.unwrap_or_default();
        let expires_at = token
            .expires_in
            .map(|secs| chrono::Utc::now().timestamp() + secs);

        Credentials {
            access_token: Some(token.access_token),
            refresh_token: token.refresh_token.or(previous.refresh_token),
            expires_at,
            user_id: token.user_id.or(previous.user_id),
            level: previous.level,
        }
        .with_jwt_expiry()
    }
}

#[async_trait]
impl CredentialStore for SessionCredentialStore {
    fn current_credentials(&self) -> Option<Credentials> {
        self.credentials.borrow().clone()
    }

    async fn refresh(&self) -> Result<Credentials, CredentialsError> {
        let current = self.current_credentials();
        let refresh_token = current
            .as_ref()
            .and_then(|c| c.refresh_token.clone())
            .ok_or(CredentialsError::NoRefreshToken)?;

        let request = Request::post(&self.refresh_url).with_json(&serde_json::json!({
            "refresh_token": refresh_token,
        }));

        let response = self
            .transport
            .send(&request)
            .await
            .map_err(|e| CredentialsError::Transport(e.to_string()))?;

        if !response.is_success() {
            let message = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(CredentialsError::RefreshRejected(format!(
                "HTTP {}: {}",
                response.status, message
            )));
        }

        let token: TokenResponse = response
            .json()
            .map_err(|e| CredentialsError::Serialization(e.to_string()))?;

        tracing::debug!(user_id = ?token.user_id, "Refresh endpoint returned new token");
        Ok(Self::credentials_from(token, current))
    }

    fn subscribe(&self) -> watch::Receiver<Option<Credentials>> {
        self.credentials.subscribe()
    }

    fn store(&self, credentials: Credentials) {
        self.credentials.send_replace(Some(credentials));
    }

    fn invalidate(&self) {
        self.credentials.send_modify(|current| {
            if let Some(credentials) = current {
                *credentials = credentials.without_access_token();
            }
        });
    }
}
