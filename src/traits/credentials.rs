//! Credential store trait abstraction.
//!
//! The host application owns the session; the core reads credentials from the
//! store, asks it to refresh them, and tells it when a token stopped working.

use async_trait::async_trait;
use tokio::sync::watch;

use crate::auth::Credentials;

/// Credential store operation errors.
#[derive(Debug, Clone, PartialEq)]
pub enum CredentialsError {
    /// The backend rejected the refresh token
    RefreshRejected(String),
    /// No refresh token is available for this session
    NoRefreshToken,
    /// The refresh request could not be delivered
    Transport(String),
    /// The refresh response could not be parsed
    Serialization(String),
    /// Other error
    Other(String),
}

impl std::fmt::Display for CredentialsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialsError::RefreshRejected(msg) => write!(f, "Refresh rejected: {}", msg),
            CredentialsError::NoRefreshToken => write!(f, "No refresh token available"),
            CredentialsError::Transport(msg) => write!(f, "Refresh request failed: {}", msg),
            CredentialsError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            CredentialsError::Other(msg) => write!(f, "Credentials error: {}", msg),
        }
    }
}

impl std::error::Error for CredentialsError {}

/// Source of truth for the current session credentials.
///
/// # Example
///
/// ```ignore
/// use openweb_core::traits::CredentialStore;
///
/// async fn ensure_fresh<S: CredentialStore>(store: &S) -> Result<(), CredentialsError> {
///     match store.current_credentials() {
///         Some(creds) if creds.is_valid() => Ok(()),
///         _ => store.refresh().await.map(|creds| store.store(creds)),
///     }
/// }
/// ```
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Snapshot of the current credentials, if any session exists.
    fn current_credentials(&self) -> Option<Credentials>;

    /// Obtain fresh credentials from the backend.
    ///
    /// Implementations must not store the result themselves; the caller
    /// decides whether to keep it.
    async fn refresh(&self) -> Result<Credentials, CredentialsError>;

    /// Change notifications. The receiver starts at the current value.
    fn subscribe(&self) -> watch::Receiver<Option<Credentials>>;

    /// Replace the current credentials and notify subscribers.
    fn store(&self, credentials: Credentials);

    /// Drop the access token while keeping the session identity.
    fn invalidate(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_error_display() {
        assert_eq!(
            CredentialsError::RefreshRejected("revoked".to_string()).to_string(),
            "Refresh rejected: revoked"
        );
        assert_eq!(
            CredentialsError::NoRefreshToken.to_string(),
            "No refresh token available"
        );
        assert_eq!(
            CredentialsError::Transport("reset".to_string()).to_string(),
            "Refresh request failed: reset"
        );
        assert_eq!(
            CredentialsError::Other("unknown".to_string()).to_string(),
            "Credentials error: unknown"
        );
    }

    #[test]
    fn test_credentials_error_implements_error_trait() {
        let err = CredentialsError::NoRefreshToken;
        let _: &dyn std::error::Error = &err;
    }
}
