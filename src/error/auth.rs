//! Authentication-related error types.
//!
//! These are the outcomes a gated action or a recovered request can end in
//! when the session is the problem.

use std::fmt;

use crate::traits::CredentialsError;

/// Authentication-specific error variants.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthError {
    /// The login flow was closed before the user signed in.
    AuthenticationCancelled,

    /// The shared credential refresh failed; every request attached to it
    /// receives this.
    CredentialRefreshFailed { source: CredentialsError },

    /// The backend still rejected the request after the allowed retries.
    Unauthenticated { status: u16 },
}

impl AuthError {
    /// Check if this error might be resolved by signing in.
    pub fn requires_reauth(&self) -> bool {
        !matches!(self, AuthError::AuthenticationCancelled)
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::AuthenticationCancelled => "Sign in was cancelled.".to_string(),
            AuthError::CredentialRefreshFailed { .. } => {
                "Your session could not be renewed. Please sign in again.".to_string()
            }
            AuthError::Unauthenticated { .. } => {
                "Your session has expired. Please sign in again.".to_string()
            }
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::AuthenticationCancelled => "E_AUTH_CANCELLED",
            AuthError::CredentialRefreshFailed { .. } => "E_AUTH_REFRESH_FAIL",
            AuthError::Unauthenticated { .. } => "E_AUTH_UNAUTHENTICATED",
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::AuthenticationCancelled => write!(f, "Authentication cancelled"),
            AuthError::CredentialRefreshFailed { source } => {
                write!(f, "Credential refresh failed: {}", source)
            }
            AuthError::Unauthenticated { status } => {
                write!(f, "Request unauthenticated after retry (HTTP {})", status)
            }
        }
    }
}

impl std::error::Error for AuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AuthError::CredentialRefreshFailed { source } => Some(source),
            _ => None,
        }
    }
}
