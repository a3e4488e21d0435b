//! Unified error type for the conversation SDK.

use std::fmt;

use super::auth::AuthError;
use super::category::ErrorCategory;
use super::context::ErrorContext;
use super::coordinator::CoordinatorError;
use super::network::NetworkError;
use crate::traits::TransportError;

/// Unified error type returned by every public SDK operation.
#[derive(Debug, Clone, PartialEq)]
pub enum SdkError {
    /// Transport and HTTP status errors.
    Network(NetworkError),

    /// Session errors: cancelled login, failed refresh, rejected retry.
    Auth(AuthError),

    /// Host integration mistakes surfaced instead of panicking.
    Coordinator(CoordinatorError),

    /// Invalid configuration.
    Config { message: String },

    /// Wrapped error with additional context.
    WithContext {
        error: Box<SdkError>,
        context: ErrorContext,
    },
}

impl SdkError {
    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            SdkError::Network(NetworkError::Transport(_)) => ErrorCategory::Network,
            SdkError::Network(err) if err.is_server_error() => ErrorCategory::Server,
            SdkError::Network(_) => ErrorCategory::Request,
            SdkError::Auth(AuthError::AuthenticationCancelled) => ErrorCategory::Cancelled,
            SdkError::Auth(_) => ErrorCategory::Auth,
            SdkError::Coordinator(_) => ErrorCategory::Client,
            SdkError::Config { .. } => ErrorCategory::Configuration,
            SdkError::WithContext { error, .. } => error.category(),
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            SdkError::Network(err) => err.is_retryable(),
            SdkError::WithContext { error, .. } => error.is_retryable(),
            _ => false,
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            SdkError::Network(err) => err.user_message(),
            SdkError::Auth(err) => err.user_message(),
            SdkError::Coordinator(err) => err.user_message(),
            SdkError::Config { .. } => "The conversation SDK is misconfigured.".to_string(),
            SdkError::WithContext { error, .. } => error.user_message(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            SdkError::Network(err) => err.error_code(),
            SdkError::Auth(err) => err.error_code(),
            SdkError::Coordinator(err) => err.error_code(),
            SdkError::Config { .. } => "E_CONFIG",
            SdkError::WithContext { error, .. } => error.error_code(),
        }
    }

    /// Attach context to this error.
    pub fn with_context(self, ctx: ErrorContext) -> Self {
        SdkError::WithContext {
            error: Box::new(self),
            context: ctx,
        }
    }

    /// Get the context if this error has one attached.
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            SdkError::WithContext { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Get the inner error without context.
    pub fn inner(&self) -> &SdkError {
        match self {
            SdkError::WithContext { error, .. } => error.inner(),
            _ => self,
        }
    }

    /// Get the recovery hint for this error.
    pub fn recovery_hint(&self) -> &'static str {
        self.category().recovery_hint()
    }

    /// The user backed out of the login flow.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.inner(), SdkError::Auth(AuthError::AuthenticationCancelled))
    }

    /// Check if this error requires signing in again.
    pub fn requires_reauth(&self) -> bool {
        match self.inner() {
            SdkError::Auth(err) => err.requires_reauth(),
            _ => false,
        }
    }
}

impl fmt::Display for SdkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SdkError::Network(err) => write!(f, "{}", err),
            SdkError::Auth(err) => write!(f, "{}", err),
            SdkError::Coordinator(err) => write!(f, "{}", err),
            SdkError::Config { message } => write!(f, "Configuration error: {}", message),
            SdkError::WithContext { error, context } => {
                write!(f, "{} ({})", error, context)
            }
        }
    }
}

impl std::error::Error for SdkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SdkError::Network(err) => Some(err),
            SdkError::Auth(err) => Some(err),
            SdkError::Coordinator(err) => Some(err),
            SdkError::Config { .. } => None,
            SdkError::WithContext { error, .. } => error.source(),
        }
    }
}

// ============================================================================
// From implementations for automatic error conversion
// ============================================================================

impl From<NetworkError> for SdkError {
    fn from(err: NetworkError) -> Self {
        SdkError::Network(err)
    }
}

impl From<AuthError> for SdkError {
    fn from(err: AuthError) -> Self {
        SdkError::Auth(err)
    }
}

impl From<CoordinatorError> for SdkError {
    fn from(err: CoordinatorError) -> Self {
        SdkError::Coordinator(err)
    }
}

impl From<TransportError> for SdkError {
    fn from(err: TransportError) -> Self {
        SdkError::Network(NetworkError::Transport(err))
    }
}

impl From<serde_json::Error> for SdkError {
    fn from(err: serde_json::Error) -> Self {
        SdkError::Network(NetworkError::InvalidResponse {
            message: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::CredentialsError;

    #[test]
    fn test_categories() {
        let transport: SdkError = TransportError::Timeout("30s".to_string()).into();
        assert_eq!(transport.category(), ErrorCategory::Network);
        assert!(transport.is_retryable());

        let server: SdkError = NetworkError::HttpStatus {
            status: 502,
            message: "Bad Gateway".to_string(),
        }
        .into();
        assert_eq!(server.category(), ErrorCategory::Server);

        let rejected: SdkError = NetworkError::HttpStatus {
            status: 403,
            message: "Forbidden".to_string(),
        }
        .into();
        assert_eq!(rejected.category(), ErrorCategory::Request);

        let cancelled: SdkError = AuthError::AuthenticationCancelled.into();
        assert_eq!(cancelled.category(), ErrorCategory::Cancelled);
        assert!(cancelled.is_cancelled());
        assert!(!cancelled.requires_reauth());

        let refresh: SdkError = AuthError::CredentialRefreshFailed {
            source: CredentialsError::NoRefreshToken,
        }
        .into();
        assert_eq!(refresh.category(), ErrorCategory::Auth);
        assert!(refresh.requires_reauth());
        assert!(!refresh.is_retryable());
    }

    #[test]
    fn test_with_context_preserves_classification() {
        let err: SdkError = AuthError::AuthenticationCancelled.into();
        let with_ctx = err.with_context(ErrorContext::new("perform_action"));

        assert!(with_ctx.context().is_some());
        assert_eq!(with_ctx.category(), ErrorCategory::Cancelled);
        assert!(with_ctx.is_cancelled());
        assert_eq!(with_ctx.error_code(), "E_AUTH_CANCELLED");
        assert_eq!(
            with_ctx.inner(),
            &SdkError::Auth(AuthError::AuthenticationCancelled)
        );
    }

    #[test]
    fn test_json_error_is_invalid_response() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: SdkError = json_err.into();
        assert!(matches!(
            err,
            SdkError::Network(NetworkError::InvalidResponse { .. })
        ));
    }

    #[test]
    fn test_source_chain() {
        use std::error::Error;

        let err: SdkError = TransportError::Cancelled.into();
        assert!(err.source().is_some());
    }
}
