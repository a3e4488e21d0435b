//! Error category classification for unified error handling.
//!
//! Categories drive what the caller of an SDK operation should do next:
//! retry, show the login UI, or give up.

use std::fmt;

/// High-level categorization of errors for handling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Transport failures (connection, timeout).
    /// Generally transient and retryable.
    Network,

    /// Session problems the login flow can fix.
    Auth,

    /// Backend-side errors (HTTP 5xx).
    /// Generally transient and retryable after delay.
    Server,

    /// Requests the backend refused as invalid (HTTP 4xx other than auth).
    Request,

    /// Misuse of the SDK by the host (invalid context, double start).
    Client,

    /// The user backed out of a flow.
    Cancelled,

    /// Invalid SDK configuration.
    Configuration,
}

impl ErrorCategory {
    /// Returns true if errors in this category are generally transient
    /// and the operation can be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Network | ErrorCategory::Server)
    }

    /// Returns a short label for the category suitable for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Auth => "auth",
            ErrorCategory::Server => "server",
            ErrorCategory::Request => "request",
            ErrorCategory::Client => "client",
            ErrorCategory::Cancelled => "cancelled",
            ErrorCategory::Configuration => "configuration",
        }
    }

    /// Returns suggested recovery actions for this category.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Check your internet connection and try again",
            ErrorCategory::Auth => "Sign in again to continue",
            ErrorCategory::Server => {
                "The conversation service may be experiencing issues. Please try again later"
            }
            ErrorCategory::Request => "The action could not be completed as requested",
            ErrorCategory::Client => "This is an integration bug in the host application",
            ErrorCategory::Cancelled => "Start the action again when you are ready",
            ErrorCategory::Configuration => "Check the SDK configuration",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_retryable() {
        assert!(ErrorCategory::Network.is_retryable());
        assert!(ErrorCategory::Server.is_retryable());
        assert!(!ErrorCategory::Auth.is_retryable());
        assert!(!ErrorCategory::Request.is_retryable());
        assert!(!ErrorCategory::Client.is_retryable());
        assert!(!ErrorCategory::Cancelled.is_retryable());
        assert!(!ErrorCategory::Configuration.is_retryable());
    }

    #[test]
    fn test_category_display() {
        assert_eq!(format!("{}", ErrorCategory::Cancelled), "cancelled");
        assert_eq!(format!("{}", ErrorCategory::Auth), "auth");
    }
}
