//! Network-related error types.

use std::fmt;

use crate::traits::TransportError;

/// Network-specific error variants.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkError {
    /// The transport failed before a response arrived. Passed through from
    /// the [`NetworkTransport`](crate::traits::NetworkTransport) unchanged.
    Transport(TransportError),

    /// HTTP status error (non-2xx response that is not a credential failure).
    HttpStatus { status: u16, message: String },

    /// Response body did not have the expected shape.
    InvalidResponse { message: String },
}

impl NetworkError {
    /// Check if this error is likely transient and can be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            NetworkError::Transport(err) => !matches!(
                err,
                TransportError::InvalidUrl(_) | TransportError::Cancelled
            ),
            NetworkError::HttpStatus { status, .. } => {
                *status >= 500 || *status == 429 || *status == 408
            }
            NetworkError::InvalidResponse { .. } => false,
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            NetworkError::Transport(TransportError::Timeout(_)) => {
                "The request timed out. The server may be slow or unreachable.".to_string()
            }
            NetworkError::Transport(TransportError::Cancelled) => {
                "The request was cancelled.".to_string()
            }
            NetworkError::Transport(_) => {
                "Unable to reach the conversation service. Please check your internet connection."
                    .to_string()
            }
            NetworkError::HttpStatus { status, .. } => match *status {
                400 => "The request was invalid. Please try again.".to_string(),
                403 => "You don't have permission for this action.".to_string(),
                404 => "The requested content was not found.".to_string(),
                429 => "Too many requests. Please wait a moment and try again.".to_string(),
                500..=599 => {
                    "The server is experiencing issues. Please try again later.".to_string()
                }
                _ => format!(
                    "The server returned an error (HTTP {}). Please try again.",
                    status
                ),
            },
            NetworkError::InvalidResponse { .. } => {
                "Received an invalid response from the server. Please try again.".to_string()
            }
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            NetworkError::Transport(TransportError::Timeout(_)) => "E_NET_TIMEOUT",
            NetworkError::Transport(TransportError::ConnectionFailed(_)) => "E_NET_CONN",
            NetworkError::Transport(_) => "E_NET_TRANSPORT",
            NetworkError::HttpStatus { .. } => "E_NET_HTTP",
            NetworkError::InvalidResponse { .. } => "E_NET_INVALID",
        }
    }

    /// Whether the backend answered with a 5xx status.
    pub fn is_server_error(&self) -> bool {
        matches!(self, NetworkError::HttpStatus { status, .. } if *status >= 500)
    }
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::Transport(err) => write!(f, "{}", err),
            NetworkError::HttpStatus { status, message } => {
                write!(f, "HTTP {}: {}", status, message)
            }
            NetworkError::InvalidResponse { message } => {
                write!(f, "Invalid response: {}", message)
            }
        }
    }
}

impl std::error::Error for NetworkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NetworkError::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TransportError> for NetworkError {
    fn from(err: TransportError) -> Self {
        NetworkError::Transport(err)
    }
}
