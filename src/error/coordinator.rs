//! Navigation misuse errors.
//!
//! These are programmer errors in the host integration. Depending on
//! [`ProgrammerErrorPolicy`](crate::config::ProgrammerErrorPolicy) they either
//! panic or turn into a logged no-op dismissal.

use std::fmt;

use crate::coordinator::CoordinatorId;

#[derive(Debug, Clone, PartialEq)]
pub enum CoordinatorError {
    /// The flow could not build its screen from the given context.
    InvalidContext { flow: &'static str, message: String },

    /// `start` was called on a coordinator that already left `NotStarted`.
    AlreadyStarted { coordinator: CoordinatorId },
}

impl CoordinatorError {
    pub fn error_code(&self) -> &'static str {
        match self {
            CoordinatorError::InvalidContext { .. } => "E_NAV_CONTEXT",
            CoordinatorError::AlreadyStarted { .. } => "E_NAV_RESTART",
        }
    }

    pub fn user_message(&self) -> String {
        "This screen could not be opened.".to_string()
    }
}

impl fmt::Display for CoordinatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordinatorError::InvalidContext { flow, message } => {
                write!(f, "Invalid context for {} flow: {}", flow, message)
            }
            CoordinatorError::AlreadyStarted { coordinator } => {
                write!(f, "Coordinator {} started twice", coordinator)
            }
        }
    }
}

impl std::error::Error for CoordinatorError {}
