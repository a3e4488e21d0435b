//! Required authentication level per user action.

use serde::{Deserialize, Serialize};

use super::credentials::AuthenticationLevel;
use crate::actions::ActionKind;

/// Publisher policy controlling which actions guests may perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPolicy {
    /// Guests may vote on comments.
    pub allow_guests_to_like: bool,
    /// Writing actions (comment, reply, edit, delete) need a registered user.
    pub force_register: bool,
    /// Reporting a comment needs a registered user.
    pub required_register_for_report: bool,
}

impl Default for ActionPolicy {
    fn default() -> Self {
        Self {
            allow_guests_to_like: false,
            force_register: true,
            required_register_for_report: false,
        }
    }
}

impl ActionPolicy {
    /// Level the current user must hold before `action` may run.
    pub fn required_level(&self, action: ActionKind) -> AuthenticationLevel {
        let registration = if self.force_register {
            AuthenticationLevel::LoggedIn
        } else {
            AuthenticationLevel::Guest
        };

        match action {
            ActionKind::PostComment
            | ActionKind::ReplyComment
            | ActionKind::EditComment
            | ActionKind::DeleteComment
            | ActionKind::ViewOwnProfile => registration,
            ActionKind::MuteUser | ActionKind::LoginPrompt | ActionKind::CommenterAppeal => {
                AuthenticationLevel::LoggedIn
            }
            ActionKind::VoteComment => {
                if self.allow_guests_to_like {
                    AuthenticationLevel::Guest
                } else {
                    AuthenticationLevel::LoggedIn
                }
            }
            ActionKind::ReportComment => {
                if self.required_register_for_report {
                    AuthenticationLevel::LoggedIn
                } else {
                    AuthenticationLevel::Guest
                }
            }
            ActionKind::ShareComment | ActionKind::ViewProfile => AuthenticationLevel::Guest,
        }
    }
}
