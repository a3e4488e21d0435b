//! User actions exposed by the conversation SDK.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::traits::Method;

/// A user action the host can ask the core to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    PostComment,
    ReplyComment,
    EditComment,
    DeleteComment,
    VoteComment,
    ReportComment,
    ShareComment,
    MuteUser,
    ViewProfile,
    ViewOwnProfile,
    CommenterAppeal,
    /// Explicit "sign in" entry point; carries no request of its own.
    LoginPrompt,
}

impl ActionKind {
    /// HTTP method and path (relative to the API base URL) for this action.
    ///
    /// `None` for actions that only need the gate to open.
    pub fn endpoint(&self) -> Option<(Method, &'static str)> {
        match self {
            ActionKind::PostComment => Some((Method::Post, "/conversation/comment")),
            ActionKind::ReplyComment => Some((Method::Post, "/conversation/reply")),
            ActionKind::EditComment => Some((Method::Put, "/conversation/comment")),
            ActionKind::DeleteComment => Some((Method::Delete, "/conversation/comment")),
            ActionKind::VoteComment => Some((Method::Post, "/conversation/vote")),
            ActionKind::ReportComment => Some((Method::Post, "/conversation/report")),
            ActionKind::ShareComment => Some((Method::Post, "/conversation/share")),
            ActionKind::MuteUser => Some((Method::Post, "/user/mute")),
            ActionKind::ViewProfile => Some((Method::Get, "/user/profile")),
            ActionKind::ViewOwnProfile => Some((Method::Get, "/user/me")),
            ActionKind::CommenterAppeal => Some((Method::Post, "/conversation/appeal")),
            ActionKind::LoginPrompt => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::PostComment => "post_comment",
            ActionKind::ReplyComment => "reply_comment",
            ActionKind::EditComment => "edit_comment",
            ActionKind::DeleteComment => "delete_comment",
            ActionKind::VoteComment => "vote_comment",
            ActionKind::ReportComment => "report_comment",
            ActionKind::ShareComment => "share_comment",
            ActionKind::MuteUser => "mute_user",
            ActionKind::ViewProfile => "view_profile",
            ActionKind::ViewOwnProfile => "view_own_profile",
            ActionKind::CommenterAppeal => "commenter_appeal",
            ActionKind::LoginPrompt => "login_prompt",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
