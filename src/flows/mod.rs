//! Concrete flows run by [`Coordinator`](crate::coordinator::Coordinator).
//!
//! - [`AuthenticationFlow`] - login, releasing or cancelling gated actions
//! - [`ReportReasonFlow`] - reason picker before reporting a comment
//! - [`CommenterAppealFlow`] - appeal form for a moderated commenter
//! - [`ConversationFlow`] - the conversation itself, parent of the others

pub mod authentication;
pub mod commenter_appeal;
pub mod conversation;
pub mod report_reason;

pub use authentication::{
    AuthenticationContext, AuthenticationFlow, AuthenticationFlowCoordinator, AuthenticationOutcome,
};
pub use commenter_appeal::{AppealContext, AppealOutcome, AppealSubmission, CommenterAppealFlow};
pub use conversation::{
    ConversationContext, ConversationCoordinator, ConversationFlow, ConversationOutcome,
};
pub use report_reason::{
    ReportReasonContext, ReportReasonFlow, ReportReasonOutcome, ReportSubmission,
};
