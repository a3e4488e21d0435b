//! The conversation screen and the flows it opens.
//!
//! [`ConversationCoordinator`] is the parent of every flow started from the
//! conversation: report, appeal and login run as its children and are
//! cancelled when the conversation closes.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::blocker::ActionGatingRegistry;
use crate::config::ProgrammerErrorPolicy;
use crate::coordinator::{Coordinator, CoordinatorId, Flow, PresentationMode, Router, TerminalResult};
use crate::error::CoordinatorError;
use crate::traits::{CredentialStore, DismissSignal, PresentStyle, ScreenDescriptor, ScreenKind};

use super::authentication::{
    AuthenticationContext, AuthenticationFlow, AuthenticationFlowCoordinator, AuthenticationOutcome,
};
use super::commenter_appeal::{AppealContext, AppealOutcome, CommenterAppealFlow};
use super::report_reason::{ReportReasonContext, ReportReasonFlow, ReportReasonOutcome};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationContext {
    pub post_id: String,
    #[serde(default)]
    pub article_url: Option<String>,
}

impl ConversationContext {
    pub fn new(post_id: impl Into<String>) -> Self {
        Self {
            post_id: post_id.into(),
            article_url: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationOutcome {
    /// The user left the conversation
    Closed,
    /// The host or SDK tore the conversation down
    Cancelled,
}

#[derive(Debug, Default)]
pub struct ConversationFlow;

impl Flow for ConversationFlow {
    type Context = ConversationContext;
    type Output = ConversationOutcome;

    fn name(&self) -> &'static str {
        "conversation"
    }

    fn screen(&self, context: &ConversationContext) -> Result<ScreenDescriptor, CoordinatorError> {
        if context.post_id.trim().is_empty() {
            return Err(CoordinatorError::InvalidContext {
                flow: self.name(),
                message: "post id is empty".to_string(),
            });
        }
        Ok(ScreenDescriptor::new(ScreenKind::Conversation).with_payload(json!({
            "post_id": context.post_id,
            "article_url": context.article_url,
        })))
    }

    fn map_dismissal(&self, _signal: DismissSignal) -> ConversationOutcome {
        ConversationOutcome::Closed
    }

    fn cancelled(&self) -> ConversationOutcome {
        ConversationOutcome::Cancelled
    }
}

/// Conversation coordinator with helpers for the flows it parents.
#[derive(Clone)]
pub struct ConversationCoordinator {
    coordinator: Coordinator<ConversationFlow>,
    store: Arc<dyn CredentialStore>,
    registry: Arc<ActionGatingRegistry>,
}

impl ConversationCoordinator {
    pub fn new(
        router: Router,
        mode: PresentationMode,
        store: Arc<dyn CredentialStore>,
        registry: Arc<ActionGatingRegistry>,
    ) -> Self {
        Self {
            coordinator: Coordinator::new(ConversationFlow, router, mode),
            store,
            registry,
        }
    }

    pub fn with_policy(mut self, policy: ProgrammerErrorPolicy) -> Self {
        self.coordinator = self.coordinator.with_policy(policy);
        self
    }

    pub fn id(&self) -> CoordinatorId {
        self.coordinator.id()
    }

    pub fn coordinator(&self) -> &Coordinator<ConversationFlow> {
        &self.coordinator
    }

    pub fn is_active(&self) -> bool {
        self.coordinator.is_active()
    }

    pub fn start(&self, context: ConversationContext) -> TerminalResult<ConversationOutcome> {
        self.coordinator.start(context)
    }

    /// Ask for a report reason in a sheet over the conversation.
    pub fn report_comment(&self, context: ReportReasonContext) -> TerminalResult<ReportReasonOutcome> {
        let child = self
            .coordinator
            .child(ReportReasonFlow, PresentationMode::Present(PresentStyle::Sheet));
        self.coordinator.start_child(child, context)
    }

    /// Open the appeal form for a moderated comment.
    pub fn appeal(&self, context: AppealContext) -> TerminalResult<AppealOutcome> {
        let child = self.coordinator.child(CommenterAppealFlow, PresentationMode::Push);
        self.coordinator.start_child(child, context)
    }

    /// Login coordinator presented full screen over the conversation, not
    /// yet started. Start it with [`ConversationCoordinator::start_login_child`].
    pub fn login_child(&self) -> AuthenticationFlowCoordinator {
        self.coordinator.child(
            AuthenticationFlow::new(Arc::clone(&self.store), Arc::clone(&self.registry)),
            PresentationMode::Present(PresentStyle::FullScreen),
        )
    }

    /// Start a coordinator from [`ConversationCoordinator::login_child`].
    pub fn start_login_child(
        &self,
        child: AuthenticationFlowCoordinator,
        context: AuthenticationContext,
    ) -> TerminalResult<AuthenticationOutcome> {
        self.coordinator.start_child(child, context)
    }

    /// Show login over the conversation. The returned coordinator reports
    /// the outcome through [`Coordinator::on_result`].
    pub fn start_login(&self, context: AuthenticationContext) -> AuthenticationFlowCoordinator {
        let child = self.login_child();
        let _ = self.start_login_child(child.clone(), context);
        child
    }

    /// Close the conversation and every flow it opened.
    pub fn cancel(&self) -> bool {
        self.coordinator.cancel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockCredentialStore, MockNavigator, Presentation};
    use crate::blocker::{BlockerType, Release};
    use crate::coordinator::CoordinatorState;
    use crate::flows::AppealSubmission;
    use crate::traits::{NavigationHost, ScreenOutput};
    use std::sync::Mutex;

    fn setup() -> (Arc<MockNavigator>, Arc<ActionGatingRegistry>, ConversationCoordinator) {
        let nav = Arc::new(MockNavigator::new());
        let registry = Arc::new(ActionGatingRegistry::new());
        let conversation = ConversationCoordinator::new(
            Router::new(nav.clone()),
            PresentationMode::Root,
            Arc::new(MockCredentialStore::new()),
            registry.clone(),
        )
        .with_policy(ProgrammerErrorPolicy::Dismiss);
        (nav, registry, conversation)
    }

    #[tokio::test]
    async fn test_report_runs_as_child_sheet() {
        let (nav, _registry, conversation) = setup();
        let _closed = conversation.start(ConversationContext::new("post-1"));

        let report = conversation.report_comment(ReportReasonContext::new("c1"));
        assert_eq!(nav.top_presentation(), Some(Presentation::Presented(PresentStyle::Sheet)));
        assert_eq!(conversation.coordinator().child_count(), 1);

        nav.complete_top(ScreenOutput::Value(json!({ "reason": "spam" })));
        assert!(matches!(report.await, ReportReasonOutcome::Submitted(_)));
        assert_eq!(nav.stack_kinds(), vec![ScreenKind::Conversation]);
        assert!(conversation.is_active());
    }

    #[tokio::test]
    async fn test_appeal_runs_as_pushed_child() {
        let (nav, _registry, conversation) = setup();
        let _closed = conversation.start(ConversationContext::new("post-1"));

        let appeal = conversation.appeal(AppealContext {
            comment_id: "c7".to_string(),
            reasons: vec!["not_spam".to_string(), "context".to_string()],
        });
        assert_eq!(nav.top_presentation(), Some(Presentation::Pushed));
        assert_eq!(nav.top().unwrap().payload["comment_id"], json!("c7"));
        assert_eq!(conversation.coordinator().child_count(), 1);

        nav.complete_top(ScreenOutput::Value(json!({
            "reason": "not_spam",
            "message": "It was a quote",
        })));
        assert_eq!(
            appeal.await,
            AppealOutcome::Submitted(AppealSubmission {
                reason: "not_spam".to_string(),
                message: Some("It was a quote".to_string()),
            })
        );
        assert_eq!(conversation.coordinator().child_count(), 0);
        assert_eq!(nav.stack_kinds(), vec![ScreenKind::Conversation]);
        assert!(conversation.is_active());
    }

    #[tokio::test]
    async fn test_back_closes_conversation() {
        let (nav, _registry, conversation) = setup();
        let closed = conversation.start(ConversationContext::new("post-1"));
        nav.back();
        assert_eq!(closed.await, ConversationOutcome::Closed);
    }

    #[tokio::test]
    async fn test_cancelling_conversation_cancels_login_child() {
        let (nav, registry, conversation) = setup();
        registry.set_precondition(BlockerType::Authentication, || false);
        let closed = conversation.start(ConversationContext::new("post-1"));

        let released = Arc::new(Mutex::new(Vec::new()));
        for _ in 0..3 {
            let released = Arc::clone(&released);
            registry.guard(BlockerType::Authentication, move |release| {
                released.lock().unwrap().push(release)
            });
        }
        let login = conversation.start_login(AuthenticationContext::default());
        assert_eq!(nav.depth(), 2);

        conversation.cancel();

        assert_eq!(*released.lock().unwrap(), vec![Release::Cancelled; 3]);
        assert_eq!(login.state(), CoordinatorState::Completed);
        assert_eq!(closed.await, ConversationOutcome::Cancelled);
        assert!(nav.is_stack_empty());
    }

    #[tokio::test]
    async fn test_empty_post_id_is_dismissed() {
        let (nav, _registry, conversation) = setup();
        let closed = conversation.start(ConversationContext::new(""));
        assert_eq!(closed.await, ConversationOutcome::Closed);
        assert_eq!(nav.depth(), 0);
    }
}
