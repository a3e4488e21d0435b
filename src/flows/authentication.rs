//! Login flow.
//!
//! Shows the host's login screen. A successful login stores the new
//! credentials and releases every action suspended on
//! [`BlockerType::Authentication`]; any other ending cancels them.

use std::sync::Arc;

use serde_json::json;

use crate::actions::ActionKind;
use crate::auth::Credentials;
use crate::blocker::{ActionGatingRegistry, BlockerType};
use crate::coordinator::{Coordinator, Flow};
use crate::error::CoordinatorError;
use crate::traits::{CredentialStore, DismissSignal, ScreenDescriptor, ScreenKind, ScreenOutput};

/// Why the login screen is shown.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthenticationContext {
    /// The action that needed a signed-in user, if any
    pub action: Option<ActionKind>,
}

impl AuthenticationContext {
    pub fn for_action(action: ActionKind) -> Self {
        Self {
            action: Some(action),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthenticationOutcome {
    Authenticated(Credentials),
    Cancelled,
}

impl AuthenticationOutcome {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthenticationOutcome::Authenticated(_))
    }
}

pub struct AuthenticationFlow {
    store: Arc<dyn CredentialStore>,
    registry: Arc<ActionGatingRegistry>,
}

impl AuthenticationFlow {
    pub fn new(store: Arc<dyn CredentialStore>, registry: Arc<ActionGatingRegistry>) -> Self {
        Self { store, registry }
    }
}

impl Flow for AuthenticationFlow {
    type Context = AuthenticationContext;
    type Output = AuthenticationOutcome;

    fn name(&self) -> &'static str {
        "authentication"
    }

    fn screen(&self, context: &AuthenticationContext) -> Result<ScreenDescriptor, CoordinatorError> {
        let payload = match context.action {
            Some(action) => json!({ "action": action }),
            None => serde_json::Value::Null,
        };
        Ok(ScreenDescriptor::new(ScreenKind::Login).with_payload(payload))
    }

    fn map_dismissal(&self, signal: DismissSignal) -> AuthenticationOutcome {
        match signal {
            DismissSignal::Done(ScreenOutput::Credentials(credentials)) if credentials.is_authenticated() => {
                AuthenticationOutcome::Authenticated(credentials)
            }
            DismissSignal::Done(_) => {
                tracing::warn!("Login screen finished without a signed-in user");
                AuthenticationOutcome::Cancelled
            }
            _ => AuthenticationOutcome::Cancelled,
        }
    }

    fn cancelled(&self) -> AuthenticationOutcome {
        AuthenticationOutcome::Cancelled
    }

    fn on_complete(&self, output: &AuthenticationOutcome) {
        match output {
            AuthenticationOutcome::Authenticated(credentials) => {
                tracing::info!(user_id = ?credentials.user_id, "User signed in");
                self.store.store(credentials.clone());
                self.registry.resume(BlockerType::Authentication);
            }
            AuthenticationOutcome::Cancelled => {
                tracing::info!("Login cancelled");
                self.registry.cancel_all(BlockerType::Authentication);
            }
        }
    }
}

/// Coordinator running the login flow.
pub type AuthenticationFlowCoordinator = Coordinator<AuthenticationFlow>;
