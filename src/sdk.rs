//! SDK facade wiring gating, recovery and navigation together.
//!
//! ```ignore
//! use openweb_core::sdk::ConversationSdk;
//!
//! let sdk = ConversationSdk::builder()
//!     .config(SdkConfig::from_env())
//!     .navigation(host)
//!     .build()?;
//!
//! let response = sdk.perform_action(ActionKind::PostComment, json!({ "text": "hi" })).await?;
//! ```

use std::sync::{Arc, Mutex, Weak};

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::actions::ActionKind;
use crate::adapters::{ReqwestTransport, SessionCredentialStore};
use crate::auth::{AuthenticationLevel, Credentials};
use crate::blocker::{ActionGatingRegistry, BlockerType, Release};
use crate::config::SdkConfig;
use crate::coordinator::{Coordinator, CoordinatorState, PresentationMode, Router, TerminalResult};
use crate::error::{AuthError, ErrorContext, NetworkError, ResultExt, SdkError, SdkResult};
use crate::flows::{
    AuthenticationContext, AuthenticationFlow, AuthenticationFlowCoordinator, ConversationContext,
    ConversationCoordinator, ConversationOutcome,
};
use crate::recovery::{CredentialRecoveryPipeline, RecoveryConfig};
use crate::traits::{
    CredentialStore, Method, NavigationHost, NetworkTransport, PresentStyle, Request, Response,
};
use crate::util::lock;

struct SdkInner {
    config: SdkConfig,
    store: Arc<dyn CredentialStore>,
    registry: Arc<ActionGatingRegistry>,
    pipeline: CredentialRecoveryPipeline,
    router: Router,
    login: Mutex<Option<AuthenticationFlowCoordinator>>,
    conversation: Mutex<Option<ConversationCoordinator>>,
}

impl SdkInner {
    /// Start the login flow unless one is already running.
    fn start_login(&self, context: AuthenticationContext) -> bool {
        let conversation = lock(&self.conversation)
            .clone()
            .filter(|conversation| conversation.is_active());

        let coordinator = {
            let mut login = lock(&self.login);
            if login
                .as_ref()
                .is_some_and(|current| current.state() != CoordinatorState::Completed)
            {
                tracing::debug!("Login flow already running");
                return false;
            }

            // Started below, once the login slot is released
            let coordinator = match &conversation {
                Some(conversation) => conversation.login_child(),
                None => {
                    let mode = if self.router.host().is_stack_empty() {
                        PresentationMode::Root
                    } else {
                        PresentationMode::Present(PresentStyle::FullScreen)
                    };
                    Coordinator::new(self.authentication_flow(), self.router.clone(), mode)
                        .with_policy(self.config.programmer_error_policy)
                }
            };
            *login = Some(coordinator.clone());
            coordinator
        };

        tracing::info!(coordinator = %coordinator.id(), action = ?context.action, "Starting login flow");
        let _ = match &conversation {
            Some(conversation) => conversation.start_login_child(coordinator, context),
            None => coordinator.start(context),
        };
        true
    }

    fn authentication_flow(&self) -> AuthenticationFlow {
        AuthenticationFlow::new(Arc::clone(&self.store), Arc::clone(&self.registry))
    }

    fn is_authenticated(&self) -> bool {
        self.store
            .current_credentials()
            .is_some_and(|credentials| credentials.is_authenticated())
    }
}

/// Entry point for hosts embedding the conversation experience.
///
/// Cheap to clone; clones share all state.
#[derive(Clone)]
pub struct ConversationSdk {
    inner: Arc<SdkInner>,
}

impl ConversationSdk {
    pub fn builder() -> ConversationSdkBuilder {
        ConversationSdkBuilder::default()
    }

    fn from_parts(
        config: SdkConfig,
        transport: Arc<dyn NetworkTransport>,
        store: Arc<dyn CredentialStore>,
        navigation: Arc<dyn NavigationHost>,
    ) -> Self {
        let registry = Arc::new(ActionGatingRegistry::new());

        let gate_store = Arc::clone(&store);
        registry.set_precondition(BlockerType::Authentication, move || {
            gate_store
                .current_credentials()
                .is_some_and(|credentials| credentials.is_authenticated())
        });

        let pipeline = CredentialRecoveryPipeline::new(
            transport,
            Arc::clone(&store),
            Arc::clone(&registry),
            RecoveryConfig::from(&config),
        );

        let inner = Arc::new(SdkInner {
            config,
            store,
            registry: Arc::clone(&registry),
            pipeline,
            router: Router::new(navigation),
            login: Mutex::new(None),
            conversation: Mutex::new(None),
        });

        let weak: Weak<SdkInner> = Arc::downgrade(&inner);
        registry.on_suspend(move |blocker, sequence| {
            if blocker != BlockerType::Authentication {
                return;
            }
            if let Some(inner) = weak.upgrade() {
                tracing::debug!(sequence, "Action needs a signed-in user");
                inner.start_login(AuthenticationContext::default());
            }
        });

        Self { inner }
    }

    pub fn config(&self) -> &SdkConfig {
        &self.inner.config
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.inner.store
    }

    pub fn registry(&self) -> &Arc<ActionGatingRegistry> {
        &self.inner.registry
    }

    pub fn pipeline(&self) -> &CredentialRecoveryPipeline {
        &self.inner.pipeline
    }

    pub fn router(&self) -> &Router {
        &self.inner.router
    }

    /// The login coordinator of the current or last login flow.
    pub fn login_coordinator(&self) -> Option<AuthenticationFlowCoordinator> {
        lock(&self.inner.login).clone()
    }

    pub fn conversation(&self) -> Option<ConversationCoordinator> {
        lock(&self.inner.conversation).clone()
    }

    /// Perform a user action against the backend.
    ///
    /// Waits for an in-flight credential renewal, then for a signed-in user
    /// if `kind` needs one. A suspended action starts the login flow; if the
    /// user backs out the call fails with
    /// [`AuthError::AuthenticationCancelled`].
    pub async fn perform_action(&self, kind: ActionKind, payload: Value) -> SdkResult<Response> {
        let required = self.inner.config.action_policy.required_level(kind);
        tracing::debug!(action = %kind, ?required, "Performing action");

        self.wait_for_gates(kind, required)
            .await
            .context(ErrorContext::new("perform_action").with_action(kind.as_str()))?;

        let Some((method, path)) = kind.endpoint() else {
            return Ok(Response::new(204, Bytes::new()));
        };

        let url = self.inner.config.endpoint_url(path);
        let mut request = Request::new(method, url.clone());
        if method != Method::Get && !payload.is_null() {
            request = request.with_json(&payload);
        }

        let response = self.inner.pipeline.execute(request).await.with_context(|| {
            ErrorContext::new("perform_action")
                .with_action(kind.as_str())
                .with_url(url.clone())
        })?;

        if !response.is_success() {
            let message = response.text().unwrap_or_default();
            tracing::warn!(action = %kind, status = response.status, "Action rejected by backend");
            return Err(SdkError::from(NetworkError::HttpStatus {
                status: response.status,
                message,
            })
            .with_context(ErrorContext::new("perform_action").with_action(kind.as_str()).with_url(url)));
        }

        Ok(response)
    }

    /// [`ConversationSdk::perform_action`], decoding the JSON response body.
    ///
    /// A body that does not decode into `T` fails with
    /// [`NetworkError::InvalidResponse`].
    pub async fn perform_action_json<T: DeserializeOwned>(
        &self,
        kind: ActionKind,
        payload: Value,
    ) -> SdkResult<T> {
        let response = self.perform_action(kind, payload).await?;
        response.json::<T>().map_err(|err| {
            tracing::warn!(action = %kind, error = %err, "Unexpected response body");
            SdkError::from(err)
                .with_context(ErrorContext::new("perform_action_json").with_action(kind.as_str()))
        })
    }

    async fn wait_for_gates(&self, kind: ActionKind, required: AuthenticationLevel) -> SdkResult<()> {
        let registry = &self.inner.registry;

        if registry.wait(BlockerType::RenewAuthentication).await == Release::Cancelled {
            tracing::debug!(action = %kind, "Renewal gate cancelled");
            return Err(AuthError::AuthenticationCancelled.into());
        }

        if required < AuthenticationLevel::LoggedIn {
            return Ok(());
        }

        match registry.wait(BlockerType::Authentication).await {
            Release::Proceed => Ok(()),
            Release::Cancelled => {
                tracing::info!(action = %kind, "Action cancelled with login");
                Err(AuthError::AuthenticationCancelled.into())
            }
        }
    }

    /// Show the conversation for `context` as the root of the stack.
    pub fn open_conversation(&self, context: ConversationContext) -> TerminalResult<ConversationOutcome> {
        let conversation = ConversationCoordinator::new(
            self.inner.router.clone(),
            PresentationMode::Root,
            Arc::clone(&self.inner.store),
            Arc::clone(&self.inner.registry),
        )
        .with_policy(self.inner.config.programmer_error_policy);

        let previous = lock(&self.inner.conversation).replace(conversation.clone());
        if let Some(previous) = previous {
            previous.cancel();
        }
        conversation.start(context)
    }

    /// Show the login flow. Returns false if one is already running.
    pub fn login(&self, action: Option<ActionKind>) -> bool {
        self.inner.start_login(AuthenticationContext { action })
    }

    /// Install credentials obtained outside the SDK's login flow.
    pub fn set_credentials(&self, credentials: Credentials) {
        self.inner.store.store(credentials);
        if self.inner.is_authenticated() {
            self.inner.registry.resume(BlockerType::Authentication);
            // The queue is empty now, so closing the login screen cancels nothing
            if let Some(login) = self.login_coordinator() {
                login.cancel();
            }
        }
    }

    /// Sign out: drop the session and cancel everything waiting on it.
    pub fn reset_session(&self) -> usize {
        if let Some(login) = self.login_coordinator() {
            login.cancel();
        }
        self.inner.store.invalidate();
        let cancelled = self.inner.registry.invalidate_all();
        tracing::info!(cancelled, "Session reset");
        cancelled
    }
}

/// Builder for [`ConversationSdk`].
///
/// Only the navigation host is required. Without a transport the SDK uses
/// [`ReqwestTransport`]; without a credential store it keeps the session in a
/// [`SessionCredentialStore`].
#[derive(Default)]
pub struct ConversationSdkBuilder {
    config: SdkConfig,
    transport: Option<Arc<dyn NetworkTransport>>,
    store: Option<Arc<dyn CredentialStore>>,
    navigation: Option<Arc<dyn NavigationHost>>,
}

impl ConversationSdkBuilder {
    pub fn config(mut self, config: SdkConfig) -> Self {
        self.config = config;
        self
    }

    pub fn transport(mut self, transport: Arc<dyn NetworkTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn credential_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn navigation(mut self, navigation: Arc<dyn NavigationHost>) -> Self {
        self.navigation = Some(navigation);
        self
    }

    pub fn build(self) -> SdkResult<ConversationSdk> {
        self.config.validate()?;

        let navigation = self.navigation.ok_or_else(|| SdkError::Config {
            message: "a navigation host is required".to_string(),
        })?;

        let transport: Arc<dyn NetworkTransport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::from_config(&self.config).map_err(NetworkError::from)?),
        };

        let store: Arc<dyn CredentialStore> = match self.store {
            Some(store) => store,
            None => Arc::new(SessionCredentialStore::new(
                Arc::clone(&transport),
                &self.config.api_base_url,
            )),
        };

        tracing::info!(api = %self.config.api_base_url, "Conversation SDK ready");
        Ok(ConversationSdk::from_parts(self.config, transport, store, navigation))
    }
}
