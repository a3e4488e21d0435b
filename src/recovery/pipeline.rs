//! Credential recovery around a [`NetworkTransport`].
//!
//! A credential failure on any request starts at most one refresh. Requests
//! failing while that refresh runs attach to it instead of starting their
//! own, then replay once with whatever credentials it produced.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use futures::FutureExt;

use super::budget::RetryBudget;
use super::state::{RefreshResult, RefreshState, SharedRefresh};
use crate::auth::Credentials;
use crate::blocker::{ActionGatingRegistry, BlockerType};
use crate::config::SdkConfig;
use crate::error::{AuthError, NetworkError, SdkError, SdkResult};
use crate::traits::{CredentialStore, CredentialsError, NetworkTransport, Request, Response};
use crate::util::lock;

const AUTHORIZATION: &str = "Authorization";

/// Recovery knobs, usually taken from [`SdkConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryConfig {
    pub retry_budget: u32,
    pub unauthenticated_statuses: Vec<u16>,
    pub absorb_response_credentials: bool,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        RecoveryConfig::from(&SdkConfig::default())
    }
}

impl From<&SdkConfig> for RecoveryConfig {
    fn from(config: &SdkConfig) -> Self {
        Self {
            retry_budget: config.retry_budget,
            unauthenticated_statuses: config.unauthenticated_statuses.clone(),
            absorb_response_credentials: config.absorb_response_credentials,
        }
    }
}

impl RecoveryConfig {
    pub fn is_unauthenticated(&self, status: u16) -> bool {
        self.unauthenticated_statuses.contains(&status)
    }
}

pub struct CredentialRecoveryPipeline {
    transport: Arc<dyn NetworkTransport>,
    store: Arc<dyn CredentialStore>,
    registry: Arc<ActionGatingRegistry>,
    config: RecoveryConfig,
    state: Arc<Mutex<RefreshState>>,
    cycles: AtomicU64,
}

impl CredentialRecoveryPipeline {
    pub fn new(
        transport: Arc<dyn NetworkTransport>,
        store: Arc<dyn CredentialStore>,
        registry: Arc<ActionGatingRegistry>,
        config: RecoveryConfig,
    ) -> Self {
        Self {
            transport,
            store,
            registry,
            config,
            state: Arc::new(Mutex::new(RefreshState::Idle)),
            cycles: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &RecoveryConfig {
        &self.config
    }

    /// Number of refresh cycles started so far.
    pub fn refresh_cycles(&self) -> u64 {
        self.cycles.load(Ordering::SeqCst)
    }

    pub fn is_refreshing(&self) -> bool {
        lock(&self.state).cycle().is_some()
    }

    /// Send `request` with the current credentials, recovering from
    /// credential failures within the retry budget.
    ///
    /// Transport errors are returned unchanged and never start a refresh.
    pub async fn execute(&self, request: Request) -> SdkResult<Response> {
        let mut budget = RetryBudget::new(self.config.retry_budget);

        loop {
            let (attempt, token) = self.authorize(&request);
            let response = self
                .transport
                .send(&attempt)
                .await
                .map_err(NetworkError::Transport)?;

            if !self.config.is_unauthenticated(response.status) {
                self.absorb_credentials(&response);
                return Ok(response);
            }

            if !budget.try_consume() {
                tracing::warn!(
                    url = %request.url,
                    status = response.status,
                    retries = budget.spent(),
                    "Request still unauthenticated, giving up"
                );
                return Err(AuthError::Unauthenticated {
                    status: response.status,
                }
                .into());
            }

            tracing::debug!(url = %request.url, status = response.status, "Credential failure, recovering");
            self.recover(token.as_deref()).await?;
        }
    }

    /// Copy of `request` carrying the current bearer token.
    fn authorize(&self, request: &Request) -> (Request, Option<String>) {
        let mut attempt = request.clone();
        let credentials = self.store.current_credentials();
        let token = credentials.as_ref().and_then(|c| c.access_token.clone());
        match credentials.as_ref().and_then(Credentials::bearer) {
            Some(bearer) => attempt.set_header(AUTHORIZATION, bearer),
            None => attempt
                .headers
                .retain(|name, _| !name.eq_ignore_ascii_case(AUTHORIZATION)),
        }
        (attempt, token)
    }

    /// Wait for credentials newer than `failed_token`.
    async fn recover(&self, failed_token: Option<&str>) -> SdkResult<()> {
        let (cycle, refresh) = {
            let mut state = lock(&self.state);
            let attached = match &*state {
                RefreshState::InFlight { cycle, refresh, .. } => Some((*cycle, refresh.clone())),
                RefreshState::Idle | RefreshState::Failed { .. } => None,
            };
            match attached {
                Some((cycle, refresh)) => {
                    tracing::debug!(cycle, "Attaching to in-flight refresh");
                    (cycle, refresh)
                }
                None => {
                    let current = self
                        .store
                        .current_credentials()
                        .and_then(|c| c.access_token);
                    if current.is_some() && current.as_deref() != failed_token {
                        tracing::debug!("Failed token is stale, retrying with current credentials");
                        return Ok(());
                    }

                    // A late failure for a session whose refresh was already
                    // rejected gets that cycle's outcome; login is pending.
                    if let Some((cycle, source)) = state.settled_failure(current.as_deref()) {
                        tracing::debug!(cycle, "Session refresh already failed, not retrying");
                        return Err(AuthError::CredentialRefreshFailed { source }.into());
                    }

                    let cycle = self.cycles.fetch_add(1, Ordering::SeqCst) + 1;
                    let refresh = self.start_refresh(cycle);
                    *state = RefreshState::InFlight {
                        cycle,
                        token: failed_token.map(str::to_string),
                        refresh: refresh.clone(),
                    };
                    (cycle, refresh)
                }
            }
        };

        refresh.await.map(|_| ()).map_err(|source| {
            tracing::debug!(cycle, error = %source, "Attached request sees failed refresh");
            SdkError::from(AuthError::CredentialRefreshFailed { source })
        })
    }

    /// Spawn the refresh for `cycle`. The task owns the outcome, so dropping
    /// any waiter leaves it running.
    fn start_refresh(&self, cycle: u64) -> SharedRefresh {
        let store = Arc::clone(&self.store);
        let registry = Arc::clone(&self.registry);
        let state = Arc::clone(&self.state);
        let renewal = self.registry.block(BlockerType::RenewAuthentication);

        let task = tokio::spawn(async move {
            tracing::info!(cycle, "Refreshing credentials");
            let result: RefreshResult = store.refresh().await;

            match &result {
                Ok(credentials) => {
                    store.store(credentials.clone());
                    tracing::info!(cycle, "Credentials refreshed");
                }
                Err(err) => {
                    tracing::warn!(cycle, error = %err, "Credential refresh failed, escalating to login");
                    store.invalidate();
                    registry.guard(BlockerType::Authentication, move |release| {
                        tracing::info!(cycle, ?release, "Authentication recovery released");
                    });
                }
            }

            lock(&state).settle(cycle, &result);
            renewal.complete();
            result
        });

        async move {
            match task.await {
                Ok(result) => result,
                Err(join_err) => Err(CredentialsError::Other(format!(
                    "refresh task failed: {}",
                    join_err
                ))),
            }
        }
        .boxed()
        .shared()
    }

    /// Take over a token the backend handed back in `Authorization`.
    fn absorb_credentials(&self, response: &Response) {
        if !self.config.absorb_response_credentials {
            return;
        }
        let Some(header) = response.header(AUTHORIZATION) else {
            return;
        };
        let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
        if token.is_empty() {
            return;
        }

        let current = self.store.current_credentials().unwrap_or_default();
        if current.access_token.as_deref() == Some(token) {
            return;
        }

        tracing::debug!("Absorbing credentials from response header");
        let updated = Credentials {
            access_token: Some(token.to_string()),
            expires_at: None,
            ..current
        }
        .with_jwt_expiry();
        self.store.store(updated);
    }
}
