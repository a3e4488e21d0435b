//! Common test utilities for integration tests.
//!
//! Fixtures wire the SDK, the recovery pipeline or the gating registry to the
//! mock adapters so each test only scripts what it cares about.
//!
//! # Example
//!
//! ```ignore
//! use common::{Harness, stale_credentials};
//!
//! let harness = Harness::new(stale_credentials());
//! harness.store.set_refresh_result(Ok(fresh_credentials()));
//! let response = harness.sdk.perform_action(ActionKind::PostComment, payload).await?;
//! ```

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use openweb_core::adapters::mock::{MockCredentialStore, MockNavigator, MockTransport};
use openweb_core::auth::Credentials;
use openweb_core::blocker::{ActionGatingRegistry, BlockerType, Release};
use openweb_core::config::{ProgrammerErrorPolicy, SdkConfig};
use openweb_core::recovery::{CredentialRecoveryPipeline, RecoveryConfig};
use openweb_core::traits::CredentialStore;
use openweb_core::ConversationSdk;

pub const FRESH_TOKEN: &str = "fresh-access-token";
pub const STALE_TOKEN: &str = "stale-access-token";

/// How long tests wait for a screen to appear.
pub const SCREEN_TIMEOUT: Duration = Duration::from_secs(2);

/// Signed-in credentials the backend no longer accepts.
pub fn stale_credentials() -> Credentials {
    Credentials::logged_in("test-user-id", STALE_TOKEN).with_refresh_token("test-refresh-token")
}

/// What a successful refresh hands back.
pub fn fresh_credentials() -> Credentials {
    Credentials::logged_in("test-user-id", FRESH_TOKEN).with_refresh_token("rotated-refresh-token")
}

/// Transport accepting only the fresh token, with a little latency so
/// concurrent requests overlap.
pub fn backend() -> Arc<MockTransport> {
    let transport = Arc::new(MockTransport::requiring_bearer(FRESH_TOKEN));
    transport.set_latency(Duration::from_millis(5));
    transport
}

/// Registry whose authentication gate follows `store`.
pub fn gated_registry(store: Arc<MockCredentialStore>) -> Arc<ActionGatingRegistry> {
    let registry = Arc::new(ActionGatingRegistry::new());
    registry.set_precondition(BlockerType::Authentication, move || {
        store
            .current_credentials()
            .is_some_and(|credentials| credentials.is_authenticated())
    });
    registry
}

pub struct PipelineFixture {
    pub transport: Arc<MockTransport>,
    pub store: Arc<MockCredentialStore>,
    pub registry: Arc<ActionGatingRegistry>,
    pub pipeline: Arc<CredentialRecoveryPipeline>,
}

impl PipelineFixture {
    pub fn new(credentials: Credentials) -> Self {
        Self::with_config(credentials, RecoveryConfig::default())
    }

    pub fn with_config(credentials: Credentials, config: RecoveryConfig) -> Self {
        let transport = backend();
        let store = Arc::new(MockCredentialStore::with_credentials(credentials));
        let registry = gated_registry(Arc::clone(&store));
        let pipeline = Arc::new(CredentialRecoveryPipeline::new(
            transport.clone(),
            store.clone(),
            Arc::clone(&registry),
            config,
        ));
        Self {
            transport,
            store,
            registry,
            pipeline,
        }
    }
}

/// Full SDK over the mock adapters.
pub struct Harness {
    pub transport: Arc<MockTransport>,
    pub store: Arc<MockCredentialStore>,
    pub navigator: Arc<MockNavigator>,
    pub sdk: ConversationSdk,
}

impl Harness {
    pub fn new(credentials: Credentials) -> Self {
        Self::from_store(MockCredentialStore::with_credentials(credentials))
    }

    pub fn signed_out() -> Self {
        Self::from_store(MockCredentialStore::new())
    }

    fn from_store(store: MockCredentialStore) -> Self {
        let transport = backend();
        let store = Arc::new(store);
        let navigator = Arc::new(MockNavigator::new());
        let sdk = ConversationSdk::builder()
            .config(SdkConfig::default().with_programmer_error_policy(ProgrammerErrorPolicy::Dismiss))
            .transport(transport.clone())
            .credential_store(store.clone())
            .navigation(navigator.clone())
            .build()
            .expect("valid SDK configuration");
        Self {
            transport,
            store,
            navigator,
            sdk,
        }
    }
}

/// Factory of continuations that record their label and release.
pub fn recorder() -> (
    Arc<Mutex<Vec<(u32, Release)>>>,
    impl Fn(u32) -> Box<dyn FnOnce(Release) + Send + 'static>,
) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let make_log = Arc::clone(&log);
    let make = move |label: u32| -> Box<dyn FnOnce(Release) + Send + 'static> {
        let log = Arc::clone(&make_log);
        Box::new(move |release: Release| log.lock().unwrap().push((label, release)))
    };
    (log, make)
}
