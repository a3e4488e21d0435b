//! In-memory credential store for testing.
//!
//! Refresh outcomes are scripted; every call to `refresh` is counted so tests
//! can assert how many refreshes actually reached the store.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

use crate::auth::Credentials;
use crate::recovery::RefreshResult;
use crate::traits::{CredentialStore, CredentialsError};
use crate::util::lock;

/// Scriptable credential store.
///
/// # Example
///
/// ```ignore
/// use openweb_core::adapters::mock::MockCredentialStore;
/// use openweb_core::auth::Credentials;
///
/// let store = MockCredentialStore::with_credentials(Credentials::logged_in("u1", "stale"));
/// store.set_refresh_result(Ok(Credentials::logged_in("u1", "fresh")));
/// store.set_refresh_latency(Duration::from_millis(50));
///
/// let creds = store.refresh().await?;
/// assert_eq!(store.refresh_count(), 1);
/// ```
#[derive(Clone)]
pub struct MockCredentialStore {
    credentials: Arc<watch::Sender<Option<Credentials>>>,
    /// One-shot outcomes consumed before `default_result`
    scripted: Arc<Mutex<VecDeque<RefreshResult>>>,
    default_result: Arc<Mutex<RefreshResult>>,
    latency: Arc<Mutex<Option<Duration>>>,
    refresh_count: Arc<AtomicUsize>,
    invalidate_count: Arc<AtomicUsize>,
}

impl MockCredentialStore {
    /// Store without a session whose refresh fails with `NoRefreshToken`.
    pub fn new() -> Self {
        let (credentials, _) = watch::channel(None);
        Self {
            credentials: Arc::new(credentials),
            scripted: Arc::new(Mutex::new(VecDeque::new())),
            default_result: Arc::new(Mutex::new(Err(CredentialsError::NoRefreshToken))),
            latency: Arc::new(Mutex::new(None)),
            refresh_count: Arc::new(AtomicUsize::new(0)),
            invalidate_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_credentials(credentials: Credentials) -> Self {
        let store = Self::new();
        store.credentials.send_replace(Some(credentials));
        store
    }

    /// Outcome of every refresh once the scripted queue is empty.
    pub fn set_refresh_result(&self, result: RefreshResult) {
        *lock(&self.default_result) = result;
    }

    /// Outcome of the next refresh only.
    pub fn push_refresh_result(&self, result: RefreshResult) {
        lock(&self.scripted).push_back(result);
    }

    /// Make each refresh take `latency` before it settles.
    pub fn set_refresh_latency(&self, latency: Duration) {
        *lock(&self.latency) = Some(latency);
    }

    pub fn refresh_count(&self) -> usize {
        self.refresh_count.load(Ordering::SeqCst)
    }

    pub fn invalidate_count(&self) -> usize {
        self.invalidate_count.load(Ordering::SeqCst)
    }

    /// Set or clear the session directly, as the host app would on logout.
    pub fn set_credentials(&self, credentials: Option<Credentials>) {
        self.credentials.send_replace(credentials);
    }
}

impl Default for MockCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStore for MockCredentialStore {
    fn current_credentials(&self) -> Option<Credentials> {
        self.credentials.borrow().clone()
    }

    async fn refresh(&self) -> Result<Credentials, CredentialsError> {
        self.refresh_count.fetch_add(1, Ordering::SeqCst);

        let latency = *lock(&self.latency);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let scripted = lock(&self.scripted).pop_front();
        match scripted {
            Some(result) => result,
            None => lock(&self.default_result).clone(),
        }
    }

    fn subscribe(&self) -> watch::Receiver<Option<Credentials>> {
        self.credentials.subscribe()
    }

    fn store(&self, credentials: Credentials) {
        self.credentials.send_replace(Some(credentials));
    }

    fn invalidate(&self) {
        self.invalidate_count.fetch_add(1, Ordering::SeqCst);
        self.credentials.send_modify(|current| {
            if let Some(credentials) = current {
                *credentials = credentials.without_access_token();
            }
        });
    }
}
