//! Concurrent credential failures share one refresh.

mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::future::join_all;
use openweb_core::adapters::mock::MockCredentialStore;
use openweb_core::auth::Credentials;
use openweb_core::blocker::BlockerType;
use openweb_core::error::{AuthError, SdkError};
use openweb_core::recovery::{CredentialRecoveryPipeline, RecoveryConfig};
use openweb_core::traits::{
    CredentialStore, CredentialsError, NetworkTransport, Request, Response, TransportError,
};

use common::{fresh_credentials, gated_registry, stale_credentials, PipelineFixture, FRESH_TOKEN};

/// Backend rejecting every token; `/slow` answers only after `delay`.
struct LaggingBackend {
    delay: Duration,
}

#[async_trait]
impl NetworkTransport for LaggingBackend {
    async fn send(&self, request: &Request) -> Result<Response, TransportError> {
        if request.url.ends_with("/slow") {
            tokio::time::sleep(self.delay).await;
        }
        Ok(Response::new(401, Bytes::new()))
    }
}

async fn concurrent_failures(n: usize) {
    let fixture = PipelineFixture::new(stale_credentials());
    fixture.store.set_refresh_result(Ok(fresh_credentials()));
    fixture.store.set_refresh_latency(Duration::from_millis(50));

    let requests = (0..n).map(|i| {
        let pipeline = Arc::clone(&fixture.pipeline);
        async move {
            pipeline
                .execute(Request::get(format!("https://api.example.com/conversation/{}", i)))
                .await
        }
    });
    let results = join_all(requests).await;

    assert!(results.iter().all(|result| result.is_ok()), "n = {}", n);
    assert_eq!(fixture.store.refresh_count(), 1, "n = {}", n);
    assert_eq!(fixture.pipeline.refresh_cycles(), 1);
    assert!(!fixture.pipeline.is_refreshing());

    // Every request: one rejected attempt and one retry with the new token
    let requests = fixture.transport.requests();
    assert_eq!(requests.len(), 2 * n);
    let expected = format!("Bearer {}", FRESH_TOKEN);
    let retried = requests
        .iter()
        .filter(|request| request.header("authorization") == Some(expected.as_str()))
        .count();
    assert_eq!(retried, n);
}

#[tokio::test]
async fn test_single_failure_refreshes_once() {
    concurrent_failures(1).await;
}

#[tokio::test]
async fn test_five_failures_refresh_once() {
    concurrent_failures(5).await;
}

#[tokio::test]
async fn test_fifty_failures_refresh_once() {
    concurrent_failures(50).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_fifty_failures_across_threads_refresh_once() {
    let fixture = PipelineFixture::new(stale_credentials());
    fixture.store.set_refresh_result(Ok(fresh_credentials()));
    fixture.store.set_refresh_latency(Duration::from_millis(50));

    let handles: Vec<_> = (0..50)
        .map(|_| {
            let pipeline = Arc::clone(&fixture.pipeline);
            tokio::spawn(async move {
                pipeline
                    .execute(Request::get("https://api.example.com/user/me"))
                    .await
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }
    assert_eq!(fixture.store.refresh_count(), 1);
}

#[tokio::test]
async fn test_refreshed_credentials_are_stored() {
    let fixture = PipelineFixture::new(stale_credentials());
    fixture.store.set_refresh_result(Ok(fresh_credentials()));

    fixture
        .pipeline
        .execute(Request::get("https://api.example.com/user/me"))
        .await
        .unwrap();

    assert_eq!(fixture.store.current_credentials(), Some(fresh_credentials()));
}

#[tokio::test]
async fn test_failed_refresh_reaches_every_waiter() {
    let fixture = PipelineFixture::new(stale_credentials());
    let rejected = CredentialsError::RefreshRejected("HTTP 401: revoked".to_string());
    fixture.store.set_refresh_result(Err(rejected.clone()));
    fixture.store.set_refresh_latency(Duration::from_millis(30));

    let requests = (0..5).map(|_| {
        let pipeline = Arc::clone(&fixture.pipeline);
        async move {
            pipeline
                .execute(Request::get("https://api.example.com/user/me"))
                .await
        }
    });
    let results = join_all(requests).await;

    for result in results {
        assert_eq!(
            result.unwrap_err(),
            SdkError::from(AuthError::CredentialRefreshFailed {
                source: rejected.clone()
            })
        );
    }
    assert_eq!(fixture.store.refresh_count(), 1);
    assert_eq!(fixture.store.invalidate_count(), 1);

    // Escalated to the login gate
    let credentials = fixture.store.current_credentials().unwrap();
    assert!(!credentials.has_token());
    assert_eq!(fixture.registry.pending_count(BlockerType::Authentication), 1);
}

#[tokio::test]
async fn test_late_failure_after_rejected_refresh_does_not_refresh_again() {
    let store = Arc::new(MockCredentialStore::with_credentials(stale_credentials()));
    let rejected = CredentialsError::RefreshRejected("HTTP 401: revoked".to_string());
    store.set_refresh_result(Err(rejected.clone()));
    let registry = gated_registry(Arc::clone(&store));
    let pipeline = CredentialRecoveryPipeline::new(
        Arc::new(LaggingBackend {
            delay: Duration::from_millis(100),
        }),
        store.clone(),
        Arc::clone(&registry),
        RecoveryConfig::default(),
    );

    // Both go out with the stale token; the slow one is rejected after the
    // refresh has already failed and invalidated the session.
    let (fast, slow) = tokio::join!(
        pipeline.execute(Request::get("https://api.example.com/fast")),
        pipeline.execute(Request::get("https://api.example.com/slow")),
    );

    let expected = SdkError::from(AuthError::CredentialRefreshFailed {
        source: rejected.clone(),
    });
    assert_eq!(fast.unwrap_err(), expected);
    assert_eq!(slow.unwrap_err(), expected);
    assert_eq!(store.refresh_count(), 1);
    assert_eq!(pipeline.refresh_cycles(), 1);
    assert_eq!(store.invalidate_count(), 1);
    assert_eq!(registry.pending_count(BlockerType::Authentication), 1);

    // Signing in again lets the next failure start a new cycle
    store.store(Credentials::logged_in("test-user-id", "after-login").with_refresh_token("r2"));
    pipeline
        .execute(Request::get("https://api.example.com/fast"))
        .await
        .unwrap_err();
    assert_eq!(store.refresh_count(), 2);
    assert_eq!(pipeline.refresh_cycles(), 2);
}

#[tokio::test]
async fn test_dropped_waiter_does_not_cancel_refresh() {
    let fixture = PipelineFixture::new(stale_credentials());
    fixture.store.set_refresh_result(Ok(fresh_credentials()));
    fixture.store.set_refresh_latency(Duration::from_millis(50));

    let abandoned = tokio::spawn({
        let pipeline = Arc::clone(&fixture.pipeline);
        async move {
            pipeline
                .execute(Request::get("https://api.example.com/user/me"))
                .await
        }
    });
    let survivor = tokio::spawn({
        let pipeline = Arc::clone(&fixture.pipeline);
        async move {
            pipeline
                .execute(Request::get("https://api.example.com/user/me"))
                .await
        }
    });

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(fixture.pipeline.is_refreshing());
    abandoned.abort();

    assert!(survivor.await.unwrap().is_ok());
    assert_eq!(fixture.store.refresh_count(), 1);
    assert_eq!(
        fixture.store.current_credentials().unwrap().access_token.as_deref(),
        Some(FRESH_TOKEN)
    );
}

#[tokio::test]
async fn test_renewal_gate_held_during_refresh() {
    let fixture = PipelineFixture::new(stale_credentials());
    fixture.store.set_refresh_result(Ok(fresh_credentials()));
    fixture.store.set_refresh_latency(Duration::from_millis(50));

    let request = tokio::spawn({
        let pipeline = Arc::clone(&fixture.pipeline);
        async move {
            pipeline
                .execute(Request::get("https://api.example.com/user/me"))
                .await
        }
    });

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(fixture.registry.is_blocked(BlockerType::RenewAuthentication));

    let registry = Arc::clone(&fixture.registry);
    let waiter = tokio::spawn(async move { registry.wait(BlockerType::RenewAuthentication).await });

    assert!(request.await.unwrap().is_ok());
    assert!(waiter.await.unwrap().is_proceed());
    assert!(!fixture.registry.is_blocked(BlockerType::RenewAuthentication));
}

#[tokio::test]
async fn test_sequential_refreshes_get_new_cycles() {
    let fixture = PipelineFixture::new(stale_credentials());
    fixture.store.set_refresh_result(Ok(fresh_credentials()));

    fixture
        .pipeline
        .execute(Request::get("https://api.example.com/user/me"))
        .await
        .unwrap();

    // Backend revokes the fresh token too
    fixture.transport.set_responder(|request| {
        let status = if request.header("authorization") == Some("Bearer second-token") {
            200
        } else {
            401
        };
        Ok(openweb_core::traits::Response::new(status, bytes::Bytes::new()))
    });
    fixture.store.set_refresh_result(Ok(
        openweb_core::auth::Credentials::logged_in("test-user-id", "second-token")
    ));

    fixture
        .pipeline
        .execute(Request::get("https://api.example.com/user/me"))
        .await
        .unwrap();

    assert_eq!(fixture.store.refresh_count(), 2);
    assert_eq!(fixture.pipeline.refresh_cycles(), 2);
}

#[tokio::test]
async fn test_timeout_never_triggers_refresh() {
    let fixture = PipelineFixture::new(stale_credentials());
    fixture
        .transport
        .set_responder(|_| Err(TransportError::Timeout("30s".to_string())));

    let err = fixture
        .pipeline
        .execute(Request::get("https://api.example.com/user/me"))
        .await
        .unwrap_err();

    assert_eq!(err, SdkError::from(TransportError::Timeout("30s".to_string())));
    assert_eq!(err.category().as_str(), "network");
    assert_eq!(fixture.store.refresh_count(), 0);
}
