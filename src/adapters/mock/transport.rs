//! Mock network transport for testing.
//!
//! Responses come from a responder closure so tests can script status codes
//! per request (for example 401 for a stale bearer token, 200 otherwise).

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::traits::{NetworkTransport, Request, Response, TransportError};
use crate::util::lock;

type Responder = Arc<dyn Fn(&Request) -> Result<Response, TransportError> + Send + Sync>;

/// Mock transport recording every request it sends.
///
/// # Example
///
/// ```ignore
/// use openweb_core::adapters::mock::MockTransport;
///
/// let transport = MockTransport::requiring_bearer("fresh");
/// let response = transport.send(&Request::get("https://api.example.com/user/me")).await?;
/// assert_eq!(response.status, 401);
/// assert_eq!(transport.request_count(), 1);
/// ```
#[derive(Clone)]
pub struct MockTransport {
    responder: Arc<Mutex<Responder>>,
    latency: Arc<Mutex<Option<Duration>>>,
    requests: Arc<Mutex<Vec<Request>>>,
}

impl MockTransport {
    /// Transport answering every request with `200 {}`.
    pub fn new() -> Self {
        Self::with_responder(|_| Ok(Response::new(200, Bytes::from_static(b"{}"))))
    }

    pub fn with_responder<F>(responder: F) -> Self
    where
        F: Fn(&Request) -> Result<Response, TransportError> + Send + Sync + 'static,
    {
        Self {
            responder: Arc::new(Mutex::new(Arc::new(responder))),
            latency: Arc::new(Mutex::new(None)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Transport answering every request with an empty body and `status`.
    pub fn with_status(status: u16) -> Self {
        Self::with_responder(move |_| Ok(Response::new(status, Bytes::new())))
    }

    /// Transport failing every request with `error`.
    pub fn failing(error: TransportError) -> Self {
        Self::with_responder(move |_| Err(error.clone()))
    }

    /// Transport accepting only `Authorization: Bearer <token>`; anything
    /// else gets a 401.
    pub fn requiring_bearer(token: &str) -> Self {
        let expected = format!("Bearer {}", token);
        Self::with_responder(move |request| {
            if request.header("authorization") == Some(expected.as_str()) {
                Ok(Response::new(200, Bytes::from_static(b"{}")))
            } else {
                Ok(Response::new(401, Bytes::new()))
            }
        })
    }

    pub fn set_responder<F>(&self, responder: F)
    where
        F: Fn(&Request) -> Result<Response, TransportError> + Send + Sync + 'static,
    {
        *lock(&self.responder) = Arc::new(responder);
    }

    /// Delay every response by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        *lock(&self.latency) = Some(latency);
    }

    /// Get all recorded requests, as sent (headers included).
    pub fn requests(&self) -> Vec<Request> {
        lock(&self.requests).clone()
    }

    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    pub fn clear_requests(&self) {
        lock(&self.requests).clear();
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NetworkTransport for MockTransport {
    async fn send(&self, request: &Request) -> Result<Response, TransportError> {
        lock(&self.requests).push(request.clone());

        let latency = *lock(&self.latency);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let responder = Arc::clone(&*lock(&self.responder));
        responder(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_response() {
        let transport = MockTransport::new();
        let response = transport
            .send(&Request::get("https://api.example.com/a"))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.text().unwrap(), "{}");
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_requiring_bearer() {
        let transport = MockTransport::requiring_bearer("fresh");

        let stale = Request::get("https://api.example.com/a").with_header("Authorization", "Bearer old");
        let fresh = Request::get("https://api.example.com/a").with_header("Authorization", "Bearer fresh");

        assert_eq!(transport.send(&stale).await.unwrap().status, 401);
        assert_eq!(transport.send(&fresh).await.unwrap().status, 200);
        assert_eq!(
            transport.requests()[1].header("authorization"),
            Some("Bearer fresh")
        );
    }

    #[tokio::test]
    async fn test_failing() {
        let transport = MockTransport::failing(TransportError::ConnectionFailed("refused".into()));
        let err = transport
            .send(&Request::get("https://api.example.com/a"))
            .await
            .unwrap_err();
        assert_eq!(err, TransportError::ConnectionFailed("refused".into()));
    }

    #[tokio::test]
    async fn test_clear_requests() {
        let transport = MockTransport::with_status(204);
        transport
            .send(&Request::post("https://api.example.com/a"))
            .await
            .unwrap();
        transport.clear_requests();
        assert!(transport.requests().is_empty());
    }
}
