//! Credential recovery pipeline.
//!
//! Wraps a [`NetworkTransport`](crate::traits::NetworkTransport) so callers
//! never see a credential failure that a silent refresh could have fixed:
//!
//! 1. Every request is sent with the current bearer token.
//! 2. An unauthenticated response starts (or joins) the single in-flight
//!    refresh.
//! 3. After the refresh the request is replayed once with the new token.
//! 4. If the refresh fails, every attached request fails with
//!    [`AuthError::CredentialRefreshFailed`](crate::error::AuthError) and the
//!    login flow is requested through the gating registry.

mod budget;
mod pipeline;
mod state;

pub use budget::RetryBudget;
pub use pipeline::{CredentialRecoveryPipeline, RecoveryConfig};
pub use state::RefreshResult;
